pub mod commands;
pub mod logging;
pub mod terminal;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use storefront_core::config::{AppConfig, ConfigOverrides, LoadOptions};

use crate::commands::checkout::{CheckoutArgs, ItemSpec};
use crate::commands::summary::{FieldSpec, SummaryArgs};
use crate::terminal::TerminalNotifier;

#[derive(Debug, Parser)]
#[command(
    name = "storefront",
    about = "Storefront shopper and operator CLI",
    long_about = "Browse the catalog, build and submit a cart, check order-form quantities, and inspect configuration.",
    after_help = "Examples:\n  storefront catalog\n  storefront checkout --item 1:3 --item 2:1\n  storefront summary --field 'Fuse Box:0:10:1500=2'\n  storefront doctor --json"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a storefront.toml config file")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Override api.base_url")]
    base_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Load the product catalog and list the selectable products")]
    Catalog {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Build a cart from --item entries and submit it as one order")]
    Checkout {
        #[arg(long = "item", value_name = "ID:QTY", value_parser = ItemSpec::parse, help = "Product id and quantity to add, repeatable")]
        items: Vec<ItemSpec>,
        #[arg(long = "remove", value_name = "INDEX", help = "Cart line to remove after adding, repeatable")]
        remove: Vec<usize>,
        #[arg(long, help = "Skip the confirmation prompt")]
        yes: bool,
        #[arg(long, help = "Print the cart without submitting it")]
        dry_run: bool,
    },
    #[command(about = "Check order-form quantities and print the live summary")]
    Summary {
        #[arg(long = "field", value_name = "LABEL:MIN:MAX:PRICE=VALUE", value_parser = FieldSpec::parse, help = "Quantity field and its entered value, repeatable")]
        fields: Vec<FieldSpec>,
        #[arg(long, help = "Validate values as entered, without keystroke clamping")]
        raw: bool,
    },
    #[command(about = "Plan the splash screen for a page")]
    Splash {
        #[arg(long, help = "Page name (defaults to loader.page)")]
        page: Option<String>,
        #[arg(long, default_value_t = 0, help = "Milliseconds the page took to finish loading")]
        elapsed_ms: u64,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config and backend reachability")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

impl Cli {
    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            config_path: self.config.clone(),
            require_file: self.config.is_some(),
            overrides: ConfigOverrides {
                base_url: self.base_url.clone(),
                ..ConfigOverrides::default()
            },
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = cli.load_options();

    if let Ok(config) = AppConfig::load(options.clone()) {
        logging::init(&config);
    }

    let result = match cli.command {
        Command::Catalog { json } => commands::catalog::run(&options, json),
        Command::Checkout { items, remove, yes, dry_run } => {
            let notifier = Arc::new(TerminalNotifier::new(yes));
            commands::checkout::run(&options, CheckoutArgs { items, remove, dry_run }, notifier)
        }
        Command::Summary { fields, raw } => commands::summary::run(SummaryArgs { fields, raw }),
        Command::Splash { page, elapsed_ms } => commands::splash::run(&options, page, elapsed_ms),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run(&options) }
        }
        Command::Doctor { json } => commands::doctor::run(&options, json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
