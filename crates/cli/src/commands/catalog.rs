use serde_json::json;
use storefront_core::config::LoadOptions;
use storefront_core::{CatalogCache, ErrorClass};

use crate::commands::{command_runtime, connect, CommandResult};

const COMMAND: &str = "catalog";

pub fn run(options: &LoadOptions, json_output: bool) -> CommandResult {
    let (_, api) = match connect(COMMAND, options) {
        Ok(connected) => connected,
        Err(failure) => return failure,
    };
    let runtime = match command_runtime() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::classified(
                COMMAND,
                ErrorClass::Transport,
                format!("failed to initialize async runtime: {error}"),
                None,
            )
        }
    };

    let mut catalog = CatalogCache::default();
    if let Err(error) = runtime.block_on(catalog.load(&api)) {
        return CommandResult::classified(COMMAND, ErrorClass::Transport, error.to_string(), None);
    }

    let options = catalog.options();
    if json_output {
        let selectable = options.iter().filter(|option| !option.disabled).count();
        return CommandResult::success_with_details(
            COMMAND,
            format!("{} products, {selectable} in stock", options.len()),
            Some(json!({ "options": options })),
        );
    }

    if options.is_empty() {
        return CommandResult { exit_code: 0, output: "(no products)".to_owned() };
    }

    let lines: Vec<String> = options
        .iter()
        .map(|option| {
            let marker = if option.disabled { " [sold out]" } else { "" };
            format!("{:>6}  {}{marker}", option.value.0, option.label)
        })
        .collect();
    CommandResult { exit_code: 0, output: lines.join("\n") }
}
