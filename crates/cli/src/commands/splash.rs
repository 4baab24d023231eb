use std::time::Duration;

use serde_json::json;
use storefront_core::config::{AppConfig, LoadOptions};
use storefront_core::loader::{InMemorySeenFlag, SplashLoader, SplashPlan};
use storefront_core::ErrorClass;

use crate::commands::CommandResult;

const COMMAND: &str = "splash";

/// Plans the splash for a first visit to `page` that finished loading after
/// `elapsed_ms`.
pub fn run(options: &LoadOptions, page: Option<String>, elapsed_ms: u64) -> CommandResult {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::classified(
                COMMAND,
                ErrorClass::ConfigValidation,
                error.to_string(),
                None,
            )
        }
    };

    let loader = SplashLoader::from_config(&config.loader);
    let page = page.unwrap_or_else(|| loader.page().to_owned());
    let seen = InMemorySeenFlag::default();

    match loader.plan(&page, &seen) {
        SplashPlan::Skip => CommandResult::success_with_details(
            COMMAND,
            format!("no splash on `{page}`"),
            Some(json!({ "page": page, "show": false, "hold_ms": 0 })),
        ),
        SplashPlan::Show { min_display } => {
            let hold = millis(loader.remaining(Duration::from_millis(elapsed_ms)));
            CommandResult::success_with_details(
                COMMAND,
                format!("splash on `{page}`, hiding {hold}ms after load"),
                Some(json!({
                    "page": page,
                    "show": true,
                    "min_display_ms": millis(min_display),
                    "hold_ms": hold,
                })),
            )
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
