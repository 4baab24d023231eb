pub mod catalog;
pub mod checkout;
pub mod config;
pub mod doctor;
pub mod splash;
pub mod summary;

use serde::Serialize;
use serde_json::Value;
use storefront_client::HttpStorefrontApi;
use storefront_core::config::{AppConfig, LoadOptions};
use storefront_core::ErrorClass;

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_REJECTED: u8 = 3;
pub const EXIT_TRANSPORT: u8 = 4;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl CommandResult {
    pub fn success_with_details(
        command: &str,
        message: impl Into<String>,
        details: Option<Value>,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            details,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure_with_details(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
        details: Option<Value>,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            details,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn classified(
        command: &str,
        class: ErrorClass,
        message: impl Into<String>,
        details: Option<Value>,
    ) -> Self {
        Self::failure_with_details(command, class.as_str(), message, exit_code_for(class), details)
    }
}

pub fn exit_code_for(class: ErrorClass) -> u8 {
    match class {
        ErrorClass::ConfigValidation => EXIT_CONFIG,
        ErrorClass::UserInput | ErrorClass::BusinessRejection => EXIT_REJECTED,
        ErrorClass::Transport => EXIT_TRANSPORT,
    }
}

/// Loads configuration and builds the HTTP backend, or the failure payload
/// to print instead.
pub(crate) fn connect(
    command: &str,
    options: &LoadOptions,
) -> Result<(AppConfig, HttpStorefrontApi), CommandResult> {
    let config = AppConfig::load(options.clone()).map_err(|error| {
        CommandResult::classified(command, ErrorClass::ConfigValidation, error.to_string(), None)
    })?;
    let api = HttpStorefrontApi::from_config(&config.api).map_err(|error| {
        CommandResult::classified(command, ErrorClass::ConfigValidation, error.to_string(), None)
    })?;
    Ok((config, api))
}

/// Current-thread runtime for a single command invocation.
pub(crate) fn command_runtime() -> Result<tokio::runtime::Runtime, std::io::Error> {
    tokio::runtime::Builder::new_current_thread().enable_all().build()
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
