use std::env;
use std::fs;
use std::path::Path;

use storefront_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

/// One inspectable key: dotted path, env names in lookup order, and whether a
/// command-line flag set it.
struct KeySource<'a> {
    key_path: &'static str,
    env_keys: &'static [&'static str],
    from_flag: bool,
    value: &'a str,
}

pub fn run(options: &LoadOptions) -> String {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(options.config_path.as_deref());
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let overrides = &options.overrides;

    let timeout = config.api.timeout_secs.to_string();
    let cookie = if config.api.session_cookie.is_some() { "<redacted>" } else { "<unset>" };
    let min_display = config.loader.min_display_ms.to_string();
    let format = format!("{:?}", config.logging.format);

    let keys = [
        KeySource {
            key_path: "api.base_url",
            env_keys: &["STOREFRONT_API_BASE_URL"],
            from_flag: overrides.base_url.is_some(),
            value: &config.api.base_url,
        },
        KeySource {
            key_path: "api.timeout_secs",
            env_keys: &["STOREFRONT_API_TIMEOUT_SECS"],
            from_flag: overrides.timeout_secs.is_some(),
            value: &timeout,
        },
        KeySource {
            key_path: "api.history_path",
            env_keys: &["STOREFRONT_API_HISTORY_PATH"],
            from_flag: false,
            value: &config.api.history_path,
        },
        KeySource {
            key_path: "api.session_cookie",
            env_keys: &["STOREFRONT_API_SESSION_COOKIE"],
            from_flag: overrides.session_cookie.is_some(),
            value: cookie,
        },
        KeySource {
            key_path: "loader.min_display_ms",
            env_keys: &["STOREFRONT_LOADER_MIN_DISPLAY_MS"],
            from_flag: false,
            value: &min_display,
        },
        KeySource {
            key_path: "loader.page",
            env_keys: &["STOREFRONT_LOADER_PAGE"],
            from_flag: false,
            value: &config.loader.page,
        },
        KeySource {
            key_path: "logging.level",
            env_keys: &["STOREFRONT_LOGGING_LEVEL", "STOREFRONT_LOG_LEVEL"],
            from_flag: overrides.log_level.is_some(),
            value: &config.logging.level,
        },
        KeySource {
            key_path: "logging.format",
            env_keys: &["STOREFRONT_LOGGING_FORMAT", "STOREFRONT_LOG_FORMAT"],
            from_flag: overrides.log_format.is_some(),
            value: &format,
        },
    ];

    let mut lines =
        vec!["effective config (source precedence: flag > env > file > default):".to_string()];
    for key in &keys {
        let source = field_source(key, config_file_doc.as_ref(), config_file_path.as_deref());
        lines.push(render_line(key.key_path, key.value, source));
    }

    lines.join("\n")
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key: &KeySource<'_>,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if key.from_flag {
        return "flag".to_string();
    }

    if let Some(env_key) = key.env_keys.iter().find(|env_key| env::var_os(env_key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key.key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
