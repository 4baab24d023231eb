use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "storefront.toml";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub loader: LoaderConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub history_path: String,
    pub session_cookie: Option<SecretString>,
}

#[derive(Clone, Debug)]
pub struct LoaderConfig {
    pub min_display_ms: u64,
    pub page: String,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub session_cookie: Option<String>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://127.0.0.1:5000".to_string(),
                timeout_secs: 30,
                history_path: "/history".to_string(),
                session_cookie: None,
            },
            loader: LoaderConfig { min_display_ms: 3000, page: "index".to_string() },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl ApiConfig {
    /// Absolute URL for a backend path such as `/api/products`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(api) = patch.api {
            if let Some(base_url) = api.base_url {
                self.api.base_url = base_url;
            }
            if let Some(timeout_secs) = api.timeout_secs {
                self.api.timeout_secs = timeout_secs;
            }
            if let Some(history_path) = api.history_path {
                self.api.history_path = history_path;
            }
            if let Some(session_cookie) = api.session_cookie {
                self.api.session_cookie = Some(session_cookie.into());
            }
        }

        if let Some(loader) = patch.loader {
            if let Some(min_display_ms) = loader.min_display_ms {
                self.loader.min_display_ms = min_display_ms;
            }
            if let Some(page) = loader.page {
                self.loader.page = page;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("STOREFRONT_API_BASE_URL") {
            self.api.base_url = value;
        }
        if let Some(value) = read_env("STOREFRONT_API_TIMEOUT_SECS") {
            self.api.timeout_secs = parse_u64("STOREFRONT_API_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("STOREFRONT_API_HISTORY_PATH") {
            self.api.history_path = value;
        }
        if let Some(value) = read_env("STOREFRONT_API_SESSION_COOKIE") {
            self.api.session_cookie = Some(value.into());
        }

        if let Some(value) = read_env("STOREFRONT_LOADER_MIN_DISPLAY_MS") {
            self.loader.min_display_ms = parse_u64("STOREFRONT_LOADER_MIN_DISPLAY_MS", &value)?;
        }
        if let Some(value) = read_env("STOREFRONT_LOADER_PAGE") {
            self.loader.page = value;
        }

        let log_level =
            read_env("STOREFRONT_LOGGING_LEVEL").or_else(|| read_env("STOREFRONT_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("STOREFRONT_LOGGING_FORMAT").or_else(|| read_env("STOREFRONT_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(base_url) = overrides.base_url {
            self.api.base_url = base_url;
        }
        if let Some(timeout_secs) = overrides.timeout_secs {
            self.api.timeout_secs = timeout_secs;
        }
        if let Some(session_cookie) = overrides.session_cookie {
            self.api.session_cookie = Some(session_cookie.into());
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_api(&self.api)?;
        validate_loader(&self.loader)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

/// The config file `load` would read: the explicit path if it exists, else the
/// first existing candidate.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    candidate_config_paths().into_iter().find(|path| path.exists())
}

pub fn candidate_config_paths() -> [PathBuf; 2] {
    [PathBuf::from(CONFIG_FILE_NAME), Path::new("config").join(CONFIG_FILE_NAME)]
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_api(api: &ApiConfig) -> Result<(), ConfigError> {
    let base_url = api.base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "api.base_url must start with http:// or https://".to_string(),
        ));
    }

    if api.timeout_secs == 0 || api.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "api.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if !api.history_path.starts_with('/') {
        return Err(ConfigError::Validation("api.history_path must start with `/`".to_string()));
    }

    let cookie_blank = api
        .session_cookie
        .as_ref()
        .map(|value| value.expose_secret().trim().is_empty())
        .unwrap_or(false);
    if cookie_blank {
        return Err(ConfigError::Validation(
            "api.session_cookie must not be blank when set".to_string(),
        ));
    }

    Ok(())
}

fn validate_loader(loader: &LoaderConfig) -> Result<(), ConfigError> {
    if loader.min_display_ms > 60_000 {
        return Err(ConfigError::Validation(
            "loader.min_display_ms must be at most 60000".to_string(),
        ));
    }

    if loader.page.trim().is_empty() {
        return Err(ConfigError::Validation("loader.page must not be empty".to_string()));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    api: Option<ApiPatch>,
    loader: Option<LoaderPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiPatch {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    history_path: Option<String>,
    session_cookie: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoaderPatch {
    min_display_ms: Option<u64>,
    page: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    const ENV_KEYS: [&str; 10] = [
        "STOREFRONT_API_BASE_URL",
        "STOREFRONT_API_TIMEOUT_SECS",
        "STOREFRONT_API_HISTORY_PATH",
        "STOREFRONT_API_SESSION_COOKIE",
        "STOREFRONT_LOADER_MIN_DISPLAY_MS",
        "STOREFRONT_LOADER_PAGE",
        "STOREFRONT_LOGGING_LEVEL",
        "STOREFRONT_LOGGING_FORMAT",
        "STOREFRONT_LOG_LEVEL",
        "STOREFRONT_LOG_FORMAT",
    ];

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars() {
        for var in ENV_KEYS {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_are_valid() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars();

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.api.base_url == "http://127.0.0.1:5000", "default base url")?;
        ensure(
            config.api.endpoint(&config.api.history_path) == "http://127.0.0.1:5000/history",
            "history url",
        )?;
        ensure(config.loader.min_display_ms == 3000, "default splash time is 3s")?;
        ensure(matches!(config.logging.format, LogFormat::Compact), "default format compact")
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars();
        env::set_var("TEST_STOREFRONT_HOST", "shop.internal:8443");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("storefront.toml");
            fs::write(
                &path,
                r#"
[api]
base_url = "https://${TEST_STOREFRONT_HOST}"
history_path = "/orders/history"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.api.base_url == "https://shop.internal:8443",
                "base url should be interpolated from environment",
            )?;
            ensure(
                config.api.endpoint(&config.api.history_path)
                    == "https://shop.internal:8443/orders/history",
                "history url should join base url and path",
            )
        })();

        env::remove_var("TEST_STOREFRONT_HOST");
        result
    }

    #[test]
    fn missing_interpolation_variable_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars();

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = dir.path().join("storefront.toml");
        fs::write(&path, "[api]\nbase_url = \"${STOREFRONT_TEST_UNSET_VAR}\"\n")
            .map_err(|err| err.to_string())?;

        let error =
            match AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
            {
                Ok(_) => return Err("expected interpolation failure".to_string()),
                Err(error) => error,
            };
        ensure(
            matches!(error, ConfigError::MissingEnvInterpolation { ref var } if var == "STOREFRONT_TEST_UNSET_VAR"),
            "error should name the missing variable",
        )
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars();
        env::set_var("STOREFRONT_API_BASE_URL", "http://from-env:5000");
        env::set_var("STOREFRONT_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("storefront.toml");
            fs::write(
                &path,
                r#"
[api]
base_url = "http://from-file:5000"
timeout_secs = 12

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.api.base_url == "http://from-env:5000", "env base url should win")?;
            ensure(config.api.timeout_secs == 12, "file timeout should override default")?;
            ensure(config.logging.level == "debug", "override log level should win")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "log format alias should be read from env",
            )
        })();

        clear_vars();
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars();

        let error = match AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                base_url: Some("ftp://shop".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }) {
            Ok(_) => return Err("expected validation failure but config load succeeded".to_string()),
            Err(error) => error,
        };
        ensure(
            matches!(error, ConfigError::Validation(ref message) if message.contains("api.base_url")),
            "validation failure should mention api.base_url",
        )
    }

    #[test]
    fn invalid_numeric_env_override_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars();
        env::set_var("STOREFRONT_API_TIMEOUT_SECS", "soon");

        let result = match AppConfig::load(LoadOptions::default()) {
            Ok(_) => Err("expected invalid override failure".to_string()),
            Err(error) => ensure(
                matches!(error, ConfigError::InvalidEnvOverride { ref key, .. } if key == "STOREFRONT_API_TIMEOUT_SECS"),
                "error should name the env key",
            ),
        };

        clear_vars();
        result
    }

    #[test]
    fn session_cookie_is_not_leaked_by_debug() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars();
        env::set_var("STOREFRONT_API_SESSION_COOKIE", "session=super-secret-value");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            let debug = format!("{config:?}");

            ensure(!debug.contains("super-secret-value"), "debug output should not contain cookie")?;
            ensure(
                config
                    .api
                    .session_cookie
                    .as_ref()
                    .map(|cookie| cookie.expose_secret() == "session=super-secret-value")
                    .unwrap_or(false),
                "cookie should still be readable through expose_secret",
            )
        })();

        clear_vars();
        result
    }
}
