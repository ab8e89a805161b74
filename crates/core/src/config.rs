use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub gemini: GeminiConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct GeminiConfig {
    /// Absent keys do not fail validation: the gateway surfaces a missing
    /// credential as a generic call failure instead.
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub history_window: usize,
    pub extraction_min_turns: usize,
    pub suggestion_count: usize,
    pub login_delay_ms: u64,
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
    pub gemini_api_key: Option<String>,
    pub gemini_model: Option<String>,
    pub log_level: Option<String>,
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
            gemini: GeminiConfig {
                api_key: None,
                base_url: "https://generativelanguage.googleapis.com".to_string(),
                model: "gemini-2.5-flash".to_string(),
                timeout_secs: 30,
            },
            session: SessionConfig {
                history_window: 10,
                extraction_min_turns: 4,
                suggestion_count: 3,
                login_delay_ms: 800,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
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

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("leadline.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(gemini) = patch.gemini {
            if let Some(gemini_api_key_value) = gemini.api_key {
                self.gemini.api_key = Some(secret_value(gemini_api_key_value));
            }
            if let Some(base_url) = gemini.base_url {
                self.gemini.base_url = base_url;
            }
            if let Some(model) = gemini.model {
                self.gemini.model = model;
            }
            if let Some(timeout_secs) = gemini.timeout_secs {
                self.gemini.timeout_secs = timeout_secs;
            }
        }

        if let Some(session) = patch.session {
            if let Some(history_window) = session.history_window {
                self.session.history_window = history_window;
            }
            if let Some(extraction_min_turns) = session.extraction_min_turns {
                self.session.extraction_min_turns = extraction_min_turns;
            }
            if let Some(suggestion_count) = session.suggestion_count {
                self.session.suggestion_count = suggestion_count;
            }
            if let Some(login_delay_ms) = session.login_delay_ms {
                self.session.login_delay_ms = login_delay_ms;
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
        if let Some(value) = read_env("LEADLINE_GEMINI_API_KEY") {
            self.gemini.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("LEADLINE_GEMINI_BASE_URL") {
            self.gemini.base_url = value;
        }
        if let Some(value) = read_env("LEADLINE_GEMINI_MODEL") {
            self.gemini.model = value;
        }
        if let Some(value) = read_env("LEADLINE_GEMINI_TIMEOUT_SECS") {
            self.gemini.timeout_secs = parse_u64("LEADLINE_GEMINI_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("LEADLINE_SESSION_HISTORY_WINDOW") {
            self.session.history_window = parse_usize("LEADLINE_SESSION_HISTORY_WINDOW", &value)?;
        }
        if let Some(value) = read_env("LEADLINE_SESSION_EXTRACTION_MIN_TURNS") {
            self.session.extraction_min_turns =
                parse_usize("LEADLINE_SESSION_EXTRACTION_MIN_TURNS", &value)?;
        }
        if let Some(value) = read_env("LEADLINE_SESSION_SUGGESTION_COUNT") {
            self.session.suggestion_count =
                parse_usize("LEADLINE_SESSION_SUGGESTION_COUNT", &value)?;
        }
        if let Some(value) = read_env("LEADLINE_SESSION_LOGIN_DELAY_MS") {
            self.session.login_delay_ms = parse_u64("LEADLINE_SESSION_LOGIN_DELAY_MS", &value)?;
        }

        let log_level =
            read_env("LEADLINE_LOGGING_LEVEL").or_else(|| read_env("LEADLINE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("LEADLINE_LOGGING_FORMAT").or_else(|| read_env("LEADLINE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(gemini_api_key) = overrides.gemini_api_key {
            self.gemini.api_key = Some(secret_value(gemini_api_key));
        }
        if let Some(gemini_model) = overrides.gemini_model {
            self.gemini.model = gemini_model;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_gemini(&self.gemini)?;
        validate_session(&self.session)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("leadline.toml"), PathBuf::from("config/leadline.toml")]
        .into_iter()
        .find(|path| path.exists())
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

fn validate_gemini(gemini: &GeminiConfig) -> Result<(), ConfigError> {
    if !gemini.base_url.starts_with("http://") && !gemini.base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "gemini.base_url must start with http:// or https://".to_string(),
        ));
    }

    if gemini.model.trim().is_empty() {
        return Err(ConfigError::Validation("gemini.model must not be empty".to_string()));
    }

    if gemini.timeout_secs == 0 || gemini.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "gemini.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if let Some(api_key) = &gemini.api_key {
        if api_key.expose_secret().trim().is_empty() {
            return Err(ConfigError::Validation(
                "gemini.api_key must not be blank when set".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_session(session: &SessionConfig) -> Result<(), ConfigError> {
    if session.history_window == 0 {
        return Err(ConfigError::Validation(
            "session.history_window must be greater than zero".to_string(),
        ));
    }

    if session.extraction_min_turns < 2 {
        return Err(ConfigError::Validation(
            "session.extraction_min_turns must be at least 2".to_string(),
        ));
    }

    if session.suggestion_count == 0 || session.suggestion_count > 10 {
        return Err(ConfigError::Validation(
            "session.suggestion_count must be in range 1..=10".to_string(),
        ));
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

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    gemini: Option<GeminiPatch>,
    session: Option<SessionPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct GeminiPatch {
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct SessionPatch {
    history_window: Option<usize>,
    extraction_min_turns: Option<usize>,
    suggestion_count: Option<usize>,
    login_delay_ms: Option<u64>,
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
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};

    use secrecy::ExposeSecret;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    // `AppConfig::load` reads LEADLINE_* vars, so every test that loads must
    // serialize against the tests that mutate the environment.
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn load_from(path: PathBuf) -> Result<AppConfig, ConfigError> {
        AppConfig::load(LoadOptions {
            config_path: Some(path),
            require_file: true,
            overrides: ConfigOverrides::default(),
        })
    }

    #[test]
    fn defaults_validate() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn file_patch_overrides_defaults() {
        let _guard = env_lock().lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leadline.toml");
        fs::write(
            &path,
            r#"
[gemini]
api_key = "test-key-123"
model = "gemini-2.0-flash"
timeout_secs = 45

[session]
history_window = 6

[logging]
level = "debug"
format = "json"
"#,
        )
        .unwrap();

        let config = load_from(path).unwrap();
        assert_eq!(config.gemini.model, "gemini-2.0-flash");
        assert_eq!(config.gemini.timeout_secs, 45);
        assert_eq!(config.gemini.api_key.as_ref().unwrap().expose_secret(), "test-key-123");
        assert_eq!(config.session.history_window, 6);
        assert_eq!(config.session.extraction_min_turns, 4);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let _guard = env_lock().lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let result = load_from(dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::MissingConfigFile(_))));
    }

    #[test]
    fn invalid_timeout_fails_validation() {
        let _guard = env_lock().lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leadline.toml");
        fs::write(&path, "[gemini]\ntimeout_secs = 0\n").unwrap();

        let result = load_from(path);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn invalid_log_format_fails_parse() {
        assert!("yaml".parse::<LogFormat>().is_err());
        assert_eq!("PRETTY".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
    }

    #[test]
    fn programmatic_overrides_win() {
        let _guard = env_lock().lock().unwrap();
        let config = AppConfig::load(LoadOptions {
            config_path: Some(PathBuf::from("/nonexistent/leadline.toml")),
            require_file: false,
            overrides: ConfigOverrides {
                gemini_api_key: Some("override-key".to_string()),
                gemini_model: Some("gemini-exp".to_string()),
                log_level: Some("warn".to_string()),
            },
        })
        .unwrap();

        assert_eq!(config.gemini.api_key.as_ref().unwrap().expose_secret(), "override-key");
        assert_eq!(config.gemini.model, "gemini-exp");
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn env_overrides_win_over_file_values() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("LEADLINE_GEMINI_API_KEY", "env-key");
        env::set_var("LEADLINE_GEMINI_MODEL", "gemini-from-env");
        env::set_var("LEADLINE_SESSION_HISTORY_WINDOW", "8");
        env::set_var("LEADLINE_LOG_LEVEL", "warn");

        let result = (|| -> Result<(), String> {
            let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
            let path = dir.path().join("leadline.toml");
            fs::write(
                &path,
                "[gemini]\nmodel = \"gemini-from-file\"\n\n[session]\nhistory_window = 5\n",
            )
            .map_err(|err| err.to_string())?;

            let config = load_from(path).map_err(|err| format!("config load failed: {err}"))?;

            if config.gemini.model != "gemini-from-env" {
                return Err("env model should win over the file value".to_string());
            }
            if config.gemini.api_key.as_ref().map(|key| key.expose_secret().to_string())
                != Some("env-key".to_string())
            {
                return Err("env api key should be applied".to_string());
            }
            if config.session.history_window != 8 {
                return Err("env history window should win over the file value".to_string());
            }
            if config.logging.level != "warn" {
                return Err("env log level alias should be applied".to_string());
            }
            Ok(())
        })();

        clear_vars(&[
            "LEADLINE_GEMINI_API_KEY",
            "LEADLINE_GEMINI_MODEL",
            "LEADLINE_SESSION_HISTORY_WINDOW",
            "LEADLINE_LOG_LEVEL",
        ]);
        result
    }

    #[test]
    fn invalid_numeric_env_override_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("LEADLINE_SESSION_SUGGESTION_COUNT", "lots");

        let result = (|| -> Result<(), String> {
            match AppConfig::load(LoadOptions::default()) {
                Ok(_) => Err("expected an invalid override error".to_string()),
                Err(ConfigError::InvalidEnvOverride { key, .. })
                    if key == "LEADLINE_SESSION_SUGGESTION_COUNT" =>
                {
                    Ok(())
                }
                Err(other) => Err(format!("unexpected error: {other}")),
            }
        })();

        clear_vars(&["LEADLINE_SESSION_SUGGESTION_COUNT"]);
        result
    }

    #[test]
    fn unterminated_interpolation_is_rejected() {
        let _guard = env_lock().lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leadline.toml");
        fs::write(&path, "[gemini]\nmodel = \"${UNCLOSED\n").unwrap();

        let result = load_from(path);
        assert!(matches!(result, Err(ConfigError::UnterminatedInterpolation)));
    }
}
