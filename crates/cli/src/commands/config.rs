use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use leadline_core::config::{AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    let api_key = if config.gemini.api_key.is_some() { "<redacted>" } else { "<unset>" };
    lines.push(render_line(
        "gemini.api_key",
        api_key,
        field_source(
            "gemini.api_key",
            Some("LEADLINE_GEMINI_API_KEY"),
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));
    lines.push(render_line(
        "gemini.base_url",
        &config.gemini.base_url,
        field_source(
            "gemini.base_url",
            Some("LEADLINE_GEMINI_BASE_URL"),
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));
    lines.push(render_line(
        "gemini.model",
        &config.gemini.model,
        field_source(
            "gemini.model",
            Some("LEADLINE_GEMINI_MODEL"),
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));
    lines.push(render_line(
        "gemini.timeout_secs",
        &config.gemini.timeout_secs.to_string(),
        field_source(
            "gemini.timeout_secs",
            Some("LEADLINE_GEMINI_TIMEOUT_SECS"),
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));

    lines.push(render_line(
        "session.history_window",
        &config.session.history_window.to_string(),
        field_source(
            "session.history_window",
            Some("LEADLINE_SESSION_HISTORY_WINDOW"),
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));
    lines.push(render_line(
        "session.extraction_min_turns",
        &config.session.extraction_min_turns.to_string(),
        field_source(
            "session.extraction_min_turns",
            Some("LEADLINE_SESSION_EXTRACTION_MIN_TURNS"),
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));
    lines.push(render_line(
        "session.suggestion_count",
        &config.session.suggestion_count.to_string(),
        field_source(
            "session.suggestion_count",
            Some("LEADLINE_SESSION_SUGGESTION_COUNT"),
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));
    lines.push(render_line(
        "session.login_delay_ms",
        &config.session.login_delay_ms.to_string(),
        field_source(
            "session.login_delay_ms",
            Some("LEADLINE_SESSION_LOGIN_DELAY_MS"),
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        field_source(
            "logging.level",
            Some("LEADLINE_LOGGING_LEVEL"),
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        field_source(
            "logging.format",
            Some("LEADLINE_LOGGING_FORMAT"),
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("leadline.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/leadline.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_key: Option<&str>,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_key {
        if env::var_os(env_key).is_some() {
            return format!("env ({env_key})");
        }
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
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

#[cfg(test)]
mod tests {
    use toml::Value;

    use super::{contains_path, render_line};

    #[test]
    fn contains_path_walks_nested_tables() {
        let doc: Value = "[gemini]\nmodel = \"gemini-2.5-flash\"".parse().unwrap();
        assert!(contains_path(&doc, "gemini.model"));
        assert!(!contains_path(&doc, "gemini.api_key"));
        assert!(!contains_path(&doc, "logging.level"));
    }

    #[test]
    fn render_line_includes_source() {
        let line = render_line("gemini.model", "gemini-2.5-flash", "default".to_string());
        assert_eq!(line, "- gemini.model = gemini-2.5-flash (source: default)");
    }
}
