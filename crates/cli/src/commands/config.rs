use std::env;
use std::fs;
use std::path::Path;

use fareseer_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let entries = [
        (
            "server.bind_address",
            config.server.bind_address.clone(),
            source("server.bind_address", &["FARESEER_SERVER_BIND_ADDRESS"]),
        ),
        (
            "server.port",
            config.server.port.to_string(),
            source("server.port", &["FARESEER_SERVER_PORT"]),
        ),
        (
            "server.graceful_shutdown_secs",
            config.server.graceful_shutdown_secs.to_string(),
            source("server.graceful_shutdown_secs", &["FARESEER_SERVER_GRACEFUL_SHUTDOWN_SECS"]),
        ),
        (
            "artifacts.model_path",
            config.artifacts.model_path.display().to_string(),
            source("artifacts.model_path", &["FARESEER_ARTIFACTS_MODEL_PATH"]),
        ),
        (
            "artifacts.popularity_path",
            config.artifacts.popularity_path.display().to_string(),
            source("artifacts.popularity_path", &["FARESEER_ARTIFACTS_POPULARITY_PATH"]),
        ),
        (
            "artifacts.require_model",
            config.artifacts.require_model.to_string(),
            source("artifacts.require_model", &["FARESEER_ARTIFACTS_REQUIRE_MODEL"]),
        ),
        (
            "logging.level",
            config.logging.level.clone(),
            source("logging.level", &["FARESEER_LOGGING_LEVEL", "FARESEER_LOG_LEVEL"]),
        ),
        (
            "logging.format",
            format!("{:?}", config.logging.format),
            source("logging.format", &["FARESEER_LOGGING_FORMAT", "FARESEER_LOG_FORMAT"]),
        ),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    lines.extend(entries.iter().map(|(key, value, source)| render_line(key, value, source)));
    lines.join("\n")
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
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

fn render_line(key: &str, value: &str, source: &str) -> String {
    format!("- {key} = {value} (source: {source})")
}
