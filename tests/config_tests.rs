//! Tests for layered configuration loading.

use std::io::Write;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use miki::config::{AppConfig, PLACEHOLDER_API_KEY};
use miki::engine::StructuredOutputMode;
use miki::error::MikiError;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const CONFIG_ENV_VARS: [&str; 9] = [
    "KIMI_API_KEY",
    "MIKI_BASE_URL",
    "MIKI_MODEL",
    "MIKI_TEMPERATURE",
    "MIKI_TIMEOUT_SECS",
    "MIKI_HOST",
    "MIKI_PORT",
    "MIKI_STATIC_DIR",
    "MIKI_STRUCTURED_OUTPUT",
];

struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    /// Snapshot the config variables and clear them.
    fn clean() -> Self {
        let saved = CONFIG_ENV_VARS
            .iter()
            .map(|key| ((*key).to_string(), std::env::var(key).ok()))
            .collect();
        for key in CONFIG_ENV_VARS {
            std::env::remove_var(key);
        }
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }
}

fn env_lock_guard() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn missing_api_key_falls_back_to_placeholder() {
    let _lock = env_lock_guard();
    let _env = EnvGuard::clean();

    let config = AppConfig::load(None).unwrap();

    assert_eq!(config.model.api_key, PLACEHOLDER_API_KEY);
    assert!(!config.model.has_credentials());
    assert_eq!(config.model.timeout, Duration::from_secs(10));
}

#[test]
fn api_key_comes_from_environment() {
    let _lock = env_lock_guard();
    let _env = EnvGuard::clean();
    std::env::set_var("KIMI_API_KEY", "sk-from-env");

    let config = AppConfig::load(None).unwrap();

    assert_eq!(config.model.api_key, "sk-from-env");
    assert!(config.model.has_credentials());
}

#[test]
fn file_values_are_overridden_by_environment() {
    let _lock = env_lock_guard();
    let _env = EnvGuard::clean();
    let file = write_config(
        r#"
        [model]
        base_url = "http://localhost:9999/v1"
        temperature = 0.2
        structured_output = "json_object"

        [server]
        host = "0.0.0.0"
        port = 8080
        static_dir = "public"
        "#,
    );
    std::env::set_var("MIKI_PORT", "9090");

    let config = AppConfig::load(Some(file.path())).unwrap();

    assert_eq!(config.model.base_url, "http://localhost:9999/v1");
    assert_eq!(config.model.temperature, 0.2);
    assert_eq!(config.model.structured_output, StructuredOutputMode::JsonObject);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 9090);
    assert_eq!(config.server.static_dir, std::path::PathBuf::from("public"));
    assert_eq!(config.server.socket_addr().unwrap().port(), 9090);
}

#[test]
fn malformed_file_names_the_path() {
    let _lock = env_lock_guard();
    let _env = EnvGuard::clean();
    let file = write_config("[model\nbroken");

    let err = AppConfig::load(Some(file.path())).unwrap_err();

    match err {
        MikiError::Configuration(message) => {
            assert!(message.contains(&file.path().display().to_string()));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_file_is_an_io_error() {
    let _lock = env_lock_guard();
    let _env = EnvGuard::clean();
    let dir = tempfile::tempdir().unwrap();

    let err = AppConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();

    assert!(matches!(err, MikiError::Io(_)));
}

#[test]
fn bad_structured_output_value_is_rejected() {
    let _lock = env_lock_guard();
    let _env = EnvGuard::clean();
    std::env::set_var("MIKI_STRUCTURED_OUTPUT", "xml");

    let err = AppConfig::load(None).unwrap_err();

    assert!(matches!(err, MikiError::Configuration(_)));
}
