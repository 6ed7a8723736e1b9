//! Configuration system (layered: defaults > TOML file > env > CLI flags).
//!
//! Everything here is built once at startup and handed to constructors by
//! reference; nothing reads the environment after that.

use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::engine::StructuredOutputMode;
use crate::error::{MikiError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.moonshot.cn/v1";
pub const DEFAULT_MODEL: &str = "moonshot-v1-8k";
pub const DEFAULT_TEMPERATURE: f64 = 0.5;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Used when `KIMI_API_KEY` is unset. The first model call fails instead of startup.
pub const PLACEHOLDER_API_KEY: &str = "placeholder_api_key";
pub const API_KEY_ENV: &str = "KIMI_API_KEY";

/// Connection parameters for the hosted chat-completion endpoint.
#[derive(Clone, PartialEq)]
pub struct ModelEndpointConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f64,
    pub timeout: Duration,
    pub structured_output: StructuredOutputMode,
}

impl Default for ModelEndpointConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: PLACEHOLDER_API_KEY.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout: DEFAULT_TIMEOUT,
            structured_output: StructuredOutputMode::default(),
        }
    }
}

impl ModelEndpointConfig {
    /// Whether a real credential was supplied.
    pub fn has_credentials(&self) -> bool {
        !self.api_key.is_empty() && self.api_key != PLACEHOLDER_API_KEY
    }
}

impl fmt::Debug for ModelEndpointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelEndpointConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"..")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .field("structured_output", &self.structured_output)
            .finish()
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            static_dir: PathBuf::from("static"),
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| MikiError::Configuration(format!("Invalid listen address: {e}")))
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    pub model: ModelEndpointConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    model: FileModelSection,
    #[serde(default)]
    server: FileServerSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileModelSection {
    base_url: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
    temperature: Option<f64>,
    timeout_secs: Option<u64>,
    structured_output: Option<StructuredOutputMode>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileServerSection {
    host: Option<String>,
    port: Option<u16>,
    static_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Load from the process environment (and `.env` if present).
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    /// Load defaults, then the optional TOML file, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let mut config = Self::default();
        if let Some(path) = path {
            config.merge_file(path)?;
        }
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Merge a TOML file over the current values.
    pub fn merge_file(&mut self, path: &Path) -> Result<()> {
        let raw = std::fs::read_to_string(path)?;
        self.merge_toml(&raw)
            .map_err(|e| MikiError::Configuration(format!("{}: {e}", path.display())))
    }

    /// Merge TOML text over the current values.
    pub fn merge_toml(&mut self, raw: &str) -> Result<()> {
        let file: FileConfig =
            toml::from_str(raw).map_err(|e| MikiError::Configuration(e.to_string()))?;

        let model = file.model;
        if let Some(v) = model.base_url {
            self.model.base_url = v;
        }
        if let Some(v) = model.api_key {
            self.model.api_key = v;
        }
        if let Some(v) = model.model {
            self.model.model = v;
        }
        if let Some(v) = model.temperature {
            self.model.temperature = v;
        }
        if let Some(v) = model.timeout_secs {
            self.model.timeout = Duration::from_secs(v);
        }
        if let Some(v) = model.structured_output {
            self.model.structured_output = v;
        }

        let server = file.server;
        if let Some(v) = server.host {
            self.server.host = v;
        }
        if let Some(v) = server.port {
            self.server.port = v;
        }
        if let Some(v) = server.static_dir {
            self.server.static_dir = v;
        }
        Ok(())
    }

    /// Apply environment-style overrides from `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(key) = lookup(API_KEY_ENV) {
            self.model.api_key = key;
        }
        if let Some(url) = lookup("MIKI_BASE_URL") {
            self.model.base_url = url;
        }
        if let Some(model) = lookup("MIKI_MODEL") {
            self.model.model = model;
        }
        if let Some(raw) = lookup("MIKI_TEMPERATURE") {
            self.model.temperature = parse_var("MIKI_TEMPERATURE", &raw)?;
        }
        if let Some(raw) = lookup("MIKI_TIMEOUT_SECS") {
            self.model.timeout = Duration::from_secs(parse_var("MIKI_TIMEOUT_SECS", &raw)?);
        }
        if let Some(raw) = lookup("MIKI_STRUCTURED_OUTPUT") {
            self.model.structured_output = parse_var("MIKI_STRUCTURED_OUTPUT", &raw)?;
        }
        if let Some(host) = lookup("MIKI_HOST") {
            self.server.host = host;
        }
        if let Some(raw) = lookup("MIKI_PORT") {
            self.server.port = parse_var("MIKI_PORT", &raw)?;
        }
        if let Some(dir) = lookup("MIKI_STATIC_DIR") {
            self.server.static_dir = PathBuf::from(dir);
        }
        Ok(())
    }
}

fn parse_var<T>(name: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| MikiError::Configuration(format!("Invalid {name} '{raw}': {e}")))
}
