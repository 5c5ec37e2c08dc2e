use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "CareCompass";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_BIND: &str = "127.0.0.1:8787";
const DEFAULT_LLM_URL: &str = "http://localhost:11434";
const DEFAULT_LLM_MODEL: &str = "medgemma";
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },

    #[error("Cannot determine home directory; set CARECOMPASS_DB_PATH")]
    NoHomeDir,
}

/// Settings for the generative text backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_LLM_URL.to_string(),
            model: DEFAULT_LLM_MODEL.to_string(),
            timeout_secs: DEFAULT_LLM_TIMEOUT_SECS,
        }
    }
}

/// Everything the entry point needs to wire the service together.
///
/// Built once at startup and handed to the constructors that need it.
/// Nothing in the crate reads the environment after this point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub db_path: PathBuf,
    pub llm: LlmConfig,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_raw = lookup("CARECOMPASS_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidValue {
                var: "CARECOMPASS_BIND",
                value: bind_raw.clone(),
            })?;

        let db_path = match lookup("CARECOMPASS_DB_PATH") {
            Some(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_db_path()?,
        };

        let mut llm = LlmConfig::default();
        if let Some(url) = lookup("CARECOMPASS_LLM_URL") {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::InvalidValue {
                    var: "CARECOMPASS_LLM_URL",
                    value: url,
                });
            }
            llm.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = lookup("CARECOMPASS_LLM_MODEL") {
            if !model.trim().is_empty() {
                llm.model = model.trim().to_string();
            }
        }
        if let Some(raw) = lookup("CARECOMPASS_LLM_TIMEOUT_SECS") {
            llm.timeout_secs = raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidValue {
                    var: "CARECOMPASS_LLM_TIMEOUT_SECS",
                    value: raw.clone(),
                })?;
        }

        Ok(Self {
            bind_addr,
            db_path,
            llm,
        })
    }
}

/// Get the application data directory
/// ~/CareCompass/ on all platforms
pub fn app_data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(APP_NAME))
}

fn default_db_path() -> Result<PathBuf, ConfigError> {
    app_data_dir()
        .map(|dir| dir.join("carecompass.db"))
        .ok_or(ConfigError::NoHomeDir)
}

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "carecompass=info,carecompass_lib=info,tower_http=info"
}
