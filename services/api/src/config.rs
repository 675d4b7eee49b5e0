//! Gateway configuration, loaded from environment variables (a local `.env`
//! file is honored for development).

use std::env;
use tracing::Level;

/// Gemini API key values that mean "no key configured".
const PLACEHOLDER_API_KEY: &str = "your_gemini_api_key_here";

const DEFAULT_CHAT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

#[derive(Debug, Clone)]
pub struct Config {
    /// Absent key selects the deterministic fallback responder; the
    /// service still runs a complete interview without it.
    pub gemini_api_key: Option<String>,
    pub chat_model: String,
    pub bind_addr: String,
    pub log_level: Level,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid log level provided for RUST_LOG: {0}")]
    InvalidLogLevel(String),
}

impl Config {
    /// Loads configuration from the environment.
    ///
    // *   `GEMINI_API_KEY`: (Optional) Key for the Gemini generateContent API.
    //     Empty or the placeholder value counts as unset.
    // *   `CHAT_MODEL`: (Optional) Model name. Defaults to "gemini-1.5-flash".
    // *   `BIND_ADDR`: (Optional) Listen address. Defaults to "0.0.0.0:5000".
    // *   `RUST_LOG`: (Optional) Logging level. Defaults to "INFO".
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let gemini_api_key = env::var("GEMINI_API_KEY")
            .ok()
            .filter(|key| !key.is_empty() && key != PLACEHOLDER_API_KEY);

        let chat_model =
            env::var("CHAT_MODEL").unwrap_or_else(|_| DEFAULT_CHAT_MODEL.to_string());
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        let log_level_str = env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str
            .parse::<Level>()
            .map_err(|_| ConfigError::InvalidLogLevel(log_level_str))?;

        Ok(Self {
            gemini_api_key,
            chat_model,
            bind_addr,
            log_level,
        })
    }
}
