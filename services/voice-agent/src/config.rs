//! Application Configuration Module
//!
//! Loads the service settings from environment variables (and a `.env`
//! file, when present) into a single struct built once at startup.

use secrecy::{ExposeSecret, SecretString};
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_LOG_FILTER: &str = "info";
pub const DEFAULT_PERSONALIZATION_FILE: &str = "./personalization.json";

#[derive(Debug)]
pub struct Config {
    pub openai_api_key: SecretString,
    pub realtime_url: Option<String>,
    pub realtime_model: Option<String>,
    pub log_filter: String,
    pub personalization_file: PathBuf,
    pub scratch_pad_dir: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid log level provided for RUST_LOG: {0}")]
    InvalidLogLevel(String),
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// * `OPENAI_API_KEY`: required.
    /// * `OPENAI_REALTIME_URL`, `OPENAI_REALTIME_MODEL`: endpoint overrides.
    /// * `RUST_LOG`: a log filter, defaults to `info`.
    /// * `PERSONALIZATION_FILE`: defaults to `./personalization.json`.
    /// * `SCRATCH_PAD_DIR`: where the file tools work, defaults to `./scratchpad`.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let openai_api_key = var("OPENAI_API_KEY")
            .ok_or_else(|| ConfigError::MissingVar("OPENAI_API_KEY".to_string()))?;

        let log_filter = var("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
        EnvFilter::try_new(&log_filter)
            .map_err(|_| ConfigError::InvalidLogLevel(log_filter.clone()))?;

        Ok(Self {
            openai_api_key: SecretString::from(openai_api_key),
            realtime_url: var("OPENAI_REALTIME_URL"),
            realtime_model: var("OPENAI_REALTIME_MODEL"),
            log_filter,
            personalization_file: var("PERSONALIZATION_FILE")
                .unwrap_or_else(|| DEFAULT_PERSONALIZATION_FILE.to_string())
                .into(),
            scratch_pad_dir: var("SCRATCH_PAD_DIR")
                .unwrap_or_else(|| voice_agent_tools::DEFAULT_SCRATCH_PAD_DIR.to_string())
                .into(),
        })
    }

    /// Connection settings for the realtime client.
    pub fn realtime(&self) -> openai_realtime::Config {
        let mut builder =
            openai_realtime::ConfigBuilder::new().with_api_key(self.openai_api_key.expose_secret());
        if let Some(url) = &self.realtime_url {
            builder = builder.with_base_url(url);
        }
        if let Some(model) = &self.realtime_model {
            builder = builder.with_model(model);
        }
        builder.build()
    }
}
