use anyhow::{Context, Result};
use std::path::PathBuf;

const DEFAULT_CONFIG_PATH: &str = "config/wayfinder.toml";

/// Secrets and env-specific values. Models, prompts and data paths live in
/// the TOML FileConfig.
#[derive(Clone)]
pub struct AppConfig {
    pub openai_api_key: String,
    pub openai_base_url: Option<String>,
    pub config_path: PathBuf,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("openai_api_key", &"<redacted>")
            .field("openai_base_url", &self.openai_base_url)
            .field("config_path", &self.config_path)
            .finish()
    }
}

impl AppConfig {
    /// Read from the process environment. The binary loads `.env` once at
    /// startup, before this runs.
    pub fn from_env() -> Result<Self> {
        let config = Self {
            openai_api_key: std::env::var("OPENAI_API_KEY")
                .context("OPENAI_API_KEY environment variable is required")?,
            openai_base_url: std::env::var("OPENAI_BASE_URL")
                .ok()
                .filter(|v| !v.is_empty()),
            config_path: std::env::var("WAYFINDER_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH)),
        };

        config.log_keys();
        Ok(config)
    }

    /// Override the config file location (e.g. from a CLI flag).
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = path.into();
        self
    }

    fn log_keys(&self) {
        // Only presence and length; the key itself never reaches the logs.
        let key_state = if self.openai_api_key.is_empty() {
            "<empty>".to_string()
        } else {
            format!("<set> ({} chars)", self.openai_api_key.len())
        };

        tracing::info!("Config loaded:");
        tracing::info!("  OPENAI_API_KEY: {}", key_state);
        tracing::info!(
            "  OPENAI_BASE_URL: {}",
            self.openai_base_url.as_deref().unwrap_or("<default>")
        );
        tracing::info!("  WAYFINDER_CONFIG: {}", self.config_path.display());
    }
}
