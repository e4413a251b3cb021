use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid retrieval.top_k: {0}. Must be between 1 and 100")]
    InvalidTopK(usize),

    #[error("Invalid embedding.dimension: {0}. Must be positive")]
    InvalidDimension(usize),

    #[error("index.namespace cannot be empty")]
    EmptyNamespace,

    #[error("Invalid chunking configuration: {0}")]
    InvalidChunking(String),

    #[error("Invalid llm.temperature: {0}. Must be between 0.0 and 2.0")]
    InvalidTemperature(f32),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty, compact")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidLogRotation(String),

    #[error("Invalid {0}: timeout must be at least 1 second")]
    InvalidTimeout(&'static str),

    #[error("Invalid {0}: batch size must be at least 1")]
    InvalidBatchSize(&'static str),
}

/// Provider variables honoured without the `DOCENT_` prefix, and the config
/// key each one fills.
const WELL_KNOWN_ENV: &[(&str, &str)] = &[
    ("OPENAI_API_KEY", "embedding.api_key"),
    ("OPENAI_API_KEY", "llm.api_key"),
    ("PINECONE_API_KEY", "index.api_key"),
    ("PINECONE_INDEX_NAME", "index.name"),
];

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .docent/config.yaml (project config)
    /// 3. .docent/local.yaml (project local overrides, optional)
    /// 4. Provider variables (OPENAI_API_KEY, PINECONE_API_KEY, PINECONE_INDEX_NAME)
    /// 5. Environment variables (DOCENT_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".docent/config.yaml"))
            .merge(Yaml::file(".docent/local.yaml"));

        let config: Config = Self::with_env(figment)
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file instead of the project files
    ///
    /// Environment variables still apply on top of the file.
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path));

        let config: Config = Self::with_env(figment)
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn with_env(figment: Figment) -> Figment {
        let figment = WELL_KNOWN_ENV
            .iter()
            .fold(figment, |figment, &(var, key)| {
                figment.merge(Env::raw().only(&[var]).map(move |_| key.into()))
            });
        figment.merge(Env::prefixed("DOCENT_").split("__"))
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let top_k = config.retrieval.top_k;
        if top_k == 0 || top_k > 100 {
            return Err(ConfigError::InvalidTopK(top_k));
        }

        if config.embedding.dimension == 0 {
            return Err(ConfigError::InvalidDimension(config.embedding.dimension));
        }

        if config.index.namespace.trim().is_empty() {
            return Err(ConfigError::EmptyNamespace);
        }

        config
            .chunking
            .validate()
            .map_err(ConfigError::InvalidChunking)?;

        if !(0.0..=2.0).contains(&config.llm.temperature) {
            return Err(ConfigError::InvalidTemperature(config.llm.temperature));
        }

        let timeouts = [
            ("embedding.timeout_secs", config.embedding.timeout_secs),
            ("llm.timeout_secs", config.llm.timeout_secs),
            ("index.timeout_secs", config.index.timeout_secs),
            ("index.ready_timeout_secs", config.index.ready_timeout_secs),
        ];
        if let Some((name, _)) = timeouts.iter().find(|(_, secs)| *secs == 0) {
            return Err(ConfigError::InvalidTimeout(name));
        }

        if config.embedding.batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize("embedding.batch_size"));
        }
        if config.index.upsert_batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize("index.upsert_batch_size"));
        }

        // Validate logging config
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty", "compact"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidLogRotation(
                config.logging.rotation.clone(),
            ));
        }

        Ok(())
    }
}
