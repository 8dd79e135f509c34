//! Environment-driven startup configuration.
//!
//! Everything the pipeline needs is resolved once here and passed into the
//! engine explicitly. No global mutable state, no re-reads at request time.
//! A missing credential or vocabulary is fatal: the process must not start.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::pipeline::groq;
use crate::vocabulary::{self, VocabularyError};

pub const APP_NAME: &str = "clinextract";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Per-request model-call timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Transient-failure retry budget for the model call.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required configuration: {0}")]
    MissingConfiguration(String),

    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },

    #[error("vocabulary unavailable: {0}")]
    Vocabulary(#[from] VocabularyError),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `GROQ_API_KEY`, required.
    pub api_key: String,
    /// `GROQ_BASE_URL`, defaults to the production endpoint.
    pub base_url: String,
    /// `GROQ_MODEL`, defaults to the calibrated model.
    pub model: String,
    /// `GROQ_TIMEOUT_SECS`.
    pub timeout_secs: u64,
    /// `GROQ_MAX_RETRIES`.
    pub max_retries: u32,
    /// `MEDICINE_VOCABULARY_PATH`, required: CSV with a medicine-name column.
    pub vocabulary_path: PathBuf,
    /// `MEDICINE_VOCABULARY_COLUMN`.
    pub vocabulary_column: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: required("GROQ_API_KEY")?,
            base_url: optional("GROQ_BASE_URL")
                .unwrap_or_else(|| groq::DEFAULT_BASE_URL.to_string()),
            model: optional("GROQ_MODEL").unwrap_or_else(|| groq::DEFAULT_MODEL.to_string()),
            timeout_secs: parsed("GROQ_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            max_retries: parsed("GROQ_MAX_RETRIES", DEFAULT_MAX_RETRIES)?,
            vocabulary_path: required("MEDICINE_VOCABULARY_PATH")?.into(),
            vocabulary_column: optional("MEDICINE_VOCABULARY_COLUMN")
                .unwrap_or_else(|| vocabulary::DEFAULT_NAME_COLUMN.to_string()),
        })
    }
}

fn required(name: &str) -> Result<String, ConfigError> {
    optional(name).ok_or_else(|| ConfigError::MissingConfiguration(name.to_string()))
}

fn optional(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parsed<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(name) {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
    }
}

pub fn default_log_filter() -> &'static str {
    "info,clinextract=debug"
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env vars are process-global, so everything lives in one test to avoid
    // races with parallel test execution.
    #[test]
    fn from_env_reads_and_validates() {
        let clear = || {
            for name in [
                "GROQ_API_KEY",
                "GROQ_BASE_URL",
                "GROQ_MODEL",
                "GROQ_TIMEOUT_SECS",
                "GROQ_MAX_RETRIES",
                "MEDICINE_VOCABULARY_PATH",
                "MEDICINE_VOCABULARY_COLUMN",
            ] {
                env::remove_var(name);
            }
        };

        clear();
        let err = AppConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::MissingConfiguration(n) if n == "GROQ_API_KEY"));

        env::set_var("GROQ_API_KEY", "gsk_test");
        let err = AppConfig::from_env().unwrap_err();
        assert!(
            matches!(err, ConfigError::MissingConfiguration(n) if n == "MEDICINE_VOCABULARY_PATH")
        );

        env::set_var("MEDICINE_VOCABULARY_PATH", "/data/medicines.csv");
        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.api_key, "gsk_test");
        assert_eq!(config.base_url, groq::DEFAULT_BASE_URL);
        assert_eq!(config.model, groq::DEFAULT_MODEL);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.max_retries, DEFAULT_MAX_RETRIES);
        assert_eq!(config.vocabulary_path, PathBuf::from("/data/medicines.csv"));
        assert_eq!(config.vocabulary_column, "name");

        env::set_var("GROQ_TIMEOUT_SECS", "120");
        env::set_var("GROQ_MAX_RETRIES", "0");
        env::set_var("MEDICINE_VOCABULARY_COLUMN", "medicine_name");
        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.timeout_secs, 120);
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.vocabulary_column, "medicine_name");

        env::set_var("GROQ_TIMEOUT_SECS", "soon");
        let err = AppConfig::from_env().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { name: "GROQ_TIMEOUT_SECS", .. }
        ));

        // Whitespace-only values count as missing.
        clear();
        env::set_var("GROQ_API_KEY", "   ");
        let err = AppConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::MissingConfiguration(n) if n == "GROQ_API_KEY"));

        clear();
    }
}
