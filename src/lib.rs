//! clinextract: clinical-note extraction pipeline.
//!
//! Accepts free-text clinical notes (possibly non-English, possibly
//! transcribed from audio by an external collaborator), prompts a
//! language model with a fixed schema contract, and normalizes the raw
//! reply into a structured record: status, medications, services,
//! diagnoses, allergies, chief complaint, summary.
//!
//! The pipeline owns the parts with real logic: recovering a JSON object
//! from an arbitrarily wrapped reply ([`pipeline::parser`]) and fuzzy
//! correction of extracted medicine names against a canonical vocabulary
//! ([`pipeline::corrector`]). HTTP routing, audio transcription, and the
//! model inference service itself are external collaborators.
//!
//! ```no_run
//! use clinextract::{AppConfig, ExtractionEngine};
//!
//! let config = AppConfig::from_env()?;
//! let engine = ExtractionEngine::from_config(&config)?;
//! let record = engine.extract("Patient stable, given parasetamol 500 mg.")?;
//! println!("{}", serde_json::to_string_pretty(&record)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod pipeline;
pub mod vocabulary;

pub use config::{AppConfig, ConfigError};
pub use pipeline::{
    ExtractError, ExtractionEngine, GroqClient, LlmClient, MockLlmClient, SchemaVersion,
    StructuredRecord,
};
pub use vocabulary::{CanonicalVocabulary, VocabularyError};

use tracing_subscriber::EnvFilter;

/// Initialize tracing for a host binary. Honors `RUST_LOG`, falls back to
/// the crate default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}
