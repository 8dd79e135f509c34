//! Extraction engine: fixed instruction + model call + response extraction.
//!
//! Constructed once at process start with its collaborators injected, then
//! shared read-only across requests. Each `extract` call is stateless, so
//! arbitrarily many may run concurrently without synchronization.

use std::sync::Arc;

use super::groq::GroqClient;
use super::parser::parse_reply;
use super::prompt::SchemaVersion;
use super::types::{LlmClient, StructuredRecord};
use super::ExtractError;
use crate::config::{AppConfig, ConfigError};
use crate::vocabulary::CanonicalVocabulary;

pub struct ExtractionEngine {
    client: Box<dyn LlmClient>,
    vocabulary: Arc<CanonicalVocabulary>,
    schema: SchemaVersion,
}

impl ExtractionEngine {
    pub fn new(
        client: Box<dyn LlmClient>,
        vocabulary: Arc<CanonicalVocabulary>,
        schema: SchemaVersion,
    ) -> Self {
        Self {
            client,
            vocabulary,
            schema,
        }
    }

    /// Production wiring: Groq client plus the CSV vocabulary named by the
    /// configuration. Fails fast when the vocabulary cannot be loaded: the
    /// process must not start without it.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let vocabulary =
            CanonicalVocabulary::from_csv_path(&config.vocabulary_path, &config.vocabulary_column)?;
        Ok(Self::new(
            Box::new(GroqClient::from_config(config)),
            Arc::new(vocabulary),
            SchemaVersion::default(),
        ))
    }

    pub fn schema(&self) -> SchemaVersion {
        self.schema
    }

    pub fn vocabulary(&self) -> &CanonicalVocabulary {
        &self.vocabulary
    }

    /// Convert a clinical note into a structured record.
    ///
    /// Sends the versioned system instruction plus the note, then pipes the
    /// reply through the response extractor. Failures propagate unchanged:
    /// [`ExtractError::UpstreamUnavailable`] from the model call,
    /// [`ExtractError::MalformedResponse`] from extraction.
    pub fn extract(&self, clinical_text: &str) -> Result<StructuredRecord, ExtractError> {
        let reply = self
            .client
            .invoke(self.schema.system_instruction(), clinical_text)?;
        tracing::debug!(reply_len = reply.len(), "model reply received");
        parse_reply(&reply, &self.vocabulary, self.schema)
    }
}
