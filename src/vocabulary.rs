//! Canonical medicine-name vocabulary.
//!
//! Loaded once at process start from a tabular dataset (CSV with at least a
//! medicine-name column) and shared read-only across requests. The corrector
//! scores extracted tokens against these entries; vocabulary order matters
//! because score ties resolve to the first entry encountered.

use std::collections::HashSet;
use std::path::Path;

use thiserror::Error;

/// Column holding medicine names unless configured otherwise.
pub const DEFAULT_NAME_COLUMN: &str = "name";

/// Errors while loading the vocabulary dataset. All of these are fatal at
/// startup; a process without a vocabulary must not serve requests.
#[derive(Error, Debug)]
pub enum VocabularyError {
    #[error("cannot read vocabulary dataset: {0}")]
    Csv(#[from] csv::Error),

    #[error("vocabulary dataset has no '{0}' column")]
    MissingColumn(String),
}

/// Ordered, de-duplicated set of known medicine names.
#[derive(Debug, Clone, Default)]
pub struct CanonicalVocabulary {
    entries: Vec<String>,
}

impl CanonicalVocabulary {
    /// Load the vocabulary from a CSV file, taking the named column.
    ///
    /// Values are trimmed, empties dropped, and duplicates collapsed
    /// case-insensitively: the first occurrence wins and keeps its original
    /// casing (corrections emit the canonical casing, not the token's).
    pub fn from_csv_path(path: &Path, column: &str) -> Result<Self, VocabularyError> {
        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();
        let index = headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(column))
            .ok_or_else(|| VocabularyError::MissingColumn(column.to_string()))?;

        let mut entries = Vec::new();
        let mut seen = HashSet::new();
        for record in reader.records() {
            let record = record?;
            let Some(raw) = record.get(index) else {
                continue;
            };
            let name = raw.trim();
            if name.is_empty() {
                continue;
            }
            if seen.insert(name.to_lowercase()) {
                entries.push(name.to_string());
            }
        }

        tracing::info!(
            entries = entries.len(),
            path = %path.display(),
            "loaded medicine vocabulary"
        );
        Ok(Self { entries })
    }

    /// Build a vocabulary from an in-memory list of names. Same trimming and
    /// de-duplication rules as the CSV path.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries = Vec::new();
        let mut seen = HashSet::new();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                continue;
            }
            if seen.insert(name.to_lowercase()) {
                entries.push(name.to_string());
            }
        }
        Self { entries }
    }

    /// Entries in load order.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
