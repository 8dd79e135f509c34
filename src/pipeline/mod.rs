pub mod corrector;
pub mod groq;
pub mod orchestrator;
pub mod parser;
pub mod prompt;
pub mod types;

pub use corrector::*;
pub use groq::*;
pub use orchestrator::*;
pub use parser::*;
pub use prompt::*;
pub use types::*;

use thiserror::Error;

/// Failure kinds surfaced by the extraction pipeline.
///
/// Callers pattern-match on the kind: `UpstreamUnavailable` is worth retrying
/// on their side, `MalformedResponse` is not (the model produced output the
/// pipeline refuses to guess a record from).
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The model call failed or timed out after its bounded retries.
    #[error("language model unavailable: {0}")]
    UpstreamUnavailable(String),

    /// No JSON object boundary in the reply, or the slice failed to parse.
    /// Never papered over with a partial record.
    #[error("malformed model response: {0}")]
    MalformedResponse(String),
}
