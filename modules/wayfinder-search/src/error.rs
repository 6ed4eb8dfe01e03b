use ai_client::AiError;
use thiserror::Error;

/// Failures surfaced by the interpret step. Validation and filtering are total.
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    /// Transport or HTTP failure talking to the inference service. Not retried.
    #[error("inference service error: {0}")]
    InferenceService(#[from] AiError),

    /// Function-call arguments were present but could not be decoded.
    #[error("could not parse function-call arguments: {0}")]
    Parse(String),
}
