use thiserror::Error;

use crate::llm_client::LlmError;

/// Outcome category returned by every collaborator call.
///
/// `Processing` means the input itself could not be handled (unreadable PDF,
/// no text, unanalyzable content). Anything else is `Internal`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Processing(String),

    #[error("{0}")]
    Internal(String),
}

impl From<LlmError> for ServiceError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::EmptyContent | LlmError::Parse(_) => {
                ServiceError::Processing(format!("Resume analysis failed: {err}"))
            }
            LlmError::Http(_)
            | LlmError::Api { .. }
            | LlmError::RateLimited { .. }
            | LlmError::ClientBuild(_) => {
                ServiceError::Internal(format!("Analysis service error: {err}"))
            }
        }
    }
}
