use thiserror::Error;

/// Shown when the service rejects a request without saying why.
pub const GENERIC_GENERATION_FAILURE: &str =
    "Could not generate questions. Check the generation service settings.";

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation service returned {status}: {}", .message.as_deref().unwrap_or("no error message"))]
    Rejected { status: u16, message: Option<String> },
    #[error("failed to reach generation service: {0}")]
    Transport(String),
    #[error("generation request timed out")]
    Timeout,
    #[error("invalid generation response payload: {0}")]
    InvalidResponse(String),
    #[error("generation was cancelled")]
    Cancelled,
    #[error("generation endpoint unavailable: {0}")]
    Endpoint(String),
    #[error("generation request was not sent: {0}")]
    Dispatch(String),
}

impl GenerationError {
    /// Text shown to the user: the service's own message verbatim when it
    /// sent one, a generic message for a bare rejection, otherwise the error.
    pub fn user_message(&self) -> String {
        match self {
            GenerationError::Rejected {
                message: Some(message),
                ..
            } => message.clone(),
            GenerationError::Rejected { message: None, .. } => {
                GENERIC_GENERATION_FAILURE.to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GenerationError::Timeout
        } else if err.is_decode() {
            GenerationError::InvalidResponse(err.to_string())
        } else {
            GenerationError::Transport(err.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("no material selected for generation")]
    MissingSelection,
    #[error("question generation is already in progress")]
    GenerationInProgress,
    #[error(transparent)]
    Generation(#[from] GenerationError),
}
