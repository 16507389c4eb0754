// src/analysis/error.rs
use thiserror::Error;

pub type ClassifyResult<T> = Result<T, ClassifyError>;

/// Failure modes of a classification attempt. Transport problems are kept
/// separate from "the model answered badly" so callers can tell a dead
/// network from a declined analysis.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("no API key configured. Set GEMINI_API_KEY or pass --api-key")]
    MissingApiKey,

    #[error("neural response was empty. The model might have failed to identify the object")]
    EmptyResponse,

    #[error("neural output format was invalid: {0}")]
    InvalidFormat(String),

    #[error("service returned {status}: {body}")]
    ServiceStatus {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl ClassifyError {
    /// True for errors caused by the connection rather than the model's answer.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ClassifyError::Network(_) | ClassifyError::ServiceStatus { .. }
        )
    }
}
