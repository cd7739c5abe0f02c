//! Error types for the generation layer.

use thiserror::Error;

/// Errors that can occur while talking to a text-generation backend.
#[derive(Error, Debug)]
pub enum LlmError {
    /// The backend could not be configured.
    #[error("invalid backend configuration: {0}")]
    Config(String),

    /// Transport-level failure (connection refused, timeout, TLS).
    #[error("http error: {0}")]
    Http(String),

    /// The provider answered with a non-success status.
    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The provider answered, but the payload is unusable.
    #[error("response error: {0}")]
    Response(String),

    /// The model declined to produce the requested output.
    #[error("model refused the request: {0}")]
    Refusal(String),

    /// Output could not be decoded into the requested shape.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        LlmError::Serialization(err.to_string())
    }
}
