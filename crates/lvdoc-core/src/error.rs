//! Error types for the lvdoc-core library.

use thiserror::Error;

use lvdoc_llm::LlmError;

use crate::pipeline::Stage;

/// A category name outside the closed set of supported document types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported document category: {0:?}")]
pub struct UnsupportedCategory(pub String);

/// Errors produced by the stage functions.
#[derive(Error, Debug)]
pub enum StageError {
    /// The remote model was unreachable or its output could not be coerced
    /// into the requested shape.
    #[error("external service error during {stage}: {source}")]
    ExternalService {
        stage: Stage,
        #[source]
        source: LlmError,
    },

    /// Extraction was requested for an unknown category.
    #[error(transparent)]
    UnsupportedCategory(#[from] UnsupportedCategory),
}

impl StageError {
    /// Whether the remote model was involved in the failure.
    pub fn is_external(&self) -> bool {
        matches!(self, StageError::ExternalService { .. })
    }
}

/// Errors surfaced by the coordinator at the boundary of a user action.
#[derive(Error, Debug)]
pub enum CoordinatorError {
    /// The input was rejected locally before any remote call.
    #[error("{0}")]
    Validation(String),

    /// The stage requires a predecessor that has not completed.
    #[error("{stage} requires a detected document type")]
    Precondition { stage: Stage },

    /// A stage ran and failed.
    #[error("{}", .stage.failure_message())]
    Stage {
        stage: Stage,
        #[source]
        source: StageError,
    },
}

impl CoordinatorError {
    /// Human-readable message for the presentation layer.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

/// Errors related to the key-value store behind the history.
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O failure of a file-backed store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored value could not be encoded or decoded.
    #[error("invalid stored value: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store lock was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    Poisoned,
}

/// Errors related to configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read or write the configuration file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid JSON for this schema.
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// The environment variable holding the API key is unset.
    #[error("API key variable {0} is not set")]
    MissingApiKey(String),
}
