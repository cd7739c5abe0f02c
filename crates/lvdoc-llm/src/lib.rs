//! Text-generation abstraction layer for lvdoc.
//!
//! This crate provides a unified interface for calling a remote language
//! model across different backends:
//! - `openai` speaking the OpenAI-compatible chat completions protocol,
//!   with strict JSON-schema structured output
//! - `mock` returning scripted responses for tests and offline runs

mod backend;
mod error;
mod request;

pub use backend::LlmBackend;
pub use backend::mock::MockBackend;
pub use error::LlmError;
pub use request::{Generation, GenerationRequest, JsonSchema, OutputFormat};

#[cfg(feature = "http")]
pub use backend::openai::{OpenAiBackend, OpenAiConfig};

/// Result type for generation operations.
pub type Result<T> = std::result::Result<T, LlmError>;
