//! Request and response types shared by all backends.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{LlmError, Result};

/// A named JSON schema the model output must conform to.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonSchema {
    /// Schema name, sent to the provider and used in logs.
    pub name: String,
    /// The JSON schema document.
    pub schema: Value,
    /// Ask the provider to enforce the schema strictly.
    pub strict: bool,
}

impl JsonSchema {
    /// Create a strict schema.
    pub fn strict(name: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            schema,
            strict: true,
        }
    }
}

/// Output format requested from the model.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputFormat {
    /// Unconstrained prose.
    Text,
    /// Output conforming to a JSON schema.
    Json(JsonSchema),
}

impl OutputFormat {
    /// Name of the requested schema, if any.
    pub fn schema_name(&self) -> Option<&str> {
        match self {
            OutputFormat::Text => None,
            OutputFormat::Json(schema) => Some(&schema.name),
        }
    }
}

/// A single generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Optional system instruction.
    pub system: Option<String>,
    /// Rendered user prompt.
    pub prompt: String,
    /// Requested output format.
    pub output: OutputFormat,
}

impl GenerationRequest {
    /// Request free-form text.
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            output: OutputFormat::Text,
        }
    }

    /// Request output conforming to `schema`.
    pub fn structured(prompt: impl Into<String>, schema: JsonSchema) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            output: OutputFormat::Json(schema),
        }
    }

    /// Set the system instruction.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

/// Raw output of a generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    /// Text content returned by the model.
    pub text: String,
    /// Model that produced the output, when reported.
    pub model: Option<String>,
}

impl Generation {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model: None,
        }
    }

    /// Decode schema-conformant output into `T`.
    pub fn parse_json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(self.text.trim()).map_err(|e| {
            LlmError::Serialization(format!("output does not match the requested shape: {e}"))
        })
    }
}
