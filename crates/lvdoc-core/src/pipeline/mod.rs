//! Document analysis pipeline: detection, summarization and extraction.

mod analyzer;
mod coordinator;
pub mod prompts;
pub mod schema;

pub use analyzer::DocumentAnalyzer;
pub use coordinator::{Coordinator, CoordinatorState};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoordinatorError;

/// One request/response unit against the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Detection,
    Summary,
    Extraction,
}

impl Stage {
    /// Message shown to the user when the stage fails.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Stage::Detection => {
                "An error occurred during document type detection. Please try again."
            }
            Stage::Summary => "An error occurred while summarizing the document. Please try again.",
            Stage::Extraction => {
                "An error occurred while extracting document data. Please try again."
            }
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Detection => "document type detection",
            Stage::Summary => "summarization",
            Stage::Extraction => "data extraction",
        })
    }
}

/// Reject input that cannot be analyzed, before any remote call.
pub fn validate_input(text: &str) -> Result<&str, CoordinatorError> {
    if text.trim().is_empty() {
        return Err(CoordinatorError::Validation(
            "Please enter the document text to analyze.".to_string(),
        ));
    }
    Ok(text)
}
