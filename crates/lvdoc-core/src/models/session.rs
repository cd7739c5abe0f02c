//! Working state of one analysis and the history of past inputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::document::{ClassificationResult, DocumentCategory, DocumentRecord};

/// Number of characters kept from an input in its history entry.
pub const HISTORY_PREVIEW_CHARS: usize = 100;

/// Working state for one submitted input text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSession {
    /// Text as submitted.
    pub input_text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<ClassificationResult>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<DocumentRecord>,
}

/// Output of one stage, merged into the session by the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionDelta {
    Classified(ClassificationResult),
    Summarized(String),
    Extracted(DocumentRecord),
}

impl AnalysisSession {
    /// Start a session for `input_text`.
    pub fn new(input_text: impl Into<String>) -> Self {
        Self {
            input_text: input_text.into(),
            classification: None,
            summary: None,
            record: None,
        }
    }

    /// Detected category, if detection has completed.
    pub fn category(&self) -> Option<DocumentCategory> {
        self.classification.as_ref().map(|c| c.category)
    }

    /// Merge a stage result.
    ///
    /// A classification with a different category drops the summary and
    /// record produced for the previous one.
    pub fn apply(&mut self, delta: SessionDelta) {
        match delta {
            SessionDelta::Classified(classification) => {
                if self.category().is_some_and(|c| c != classification.category) {
                    self.summary = None;
                    self.record = None;
                }
                self.classification = Some(classification);
            }
            SessionDelta::Summarized(summary) => self.summary = Some(summary),
            SessionDelta::Extracted(record) => self.record = Some(record),
        }
    }

    /// Whether every stage has produced its result.
    pub fn is_complete(&self) -> bool {
        self.classification.is_some() && self.summary.is_some() && self.record.is_some()
    }
}

/// A previously submitted input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Leading characters of the input, with "..." appended when cut.
    pub truncated_text: String,

    /// Submission time.
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(text: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            truncated_text: truncate_preview(text),
            timestamp,
        }
    }
}

fn truncate_preview(text: &str) -> String {
    match text.char_indices().nth(HISTORY_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
