//! Session state machine sequencing the pipeline stages.

use chrono::Utc;
use lvdoc_llm::LlmBackend;
use tracing::{debug, info, warn};

use crate::error::{CoordinatorError, StageError};
use crate::history::{HistoryStore, KeyValueStore};
use crate::models::document::{ClassificationResult, DocumentCategory, DocumentRecord};
use crate::models::session::{AnalysisSession, HistoryEntry, SessionDelta};

use super::{DocumentAnalyzer, Stage, validate_input};

/// Result type for coordinator actions.
pub type Result<T> = std::result::Result<T, CoordinatorError>;

/// Coordinator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    /// No analysis in progress.
    Idle,
    Detecting,
    Summarizing,
    Extracting,
    /// The last requested action finished.
    Complete,
    /// The last stage failed; see [`Coordinator::error_message`].
    Failed,
}

/// Owns the single active [`AnalysisSession`] and the input history.
///
/// Every action takes `&mut self`, so stages of one session always run
/// one after another and the session has exactly one writer.
pub struct Coordinator<B, S> {
    analyzer: DocumentAnalyzer<B>,
    history: HistoryStore<S>,
    state: CoordinatorState,
    session: Option<AnalysisSession>,
    error_message: Option<String>,
}

impl<B: LlmBackend, S: KeyValueStore> Coordinator<B, S> {
    pub fn new(analyzer: DocumentAnalyzer<B>, history: HistoryStore<S>) -> Self {
        Self {
            analyzer,
            history,
            state: CoordinatorState::Idle,
            session: None,
            error_message: None,
        }
    }

    pub fn analyzer(&self) -> &DocumentAnalyzer<B> {
        &self.analyzer
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    /// The current session, if text has been submitted.
    pub fn session(&self) -> Option<&AnalysisSession> {
        self.session.as_ref()
    }

    /// Message of the last failed stage.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Past inputs, most recent first.
    pub fn history(&self) -> &[HistoryEntry] {
        self.history.entries()
    }

    /// Whether summarization is currently allowed.
    pub fn can_summarize(&self) -> bool {
        self.current_category().is_some()
    }

    /// Whether extraction is currently allowed.
    pub fn can_extract(&self) -> bool {
        self.current_category().is_some()
    }

    /// Submit `text` and detect its document type.
    ///
    /// Text that differs from the current session's input starts a new
    /// session; the same text keeps the session and refreshes its
    /// classification.
    pub async fn detect(&mut self, text: &str) -> Result<ClassificationResult> {
        let classification = self.run_detection(text).await?;
        self.transition(CoordinatorState::Complete);
        Ok(classification)
    }

    /// Summarize the current session's text.
    pub async fn summarize(&mut self) -> Result<String> {
        let summary = self.run_summary().await?;
        self.transition(CoordinatorState::Complete);
        Ok(summary)
    }

    /// Extract the structured record of the current session's text.
    pub async fn extract(&mut self) -> Result<DocumentRecord> {
        let record = self.run_extraction().await?;
        self.transition(CoordinatorState::Complete);
        Ok(record)
    }

    /// Submit `text` and run detection, summarization and extraction in
    /// sequence, stopping at the first failure.
    pub async fn process_all(&mut self, text: &str) -> Result<()> {
        self.run_detection(text).await?;
        self.run_summary().await?;
        self.run_extraction().await?;
        self.transition(CoordinatorState::Complete);
        info!("document processed");
        Ok(())
    }

    /// Discard the session and return to idle.
    pub fn clear(&mut self) {
        self.session = None;
        self.error_message = None;
        self.transition(CoordinatorState::Idle);
    }

    async fn run_detection(&mut self, text: &str) -> Result<ClassificationResult> {
        let text = validate_input(text)?;

        let same_input = self.session.as_ref().is_some_and(|s| s.input_text == text);
        if !same_input {
            self.session = Some(AnalysisSession::new(text));
        }
        self.error_message = None;
        self.transition(CoordinatorState::Detecting);

        match self.analyzer.detect(text).await {
            Ok(classification) => {
                if let Err(e) = self.history.record(text, Utc::now()) {
                    warn!("Failed to save history entry: {}", e);
                }
                self.apply(SessionDelta::Classified(classification.clone()));
                Ok(classification)
            }
            Err(e) => Err(self.fail(Stage::Detection, e)),
        }
    }

    async fn run_summary(&mut self) -> Result<String> {
        let (text, category) = self.require_classification(Stage::Summary)?;
        self.transition(CoordinatorState::Summarizing);

        match self.analyzer.summarize(&text, category).await {
            Ok(summary) => {
                self.apply(SessionDelta::Summarized(summary.clone()));
                Ok(summary)
            }
            Err(e) => Err(self.fail(Stage::Summary, e)),
        }
    }

    async fn run_extraction(&mut self) -> Result<DocumentRecord> {
        let (text, category) = self.require_classification(Stage::Extraction)?;
        self.transition(CoordinatorState::Extracting);

        match self.analyzer.extract(&text, category).await {
            Ok(record) => {
                for issue in record.validate() {
                    warn!("Extracted {}: {}", category, issue);
                }
                self.apply(SessionDelta::Extracted(record.clone()));
                Ok(record)
            }
            Err(e) => Err(self.fail(Stage::Extraction, e)),
        }
    }

    fn current_category(&self) -> Option<DocumentCategory> {
        self.session.as_ref().and_then(AnalysisSession::category)
    }

    fn require_classification(&self, stage: Stage) -> Result<(String, DocumentCategory)> {
        self.session
            .as_ref()
            .and_then(|s| s.category().map(|c| (s.input_text.clone(), c)))
            .ok_or_else(|| {
                warn!("Rejected {}: no document type detected yet", stage);
                CoordinatorError::Precondition { stage }
            })
    }

    fn apply(&mut self, delta: SessionDelta) {
        if let Some(session) = self.session.as_mut() {
            session.apply(delta);
        }
    }

    fn fail(&mut self, stage: Stage, source: StageError) -> CoordinatorError {
        self.error_message = Some(stage.failure_message().to_string());
        self.transition(CoordinatorState::Failed);
        CoordinatorError::Stage { stage, source }
    }

    fn transition(&mut self, next: CoordinatorState) {
        debug!(from = ?self.state, to = ?next, "coordinator transition");
        self.state = next;
    }
}
