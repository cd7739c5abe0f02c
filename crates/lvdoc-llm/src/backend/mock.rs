//! Scripted backend for tests and offline runs.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::LlmError;
use crate::{Generation, GenerationRequest, LlmBackend, Result};

enum Reply {
    Text(String),
    Failure(String),
}

/// Backend that replays queued responses in order and records every
/// request it receives.
#[derive(Default)]
pub struct MockBackend {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw text reply.
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.push(Reply::Text(text.into()));
        self
    }

    /// Queue a JSON reply.
    pub fn with_json(self, value: Value) -> Self {
        self.push(Reply::Text(value.to_string()));
        self
    }

    /// Queue a transport failure.
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.push(Reply::Failure(message.into()));
        self
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Number of generation calls received.
    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    fn push(&self, reply: Reply) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
    }
}

#[async_trait]
impl LlmBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: GenerationRequest) -> Result<Generation> {
        debug!(
            schema = request.output.schema_name().unwrap_or("text"),
            prompt_len = request.prompt.len(),
            "mock generation"
        );

        self.requests
            .lock()
            .map_err(|_| LlmError::Response("mock request log poisoned".to_string()))?
            .push(request);

        let reply = self
            .replies
            .lock()
            .map_err(|_| LlmError::Response("mock reply queue poisoned".to_string()))?
            .pop_front();

        match reply {
            Some(Reply::Text(text)) => Ok(Generation {
                text,
                model: Some("mock".to_string()),
            }),
            Some(Reply::Failure(message)) => Err(LlmError::Http(message)),
            None => Err(LlmError::Response(
                "mock backend has no scripted reply left".to_string(),
            )),
        }
    }
}
