//! Generation backend implementations.

#[cfg(feature = "http")]
pub mod openai;

pub mod mock;

use std::sync::Arc;

use async_trait::async_trait;

use crate::{Generation, GenerationRequest, Result};

/// Trait for text-generation backends.
///
/// This trait abstracts over the remote model provider so the pipeline
/// can run against a real endpoint or against scripted responses.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Short backend identifier used in logs.
    fn name(&self) -> &str;

    /// Run one generation request.
    ///
    /// Structured requests must return text that decodes into the
    /// requested schema; text requests return prose.
    async fn generate(&self, request: GenerationRequest) -> Result<Generation>;
}

#[async_trait]
impl<B: LlmBackend + ?Sized> LlmBackend for Arc<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn generate(&self, request: GenerationRequest) -> Result<Generation> {
        (**self).generate(request).await
    }
}

#[async_trait]
impl<B: LlmBackend + ?Sized> LlmBackend for Box<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn generate(&self, request: GenerationRequest) -> Result<Generation> {
        (**self).generate(request).await
    }
}
