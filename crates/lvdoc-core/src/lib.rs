//! Core library for Latvian business document analysis.
//!
//! This crate provides:
//! - Data models for invoices, delivery notes and receipts
//! - JSON schemas and prompts for structured-output model calls
//! - The three pipeline stages: type detection, summarization, extraction
//! - A coordinator sequencing the stages over one analysis session
//! - A bounded, persisted history of submitted inputs

pub mod error;
pub mod history;
pub mod models;
pub mod pipeline;

pub use error::{ConfigError, CoordinatorError, StageError, StoreError, UnsupportedCategory};
pub use history::{FileStore, HistoryStore, KeyValueStore, MemoryStore};
pub use models::config::LvdocConfig;
pub use models::document::{
    ClassificationResult, DeliveryNoteRecord, DocumentCategory, DocumentRecord, InvoiceRecord,
    LineItem, Party, PaymentDetails, ReceiptRecord, RecordBase,
};
pub use models::session::{AnalysisSession, HistoryEntry};
pub use pipeline::{Coordinator, CoordinatorState, DocumentAnalyzer, Stage};

/// Re-export backend types.
pub use lvdoc_llm::{LlmBackend, LlmError, MockBackend};

#[cfg(feature = "http")]
pub use lvdoc_llm::{OpenAiBackend, OpenAiConfig};
