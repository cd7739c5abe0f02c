//! The three stage functions: detect, summarize, extract.

use lvdoc_llm::{GenerationRequest, LlmBackend, LlmError};
use tracing::{debug, error, info, warn};

use crate::error::StageError;
use crate::models::config::PromptConfig;
use crate::models::document::{ClassificationResult, DocumentCategory, DocumentRecord};

use super::prompts::{SYSTEM_PROMPT, classification_prompt, extraction_prompt, summary_prompt};
use super::schema::{classification_schema, record_schema};
use super::Stage;

/// Result type for stage operations.
pub type Result<T> = std::result::Result<T, StageError>;

/// Runs the pipeline stages against a generation backend.
///
/// Each call is a single request/response; the analyzer holds no
/// per-document state.
pub struct DocumentAnalyzer<B> {
    backend: B,
    prompts: PromptConfig,
}

impl<B: LlmBackend> DocumentAnalyzer<B> {
    /// Create an analyzer with default prompt settings.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            prompts: PromptConfig::default(),
        }
    }

    /// Set prompt tuning.
    pub fn with_prompts(mut self, prompts: PromptConfig) -> Self {
        self.prompts = prompts;
        self
    }

    /// Classify `text` as one of the supported document types.
    pub async fn detect(&self, text: &str) -> Result<ClassificationResult> {
        let request = GenerationRequest::structured(classification_prompt(text), classification_schema())
            .with_system(SYSTEM_PROMPT);

        let generation = self.call(Stage::Detection, request).await?;
        let mut result: ClassificationResult = generation
            .parse_json()
            .map_err(|e| self.failed(Stage::Detection, e))?;

        if !(0.0..=1.0).contains(&result.confidence) {
            warn!(
                "Confidence {} out of range, clamping to [0, 1]",
                result.confidence
            );
            result.confidence = if result.confidence.is_nan() {
                0.0
            } else {
                result.confidence.clamp(0.0, 1.0)
            };
        }

        info!(
            category = %result.category,
            confidence = result.confidence,
            "document type detected"
        );
        Ok(result)
    }

    /// Summarize `text` as a document of the given category.
    pub async fn summarize(&self, text: &str, category: DocumentCategory) -> Result<String> {
        let request = GenerationRequest::text(summary_prompt(text, category, &self.prompts))
            .with_system(SYSTEM_PROMPT);

        let generation = self.call(Stage::Summary, request).await?;
        let summary = generation.text.trim();
        if summary.is_empty() {
            return Err(self.failed(
                Stage::Summary,
                LlmError::Response("empty summary".to_string()),
            ));
        }

        info!(%category, chars = summary.len(), "document summarized");
        Ok(summary.to_string())
    }

    /// Extract the structured record of `text` for the given category.
    pub async fn extract(&self, text: &str, category: DocumentCategory) -> Result<DocumentRecord> {
        let schema = record_schema(category);
        debug!(schema = %schema.name, "extraction schema selected");

        let request = GenerationRequest::structured(extraction_prompt(text, category), schema)
            .with_system(SYSTEM_PROMPT);
        let generation = self.call(Stage::Extraction, request).await?;

        let record = match category {
            DocumentCategory::Invoice => generation.parse_json().map(DocumentRecord::Invoice),
            DocumentCategory::DeliveryNote => {
                generation.parse_json().map(DocumentRecord::DeliveryNote)
            }
            DocumentCategory::Receipt => generation.parse_json().map(DocumentRecord::Receipt),
        }
        .map_err(|e| self.failed(Stage::Extraction, e))?;

        info!(
            %category,
            line_items = record.base().line_items.len(),
            "document data extracted"
        );
        Ok(record)
    }

    /// Extract with a category given by name.
    ///
    /// Unknown names fail with [`StageError::UnsupportedCategory`] before
    /// any request is made.
    pub async fn extract_named(&self, text: &str, category: &str) -> Result<DocumentRecord> {
        let category: DocumentCategory = category.parse().map_err(|e| {
            error!("Extraction rejected: {}", e);
            StageError::UnsupportedCategory(e)
        })?;
        self.extract(text, category).await
    }

    async fn call(
        &self,
        stage: Stage,
        request: GenerationRequest,
    ) -> Result<lvdoc_llm::Generation> {
        debug!(
            %stage,
            backend = self.backend.name(),
            prompt_len = request.prompt.len(),
            "calling model"
        );
        self.backend
            .generate(request)
            .await
            .map_err(|e| self.failed(stage, e))
    }

    fn failed(&self, stage: Stage, source: LlmError) -> StageError {
        error!("Error during {}: {}", stage, source);
        StageError::ExternalService { stage, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::schema::record_schema_name;
    use lvdoc_llm::{MockBackend, OutputFormat};
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use serde_json::json;
    use std::sync::Arc;

    fn record_json() -> serde_json::Value {
        json!({
            "documentNumber": "42",
            "date": "2024-05-02",
            "seller": {"name": "SIA Veikals", "registrationNumber": null, "vatNumber": "LV40003111111", "address": null},
            "buyer": {"name": "", "registrationNumber": null, "vatNumber": null, "address": null},
            "totalAmount": 12.4,
            "currency": "EUR",
            "lineItems": [
                {"description": "Maize", "quantity": 2, "unitPrice": 1.2, "totalPrice": 2.4, "vatRate": 21, "vatAmount": null},
                {"description": "Kafija", "quantity": 1, "unitPrice": 10, "totalPrice": 10, "vatRate": 21, "vatAmount": null}
            ],
            "subtotal": 10.25,
            "vatAmount": 2.15,
            "dueDate": null,
            "paymentDetails": null,
            "deliveryDate": "2024-05-03",
            "relatedInvoice": null,
            "paymentMethod": "karte",
            "cashierName": "Anna"
        })
    }

    #[tokio::test]
    async fn test_detect_uses_classification_schema() {
        let backend = Arc::new(MockBackend::new().with_json(json!({
            "category": "delivery_note",
            "confidence": 0.87,
            "rationale": "Title reads Preču pavadzīme"
        })));
        let analyzer = DocumentAnalyzer::new(backend.clone());

        let result = analyzer.detect("Preču pavadzīme Nr. 7").await.unwrap();

        assert_eq!(result.category, DocumentCategory::DeliveryNote);
        let requests = backend.requests();
        assert_eq!(requests[0].output.schema_name(), Some("document_classification"));
        assert!(requests[0].prompt.contains("Preču pavadzīme Nr. 7"));
    }

    #[tokio::test]
    async fn test_detect_clamps_confidence() {
        let backend = MockBackend::new().with_json(json!({
            "category": "receipt",
            "confidence": 87.0,
            "rationale": "Kases čeks"
        }));
        let result = DocumentAnalyzer::new(backend).detect("Kases čeks").await.unwrap();
        assert_eq!(result.confidence, 1.0);
    }

    #[tokio::test]
    async fn test_detect_rejects_nonconformant_output() {
        let backend = MockBackend::new().with_json(json!({"category": "contract", "confidence": 0.9, "rationale": ""}));
        let err = DocumentAnalyzer::new(backend).detect("Līgums").await.unwrap_err();
        assert!(matches!(err, StageError::ExternalService { stage: Stage::Detection, .. }));
    }

    #[tokio::test]
    async fn test_detect_transport_failure() {
        let backend = MockBackend::new().with_failure("connection refused");
        let err = DocumentAnalyzer::new(backend).detect("Rēķins").await.unwrap_err();
        assert!(err.is_external());
    }

    #[tokio::test]
    async fn test_summarize_is_free_text() {
        let backend = Arc::new(MockBackend::new().with_text("  SIA Veikals sold bread.  \n"));
        let analyzer = DocumentAnalyzer::new(backend.clone());

        let summary = analyzer
            .summarize("Kases čeks", DocumentCategory::Receipt)
            .await
            .unwrap();

        assert_eq!(summary, "SIA Veikals sold bread.");
        assert_eq!(backend.requests()[0].output, OutputFormat::Text);
    }

    #[tokio::test]
    async fn test_summarize_rejects_empty_output() {
        let backend = MockBackend::new().with_text("   ");
        let err = DocumentAnalyzer::new(backend)
            .summarize("Čeks", DocumentCategory::Receipt)
            .await
            .unwrap_err();
        assert!(matches!(err, StageError::ExternalService { stage: Stage::Summary, .. }));
    }

    #[tokio::test]
    async fn test_extract_requests_matching_variant() {
        for category in DocumentCategory::ALL {
            let backend = Arc::new(MockBackend::new().with_json(record_json()));
            let analyzer = DocumentAnalyzer::new(backend.clone());

            let record = analyzer.extract("text", category).await.unwrap();

            assert_eq!(record.category(), category);
            assert_eq!(
                backend.requests()[0].output.schema_name(),
                Some(record_schema_name(category))
            );
        }
    }

    #[tokio::test]
    async fn test_extract_receipt_fields() {
        let backend = MockBackend::new().with_json(record_json());
        let record = DocumentAnalyzer::new(backend)
            .extract("text", DocumentCategory::Receipt)
            .await
            .unwrap();

        let DocumentRecord::Receipt(receipt) = record else {
            panic!("expected receipt");
        };
        assert_eq!(receipt.cashier_name.as_deref(), Some("Anna"));
        assert_eq!(receipt.base.total_amount, Decimal::new(124, 1));
        assert_eq!(receipt.base.line_items[0].quantity, Some(Decimal::new(2, 0)));
    }

    #[tokio::test]
    async fn test_extract_missing_variant_field_fails() {
        let mut value = record_json();
        value.as_object_mut().unwrap().remove("subtotal");
        let backend = MockBackend::new().with_json(value);

        let err = DocumentAnalyzer::new(backend)
            .extract("text", DocumentCategory::Invoice)
            .await
            .unwrap_err();
        assert!(matches!(err, StageError::ExternalService { stage: Stage::Extraction, .. }));
    }

    #[tokio::test]
    async fn test_extract_unknown_category_makes_no_request() {
        let backend = Arc::new(MockBackend::new().with_json(record_json()));
        let analyzer = DocumentAnalyzer::new(backend.clone());

        let err = analyzer.extract_named("text", "purchase_order").await.unwrap_err();

        assert!(matches!(err, StageError::UnsupportedCategory(_)));
        assert_eq!(backend.call_count(), 0);
    }
    fn fully_populated(category: DocumentCategory) -> serde_json::Value {
        let mut value = json!({
            "documentNumber": "PV-0007",
            "date": "2024-06-01",
            "seller": {"name": "SIA Noliktava", "registrationNumber": "40003222222", "vatNumber": "LV40003222222", "address": "Rīga"},
            "buyer": {"name": "SIA Birojs", "registrationNumber": "40003333333", "vatNumber": "LV40003333333", "address": "Jelgava"},
            "totalAmount": 60.5,
            "currency": "EUR",
            "lineItems": [
                {"description": "Papīrs A4", "quantity": 10, "unitPrice": 5, "totalPrice": 50, "vatRate": 21, "vatAmount": 10.5}
            ]
        });
        let extra = match category {
            DocumentCategory::Invoice => json!({
                "subtotal": 50,
                "vatAmount": 10.5,
                "dueDate": "2024-06-15",
                "paymentDetails": {"bankAccount": "LV80BANK0000435195001", "bankName": "Banka", "reference": "PV-0007"}
            }),
            DocumentCategory::DeliveryNote => json!({
                "deliveryDate": "2024-06-02",
                "relatedInvoice": "R-0099"
            }),
            DocumentCategory::Receipt => json!({
                "paymentMethod": "karte",
                "cashierName": "Jānis"
            }),
        };
        for (key, field) in extra.as_object().unwrap() {
            value[key.as_str()] = field.clone();
        }
        value
    }

    #[tokio::test]
    async fn test_display_round_trip_keeps_schema_fields() {
        for category in DocumentCategory::ALL {
            let backend = MockBackend::new().with_json(fully_populated(category));
            let record = DocumentAnalyzer::new(backend)
                .extract("text", category)
                .await
                .unwrap();

            let display = serde_json::to_string_pretty(&record).unwrap();
            let shown: serde_json::Value = serde_json::from_str(&display).unwrap();
            let schema = record_schema(category).schema;
            for key in schema["properties"].as_object().unwrap().keys() {
                assert!(
                    shown.get(key).is_some(),
                    "{key} missing from the {category} display form"
                );
            }

            let back: DocumentRecord = serde_json::from_str(&display).unwrap();
            assert_eq!(back, record);
        }
    }
}
