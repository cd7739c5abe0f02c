//! Document data models for Latvian business documents.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::serde::{float, float_option};
use serde::{Deserialize, Serialize};

use crate::error::UnsupportedCategory;

/// Supported document types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentCategory {
    /// Invoice (rēķins, PVN rēķins).
    Invoice,
    /// Delivery note (pavadzīme, preču pavadzīme).
    DeliveryNote,
    /// Receipt (čeks, kases čeks).
    Receipt,
}

impl DocumentCategory {
    /// All categories, in prompt order.
    pub const ALL: [DocumentCategory; 3] = [
        DocumentCategory::Invoice,
        DocumentCategory::DeliveryNote,
        DocumentCategory::Receipt,
    ];

    /// Wire name, as used in schemas and serialized records.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentCategory::Invoice => "invoice",
            DocumentCategory::DeliveryNote => "delivery_note",
            DocumentCategory::Receipt => "receipt",
        }
    }

    /// English display name.
    pub fn label(&self) -> &'static str {
        match self {
            DocumentCategory::Invoice => "invoice",
            DocumentCategory::DeliveryNote => "delivery note",
            DocumentCategory::Receipt => "receipt",
        }
    }

    /// Latvian document name.
    pub fn latvian_name(&self) -> &'static str {
        match self {
            DocumentCategory::Invoice => "rēķins",
            DocumentCategory::DeliveryNote => "pavadzīme",
            DocumentCategory::Receipt => "čeks",
        }
    }
}

impl fmt::Display for DocumentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DocumentCategory {
    type Err = UnsupportedCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");

        match normalized.as_str() {
            "invoice" | "rekins" | "rēķins" => Ok(DocumentCategory::Invoice),
            "delivery_note" | "deliverynote" | "pavadzime" | "pavadzīme" => {
                Ok(DocumentCategory::DeliveryNote)
            }
            "receipt" | "ceks" | "čeks" => Ok(DocumentCategory::Receipt),
            _ => Err(UnsupportedCategory(s.to_string())),
        }
    }
}

/// Output of the type detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Detected document type.
    pub category: DocumentCategory,

    /// Model confidence (0.0 - 1.0).
    pub confidence: f32,

    /// Short explanation of the decision.
    pub rationale: String,
}

/// A party (seller or buyer) on the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    /// Full legal name.
    pub name: String,

    /// Company registration number (reģistrācijas numurs).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_number: Option<String>,

    /// VAT payer number (PVN reģistrācijas numurs), e.g. LV40003000000.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat_number: Option<String>,

    /// Address as printed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// A single line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Product/service description.
    pub description: String,

    #[serde(default, with = "float_option", skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Decimal>,

    #[serde(default, with = "float_option", skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Decimal>,

    /// Line total.
    #[serde(with = "float")]
    pub total_price: Decimal,

    /// VAT rate in percent (21 for 21%).
    #[serde(default, with = "float_option", skip_serializing_if = "Option::is_none")]
    pub vat_rate: Option<Decimal>,

    #[serde(default, with = "float_option", skip_serializing_if = "Option::is_none")]
    pub vat_amount: Option<Decimal>,
}

impl LineItem {
    /// quantity × unit price, when both are known.
    pub fn computed_total(&self) -> Option<Decimal> {
        match (self.quantity, self.unit_price) {
            (Some(quantity), Some(unit_price)) => Some(quantity * unit_price),
            _ => None,
        }
    }
}

/// Fields shared by every document type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordBase {
    pub document_number: String,

    /// Document date, YYYY-MM-DD.
    pub date: String,

    pub seller: Party,

    pub buyer: Party,

    #[serde(with = "float")]
    pub total_amount: Decimal,

    /// ISO 4217 code, e.g. EUR.
    pub currency: String,

    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

/// Bank payment details printed on an invoice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_account: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,

    /// Payment reference (maksājuma mērķis).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// Invoice-specific record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRecord {
    #[serde(flatten)]
    pub base: RecordBase,

    /// Total without VAT (summa bez PVN).
    #[serde(with = "float")]
    pub subtotal: Decimal,

    /// Document-level VAT amount.
    #[serde(with = "float")]
    pub vat_amount: Decimal,

    /// Payment due date (apmaksas termiņš), YYYY-MM-DD.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_details: Option<PaymentDetails>,
}

/// Delivery-note-specific record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryNoteRecord {
    #[serde(flatten)]
    pub base: RecordBase,

    /// Delivery date (piegādes datums), YYYY-MM-DD.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<String>,

    /// Free-text reference to the related invoice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_invoice: Option<String>,
}

/// Receipt-specific record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptRecord {
    #[serde(flatten)]
    pub base: RecordBase,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cashier_name: Option<String>,
}

/// Structured record extracted from a document, keyed by its category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "documentType", rename_all = "snake_case")]
pub enum DocumentRecord {
    Invoice(InvoiceRecord),
    DeliveryNote(DeliveryNoteRecord),
    Receipt(ReceiptRecord),
}

impl DocumentRecord {
    /// Category this record belongs to.
    pub fn category(&self) -> DocumentCategory {
        match self {
            DocumentRecord::Invoice(_) => DocumentCategory::Invoice,
            DocumentRecord::DeliveryNote(_) => DocumentCategory::DeliveryNote,
            DocumentRecord::Receipt(_) => DocumentCategory::Receipt,
        }
    }

    /// Shared fields.
    pub fn base(&self) -> &RecordBase {
        match self {
            DocumentRecord::Invoice(r) => &r.base,
            DocumentRecord::DeliveryNote(r) => &r.base,
            DocumentRecord::Receipt(r) => &r.base,
        }
    }

    /// Check the record for inconsistencies and return any issues found.
    ///
    /// Issues are advisory: the record is kept as extracted.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        let base = self.base();
        let tolerance = Decimal::new(1, 2);

        if base.document_number.trim().is_empty() {
            issues.push("Missing document number".to_string());
        }

        if base.seller.name.trim().is_empty() {
            issues.push("Missing seller name".to_string());
        }

        check_date("date", &base.date, &mut issues);

        for (idx, item) in base.line_items.iter().enumerate() {
            if let Some(computed) = item.computed_total() {
                if (computed - item.total_price).abs() > tolerance {
                    issues.push(format!(
                        "Line item {} quantity x unit price ({}) differs from total ({})",
                        idx + 1,
                        computed.normalize(),
                        item.total_price.normalize()
                    ));
                }
            }
        }

        match self {
            DocumentRecord::Invoice(invoice) => {
                if let Some(due) = &invoice.due_date {
                    check_date("dueDate", due, &mut issues);
                }
                let gross = invoice.subtotal + invoice.vat_amount;
                if (gross - base.total_amount).abs() > tolerance {
                    issues.push(format!(
                        "Subtotal plus VAT ({}) differs from total ({})",
                        gross.normalize(),
                        base.total_amount.normalize()
                    ));
                }
            }
            DocumentRecord::DeliveryNote(note) => {
                if let Some(delivery) = &note.delivery_date {
                    check_date("deliveryDate", delivery, &mut issues);
                }
            }
            DocumentRecord::Receipt(_) => {}
        }

        issues
    }
}

fn check_date(field: &str, value: &str, issues: &mut Vec<String>) {
    if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
        issues.push(format!("{} is not a YYYY-MM-DD date: {:?}", field, value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample_base() -> RecordBase {
        RecordBase {
            document_number: "123".to_string(),
            date: "2024-03-15".to_string(),
            seller: Party {
                name: "SIA Piemērs".to_string(),
                registration_number: Some("40003000000".to_string()),
                vat_number: Some("LV40003000000".to_string()),
                address: Some("Brīvības iela 1, Rīga".to_string()),
            },
            buyer: Party {
                name: "SIA Pircējs".to_string(),
                ..Default::default()
            },
            total_amount: Decimal::new(12100, 2),
            currency: "EUR".to_string(),
            line_items: vec![LineItem {
                description: "Konsultācijas".to_string(),
                quantity: Some(Decimal::new(2, 0)),
                unit_price: Some(Decimal::new(5000, 2)),
                total_price: Decimal::new(10000, 2),
                vat_rate: Some(Decimal::new(21, 0)),
                vat_amount: Some(Decimal::new(2100, 2)),
            }],
        }
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("invoice".parse::<DocumentCategory>(), Ok(DocumentCategory::Invoice));
        assert_eq!("Delivery Note".parse::<DocumentCategory>(), Ok(DocumentCategory::DeliveryNote));
        assert_eq!("delivery-note".parse::<DocumentCategory>(), Ok(DocumentCategory::DeliveryNote));
        assert_eq!(" RECEIPT ".parse::<DocumentCategory>(), Ok(DocumentCategory::Receipt));
        assert_eq!(
            "purchase_order".parse::<DocumentCategory>(),
            Err(UnsupportedCategory("purchase_order".to_string()))
        );
    }

    #[test]
    fn test_category_wire_names() {
        for category in DocumentCategory::ALL {
            let value = serde_json::to_value(category).unwrap();
            assert_eq!(value, json!(category.as_str()));
            assert_eq!(category.as_str().parse::<DocumentCategory>(), Ok(category));
        }
    }

    #[test]
    fn test_record_tagged_serialization() {
        let record = DocumentRecord::Receipt(ReceiptRecord {
            base: sample_base(),
            payment_method: Some("karte".to_string()),
            cashier_name: None,
        });

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["documentType"], "receipt");
        assert_eq!(value["documentNumber"], "123");
        assert_eq!(value["totalAmount"], json!(121.0));
        assert_eq!(value["lineItems"][0]["unitPrice"], json!(50.0));
        assert_eq!(value["lineItems"][0]["vatRate"], json!(21.0));
        assert_eq!(value["paymentMethod"], "karte");
        assert!(value.get("cashierName").is_none());

        let back: DocumentRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_validate_clean_invoice() {
        let record = DocumentRecord::Invoice(InvoiceRecord {
            base: sample_base(),
            subtotal: Decimal::new(10000, 2),
            vat_amount: Decimal::new(2100, 2),
            due_date: Some("2024-03-29".to_string()),
            payment_details: None,
        });
        assert!(record.validate().is_empty());
    }

    #[test]
    fn test_validate_reports_issues() {
        let mut base = sample_base();
        base.date = "15.03.2024".to_string();
        base.line_items[0].total_price = Decimal::new(9000, 2);

        let record = DocumentRecord::Invoice(InvoiceRecord {
            base,
            subtotal: Decimal::new(10000, 2),
            vat_amount: Decimal::new(2000, 2),
            due_date: None,
            payment_details: None,
        });

        let issues = record.validate();
        assert_eq!(issues.len(), 3);
        assert!(issues[0].starts_with("date is not a YYYY-MM-DD date"));
        assert!(issues[1].contains("Line item 1"));
        assert!(issues[2].starts_with("Subtotal plus VAT"));
    }
}
