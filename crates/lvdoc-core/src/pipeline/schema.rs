//! JSON schemas sent with structured-output requests.
//!
//! Schemas follow the strict structured-output dialect: every property is
//! listed in `required`, optional fields are nullable, and no additional
//! properties are allowed.

use serde_json::{Map, Value, json};

use lvdoc_llm::JsonSchema;

use crate::models::document::DocumentCategory;

/// Schema name of the classification output.
pub const CLASSIFICATION_SCHEMA: &str = "document_classification";

/// Schema of a [`ClassificationResult`](crate::models::document::ClassificationResult).
pub fn classification_schema() -> JsonSchema {
    let categories: Vec<&str> = DocumentCategory::ALL.iter().map(|c| c.as_str()).collect();

    JsonSchema::strict(
        CLASSIFICATION_SCHEMA,
        object(props([
            (
                "category",
                json!({
                    "type": "string",
                    "enum": categories,
                    "description": "Detected document type"
                }),
            ),
            (
                "confidence",
                json!({
                    "type": "number",
                    "description": "Confidence between 0 and 1"
                }),
            ),
            (
                "rationale",
                json!({
                    "type": "string",
                    "description": "Short explanation of the decision"
                }),
            ),
        ])),
    )
}

/// Schema name of the record for `category`.
pub fn record_schema_name(category: DocumentCategory) -> &'static str {
    match category {
        DocumentCategory::Invoice => "invoice_record",
        DocumentCategory::DeliveryNote => "delivery_note_record",
        DocumentCategory::Receipt => "receipt_record",
    }
}

/// Schema of the record variant for `category`.
pub fn record_schema(category: DocumentCategory) -> JsonSchema {
    let mut properties = base_properties();

    match category {
        DocumentCategory::Invoice => {
            properties.insert("subtotal".into(), number("Total without VAT (summa bez PVN)"));
            properties.insert("vatAmount".into(), number("Total VAT amount (PVN summa)"));
            properties.insert("dueDate".into(), nullable_string("Payment due date, YYYY-MM-DD"));
            properties.insert(
                "paymentDetails".into(),
                nullable(object(props([
                    ("bankAccount", nullable_string("Bank account (IBAN)")),
                    ("bankName", nullable_string("Bank name")),
                    ("reference", nullable_string("Payment reference")),
                ]))),
            );
        }
        DocumentCategory::DeliveryNote => {
            properties.insert(
                "deliveryDate".into(),
                nullable_string("Delivery date, YYYY-MM-DD"),
            );
            properties.insert(
                "relatedInvoice".into(),
                nullable_string("Number of the related invoice"),
            );
        }
        DocumentCategory::Receipt => {
            properties.insert(
                "paymentMethod".into(),
                nullable_string("Payment method, e.g. cash or card"),
            );
            properties.insert("cashierName".into(), nullable_string("Cashier name"));
        }
    }

    JsonSchema::strict(record_schema_name(category), object(properties))
}

fn base_properties() -> Map<String, Value> {
    props([
        ("documentNumber", string("Document number")),
        ("date", string("Document date, YYYY-MM-DD")),
        ("seller", party("Seller / supplier (pārdevējs, piegādātājs)")),
        ("buyer", party("Buyer / receiver (pircējs, saņēmējs)")),
        ("totalAmount", number("Total amount payable")),
        ("currency", string("ISO 4217 currency code, e.g. EUR")),
        (
            "lineItems",
            json!({
                "type": "array",
                "items": line_item(),
            }),
        ),
    ])
}

fn party(description: &str) -> Value {
    let mut schema = object(props([
        ("name", string("Full legal name")),
        ("registrationNumber", nullable_string("Registration number")),
        ("vatNumber", nullable_string("VAT payer number, e.g. LV40003000000")),
        ("address", nullable_string("Address")),
    ]));
    schema["description"] = json!(description);
    schema
}

fn line_item() -> Value {
    object(props([
        ("description", string("Item description")),
        ("quantity", nullable_number("Quantity")),
        ("unitPrice", nullable_number("Price per unit")),
        ("totalPrice", number("Line total")),
        ("vatRate", nullable_number("VAT rate in percent, e.g. 21")),
        ("vatAmount", nullable_number("VAT amount of the line")),
    ]))
}

fn props<const N: usize>(entries: [(&str, Value); N]) -> Map<String, Value> {
    entries
        .into_iter()
        .map(|(name, schema)| (name.to_string(), schema))
        .collect()
}

fn object(properties: Map<String, Value>) -> Value {
    let required: Vec<String> = properties.keys().cloned().collect();
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}

fn string(description: &str) -> Value {
    json!({"type": "string", "description": description})
}

fn number(description: &str) -> Value {
    json!({"type": "number", "description": description})
}

fn nullable_string(description: &str) -> Value {
    json!({"type": ["string", "null"], "description": description})
}

fn nullable_number(description: &str) -> Value {
    json!({"type": ["number", "null"], "description": description})
}

fn nullable(schema: Value) -> Value {
    json!({"anyOf": [schema, {"type": "null"}]})
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn property_names(schema: &Value) -> Vec<String> {
        schema["properties"]
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect()
    }

    #[test]
    fn test_classification_schema() {
        let schema = classification_schema();
        assert_eq!(schema.name, CLASSIFICATION_SCHEMA);
        assert!(schema.strict);
        assert_eq!(
            schema.schema["properties"]["category"]["enum"],
            json!(["invoice", "delivery_note", "receipt"])
        );
    }

    #[test]
    fn test_every_property_required() {
        for category in DocumentCategory::ALL {
            let schema = record_schema(category).schema;
            let required: Vec<String> = schema["required"]
                .as_array()
                .unwrap()
                .iter()
                .map(|v| v.as_str().unwrap().to_string())
                .collect();
            assert_eq!(required, property_names(&schema));
            assert_eq!(schema["additionalProperties"], json!(false));
        }
    }

    #[test]
    fn test_variant_specific_properties() {
        let invoice = record_schema(DocumentCategory::Invoice).schema;
        let note = record_schema(DocumentCategory::DeliveryNote).schema;
        let receipt = record_schema(DocumentCategory::Receipt).schema;

        assert!(invoice["properties"].get("paymentDetails").is_some());
        assert!(invoice["properties"].get("deliveryDate").is_none());
        assert!(note["properties"].get("relatedInvoice").is_some());
        assert!(note["properties"].get("subtotal").is_none());
        assert!(receipt["properties"].get("cashierName").is_some());
        assert!(receipt["properties"].get("dueDate").is_none());
    }

    #[test]
    fn test_schema_names_distinct() {
        let names: Vec<&str> = DocumentCategory::ALL
            .iter()
            .map(|c| record_schema_name(*c))
            .collect();
        assert_eq!(names, vec!["invoice_record", "delivery_note_record", "receipt_record"]);
    }
}
