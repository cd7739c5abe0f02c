//! Prompt templates for the three pipeline stages.

use crate::models::config::PromptConfig;
use crate::models::document::DocumentCategory;

/// System instruction shared by all stages.
pub const SYSTEM_PROMPT: &str = "You are an expert in Latvian business documents. \
The documents were scanned and converted to text with OCR, so expect broken \
table layouts, merged columns and occasional misread characters.";

const CLASSIFICATION_GUIDE: &str = "\
Decide which type of document the text is. Keyword hints:
- invoice: \"Rēķins\", \"PVN rēķins\", \"Rēķina Nr.\", \"Apmaksas termiņš\", \"Summa apmaksai\", bank details
- delivery_note: \"Pavadzīme\", \"Preču pavadzīme\", \"Pavadzīmes Nr.\", \"Piegādes datums\", \"Izsniedza\", \"Pieņēma\"
- receipt: \"Čeks\", \"Kases čeks\", \"Kvīts\", \"Kasieris\", \"Samaksāts\", \"Karte\", \"Skaidra nauda\"
If several hints match, prefer the type named in the document title.";

const EXTRACTION_GUIDE: &str = "\
Extraction guidelines:
1. Tables: OCR may split one table row across several lines or merge columns. \
Reconstruct every row as one line item with its description, quantity, unit price and total.
2. Check each line item: quantity multiplied by unit price should equal the line total. \
If it does not, re-read the row before answering.
3. Dates: convert every date to YYYY-MM-DD (for example 15.03.2024 becomes 2024-03-15).
4. Numbers: output plain numbers without currency symbols or thousands separators, \
using a dot as decimal separator (\"1 234,50 €\" becomes 1234.50).
5. Parties: the seller is marked \"Pārdevējs\", \"Piegādātājs\", \"Preču nosūtītājs\" or \"Izsniedza\"; \
the buyer is marked \"Pircējs\", \"Saņēmējs\", \"Maksātājs\" or \"Pieņēma\".
6. VAT: \"PVN\" is VAT, \"PVN reģistrācijas numurs\" / \"PVN reģ. Nr.\" is the VAT number (LV + 11 digits), \
\"Reģ. Nr.\" is the registration number, \"Summa bez PVN\" is the amount before VAT, \
\"Kopā\" / \"Summa apmaksai\" is the total.
7. Use null for fields that do not appear in the document. Never invent values.";

/// Prompt for the type detector.
pub fn classification_prompt(text: &str) -> String {
    format!(
        "{CLASSIFICATION_GUIDE}\n\n\
         Give a confidence between 0 and 1 and a one-sentence rationale.\n\n\
         Document text:\n\"\"\"\n{text}\n\"\"\""
    )
}

/// Prompt for the summarizer.
pub fn summary_prompt(text: &str, category: DocumentCategory, config: &PromptConfig) -> String {
    let focus = match category {
        DocumentCategory::Invoice => {
            "who issued the invoice and to whom, the invoice number and date, \
             the total amount with VAT and the payment due date"
        }
        DocumentCategory::DeliveryNote => {
            "who delivered the goods and to whom, which goods and quantities were delivered, \
             and the document and delivery dates"
        }
        DocumentCategory::Receipt => {
            "the merchant, the purchased items, the total paid and the payment method"
        }
    };

    format!(
        "The following text is a Latvian {label} ({latvian}). \
         Summarize it in {min} to {max} sentences in English. Focus on {focus}.\n\n\
         Document text:\n\"\"\"\n{text}\n\"\"\"",
        label = category.label(),
        latvian = category.latvian_name(),
        min = config.summary_min_sentences,
        max = config.summary_max_sentences,
    )
}

/// Prompt for the extractor.
pub fn extraction_prompt(text: &str, category: DocumentCategory) -> String {
    let specific = match category {
        DocumentCategory::Invoice => {
            "Also extract the amount before VAT (subtotal), the total VAT amount, \
             the payment due date (\"Apmaksas termiņš\") and the bank payment details \
             (IBAN, bank name, payment reference)."
        }
        DocumentCategory::DeliveryNote => {
            "Also extract the delivery date (\"Piegādes datums\") and, if printed, \
             the number of the related invoice."
        }
        DocumentCategory::Receipt => {
            "Also extract the payment method (\"Karte\" is card, \"Skaidra nauda\" is cash) \
             and the cashier name (\"Kasieris\"). The merchant is the seller; \
             the buyer name may be empty."
        }
    };

    format!(
        "Extract the data of this Latvian {label} ({latvian}).\n\n\
         {EXTRACTION_GUIDE}\n\n{specific}\n\n\
         Document text:\n\"\"\"\n{text}\n\"\"\"",
        label = category.label(),
        latvian = category.latvian_name(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_embed_text() {
        let text = "Rēķins Nr. 123";
        assert!(classification_prompt(text).contains(text));
        assert!(summary_prompt(text, DocumentCategory::Invoice, &PromptConfig::default()).contains(text));
        assert!(extraction_prompt(text, DocumentCategory::Receipt).contains(text));
    }

    #[test]
    fn test_summary_prompt_tailored() {
        let config = PromptConfig::default();
        let invoice = summary_prompt("x", DocumentCategory::Invoice, &config);
        let note = summary_prompt("x", DocumentCategory::DeliveryNote, &config);

        assert!(invoice.contains("3 to 5 sentences"));
        assert!(invoice.contains("payment due date"));
        assert!(note.contains("pavadzīme"));
        assert!(note.contains("quantities"));
    }

    #[test]
    fn test_extraction_prompt_shares_guidelines() {
        for category in DocumentCategory::ALL {
            let prompt = extraction_prompt("x", category);
            assert!(prompt.contains("YYYY-MM-DD"));
            assert!(prompt.contains("Pārdevējs"));
        }
    }
}
