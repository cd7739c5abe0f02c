//! Analysis commands - detect, summarize, extract and process one document.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use tracing::{debug, info};

use lvdoc_core::pipeline::validate_input;
use lvdoc_core::{
    AnalysisSession, ClassificationResult, DocumentCategory, DocumentRecord, LvdocConfig,
};

use super::{AppCoordinator, build_coordinator, load_config, read_input};

/// Input and output options shared by every analysis command.
#[derive(Args)]
pub struct CommonArgs {
    /// Text file with the document contents ("-" reads stdin)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

/// Arguments for the detect command.
#[derive(Args)]
pub struct DetectArgs {
    #[command(flatten)]
    common: CommonArgs,
}

/// Arguments for the summarize command.
#[derive(Args)]
pub struct SummarizeArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Skip detection and summarize as this document type
    #[arg(long)]
    category: Option<String>,
}

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Skip detection and extract as this document type
    #[arg(long)]
    category: Option<String>,

    /// Report inconsistencies in the extracted data
    #[arg(long)]
    validate: bool,
}

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Report inconsistencies in the extracted data
    #[arg(long)]
    validate: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text
    Text,
    /// CSV row of the extracted record
    Csv,
}

/// Everything one command produced.
enum Report<'a> {
    Classification(&'a ClassificationResult),
    Summary {
        category: DocumentCategory,
        summary: &'a str,
    },
    Record(&'a DocumentRecord),
    Session(&'a AnalysisSession),
}

pub async fn detect(args: DetectArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let (config, text) = prepare(&args.common, config_path)?;
    let mut coordinator = build_coordinator(&config)?;

    let pb = spinner("Detecting document type...");
    let result = coordinator.detect(&text).await;
    pb.finish_and_clear();

    let classification = result?;
    info!(
        "Detected {} ({:.0}%)",
        classification.category,
        classification.confidence * 100.0
    );

    emit(&args.common, Report::Classification(&classification))
}

pub async fn summarize(args: SummarizeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let (config, text) = prepare(&args.common, config_path)?;
    let mut coordinator = build_coordinator(&config)?;

    let (category, summary) = match args.category.as_deref() {
        Some(name) => {
            let text = validate_input(&text)?;
            let category: DocumentCategory = name.parse()?;
            let pb = spinner("Summarizing document...");
            let result = coordinator.analyzer().summarize(text, category).await;
            pb.finish_and_clear();
            (category, result?)
        }
        None => {
            let category = detect_first(&mut coordinator, &text).await?;
            let pb = spinner("Summarizing document...");
            let result = coordinator.summarize().await;
            pb.finish_and_clear();
            (category, result?)
        }
    };

    emit(
        &args.common,
        Report::Summary {
            category,
            summary: &summary,
        },
    )
}

pub async fn extract(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let (config, text) = prepare(&args.common, config_path)?;
    let mut coordinator = build_coordinator(&config)?;

    let record = match args.category.as_deref() {
        Some(name) => {
            let text = validate_input(&text)?;
            let pb = spinner("Extracting document data...");
            let result = coordinator.analyzer().extract_named(text, name).await;
            pb.finish_and_clear();
            result?
        }
        None => {
            detect_first(&mut coordinator, &text).await?;
            let pb = spinner("Extracting document data...");
            let result = coordinator.extract().await;
            pb.finish_and_clear();
            result?
        }
    };

    if args.validate {
        report_issues(&record);
    }

    emit(&args.common, Report::Record(&record))
}

pub async fn process(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let (config, text) = prepare(&args.common, config_path)?;
    let mut coordinator = build_coordinator(&config)?;

    let pb = spinner("Processing document...");
    let result = coordinator.process_all(&text).await;
    pb.finish_and_clear();
    result?;

    let session = coordinator
        .session()
        .ok_or_else(|| anyhow::anyhow!("No analysis session after processing"))?;

    if args.validate {
        if let Some(record) = &session.record {
            report_issues(record);
        }
    }

    debug!("Total processing time: {:?}", start.elapsed());
    emit(&args.common, Report::Session(session))
}

fn prepare(common: &CommonArgs, config_path: Option<&str>) -> anyhow::Result<(LvdocConfig, String)> {
    let config = load_config(config_path)?;
    let text = read_input(&common.input)?;
    debug!("Read {} characters from {}", text.chars().count(), common.input.display());
    Ok((config, text))
}

async fn detect_first(
    coordinator: &mut AppCoordinator,
    text: &str,
) -> anyhow::Result<DocumentCategory> {
    let pb = spinner("Detecting document type...");
    let result = coordinator.detect(text).await;
    pb.finish_and_clear();

    let classification = result?;
    info!("Detected {}", classification.category);
    Ok(classification.category)
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn report_issues(record: &DocumentRecord) {
    let issues = record.validate();
    if issues.is_empty() {
        eprintln!("{} No validation issues", style("✓").green());
        return;
    }

    eprintln!("{}", style("Validation issues:").yellow());
    for issue in &issues {
        eprintln!("  - {}", issue);
    }
}

fn emit(common: &CommonArgs, report: Report<'_>) -> anyhow::Result<()> {
    let output = render(&report, common.format)?;

    if let Some(output_path) = &common.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output.trim_end());
    }

    Ok(())
}

fn render(report: &Report<'_>, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => {
            let value = match report {
                Report::Classification(classification) => serde_json::to_value(classification)?,
                Report::Summary { category, summary } => {
                    json!({ "category": category, "summary": summary })
                }
                Report::Record(record) => serde_json::to_value(record)?,
                Report::Session(session) => serde_json::to_value(session)?,
            };
            Ok(serde_json::to_string_pretty(&value)?)
        }
        OutputFormat::Text => Ok(match report {
            Report::Classification(classification) => format_classification(classification),
            Report::Summary { category, summary } => {
                format!("Summary ({}):\n{}\n", category, summary)
            }
            Report::Record(record) => format_record(record),
            Report::Session(session) => format_session(session),
        }),
        OutputFormat::Csv => match report {
            Report::Record(record) => format_csv(record),
            Report::Session(AnalysisSession {
                record: Some(record),
                ..
            }) => format_csv(record),
            _ => anyhow::bail!("CSV output is only available for extracted records"),
        },
    }
}

fn format_classification(classification: &ClassificationResult) -> String {
    format!(
        "Document type: {} ({})\nConfidence: {:.1}%\nReason: {}\n",
        classification.category,
        classification.category.latvian_name(),
        classification.confidence * 100.0,
        classification.rationale
    )
}

fn format_session(session: &AnalysisSession) -> String {
    let mut output = String::new();

    if let Some(classification) = &session.classification {
        output.push_str(&format_classification(classification));
        output.push('\n');
    }

    if let Some(summary) = &session.summary {
        output.push_str("Summary:\n");
        output.push_str(summary);
        output.push_str("\n\n");
    }

    if let Some(record) = &session.record {
        output.push_str(&format_record(record));
    }

    output
}

fn format_record(record: &DocumentRecord) -> String {
    let base = record.base();
    let currency = &base.currency;
    let mut output = String::new();

    output.push_str(&format!(
        "{} {}\n",
        capitalize(record.category().label()),
        base.document_number
    ));
    output.push_str(&format!("Date: {}\n", base.date));
    output.push('\n');

    for (label, party) in [("Seller", &base.seller), ("Buyer", &base.buyer)] {
        output.push_str(&format!("{}:\n", label));
        output.push_str(&format!("  {}\n", party.name));
        if let Some(reg) = &party.registration_number {
            output.push_str(&format!("  Reg. No.: {}\n", reg));
        }
        if let Some(vat) = &party.vat_number {
            output.push_str(&format!("  VAT No.: {}\n", vat));
        }
        if let Some(address) = &party.address {
            output.push_str(&format!("  {}\n", address));
        }
        output.push('\n');
    }

    if !base.line_items.is_empty() {
        output.push_str("Items:\n");
        for item in &base.line_items {
            let quantity = item
                .quantity
                .map(|q| format!("{} x ", q.normalize()))
                .unwrap_or_default();
            output.push_str(&format!(
                "  {}{}  {} {}\n",
                quantity, item.description, item.total_price, currency
            ));
        }
        output.push('\n');
    }

    match record {
        DocumentRecord::Invoice(invoice) => {
            output.push_str(&format!("  Net:   {} {}\n", invoice.subtotal, currency));
            output.push_str(&format!("  VAT:   {} {}\n", invoice.vat_amount, currency));
            output.push_str(&format!("  Total: {} {}\n", base.total_amount, currency));
            if let Some(due_date) = &invoice.due_date {
                output.push_str(&format!("\nPayment due: {}\n", due_date));
            }
            if let Some(account) = invoice
                .payment_details
                .as_ref()
                .and_then(|p| p.bank_account.as_ref())
            {
                output.push_str(&format!("Bank account: {}\n", account));
            }
        }
        DocumentRecord::DeliveryNote(note) => {
            output.push_str(&format!("  Total: {} {}\n", base.total_amount, currency));
            if let Some(delivery_date) = &note.delivery_date {
                output.push_str(&format!("\nDelivered: {}\n", delivery_date));
            }
            if let Some(invoice) = &note.related_invoice {
                output.push_str(&format!("Related invoice: {}\n", invoice));
            }
        }
        DocumentRecord::Receipt(receipt) => {
            output.push_str(&format!("  Total: {} {}\n", base.total_amount, currency));
            if let Some(method) = &receipt.payment_method {
                output.push_str(&format!("\nPaid by: {}\n", method));
            }
            if let Some(cashier) = &receipt.cashier_name {
                output.push_str(&format!("Cashier: {}\n", cashier));
            }
        }
    }

    output
}

fn format_csv(record: &DocumentRecord) -> anyhow::Result<String> {
    let base = record.base();
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "document_type",
        "document_number",
        "date",
        "seller_name",
        "seller_vat_number",
        "buyer_name",
        "buyer_vat_number",
        "total_amount",
        "currency",
        "line_items",
    ])?;

    wtr.write_record([
        record.category().as_str(),
        &base.document_number,
        &base.date,
        &base.seller.name,
        base.seller.vat_number.as_deref().unwrap_or_default(),
        &base.buyer.name,
        base.buyer.vat_number.as_deref().unwrap_or_default(),
        &base.total_amount.to_string(),
        &base.currency,
        &base.line_items.len().to_string(),
    ])?;

    Ok(String::from_utf8(wtr.into_inner()?)?)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lvdoc_core::{LineItem, Party, ReceiptRecord, RecordBase};
    use rust_decimal::Decimal;

    fn receipt() -> DocumentRecord {
        DocumentRecord::Receipt(ReceiptRecord {
            base: RecordBase {
                document_number: "0042".to_string(),
                date: "2024-05-02".to_string(),
                seller: Party {
                    name: "SIA Veikals, Rīga".to_string(),
                    vat_number: Some("LV40003000001".to_string()),
                    ..Default::default()
                },
                buyer: Party::default(),
                total_amount: Decimal::new(345, 2),
                currency: "EUR".to_string(),
                line_items: vec![LineItem {
                    description: "Maize".to_string(),
                    quantity: Some(Decimal::new(1, 0)),
                    unit_price: Some(Decimal::new(345, 2)),
                    total_price: Decimal::new(345, 2),
                    vat_rate: None,
                    vat_amount: None,
                }],
            },
            payment_method: Some("karte".to_string()),
            cashier_name: None,
        })
    }

    #[test]
    fn test_csv_quotes_fields() {
        let csv = format_csv(&receipt()).unwrap();
        let mut lines = csv.lines();
        assert!(lines.next().unwrap().starts_with("document_type,document_number"));
        assert_eq!(
            lines.next().unwrap(),
            "receipt,0042,2024-05-02,\"SIA Veikals, Rīga\",LV40003000001,,,3.45,EUR,1"
        );
    }

    #[test]
    fn test_text_record() {
        let text = format_record(&receipt());
        assert!(text.starts_with("Receipt 0042\n"));
        assert!(text.contains("  1 x Maize  3.45 EUR\n"));
        assert!(text.contains("Paid by: karte"));
    }

    #[test]
    fn test_csv_requires_record() {
        let classification = ClassificationResult {
            category: DocumentCategory::Invoice,
            confidence: 0.9,
            rationale: "Rēķins".to_string(),
        };
        assert!(render(&Report::Classification(&classification), OutputFormat::Csv).is_err());
    }
}
