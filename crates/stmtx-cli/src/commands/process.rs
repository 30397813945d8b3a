//! Process command - extract fields from a single statement.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use stmtx_core::statement::rules::{format_display_amount, parse_amount};
use stmtx_core::{ExtractedRecord, Field, RecordSink, StatementExtractor};

use super::load_config;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF, image or plain text)
    #[arg(required = true)]
    input: PathBuf,

    /// File the record is appended to (default from config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Print the record without appending it to the output file
    #[arg(long)]
    no_save: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Extracting {}...", args.input.display()));

    let extractor = StatementExtractor::from_config(&config)?;
    let extraction = extractor.extract_path(&args.input);
    pb.finish_and_clear();
    let extraction = extraction?;

    debug!(
        "{:?} document, {} page(s), {} via OCR",
        extraction.acquired.pdf_type,
        extraction.acquired.pages.len(),
        extraction.acquired.ocr_page_count()
    );

    let record = extraction.record;

    if !args.no_save {
        let output = args
            .output
            .clone()
            .unwrap_or_else(|| config.extraction.default_output.clone());
        let sink = RecordSink::new(output);
        sink.append(&record)?;
        eprintln!(
            "{} Record appended to {}",
            style("✓").green(),
            sink.path().display()
        );
    }

    println!("{}", format_record(&record, args.format)?);

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

pub fn format_record(record: &ExtractedRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Csv => format_csv(std::slice::from_ref(record)),
        OutputFormat::Text => Ok(format_text(record)),
    }
}

/// Records as CSV with one header row, columns in record key order.
pub fn format_csv(records: &[ExtractedRecord]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header: Vec<&str> = Field::ALL.iter().map(|f| f.as_str()).collect();
    header.extend(["_file", "_sample_text_snippet"]);
    wtr.write_record(&header)?;

    for record in records {
        let mut row: Vec<&str> = Field::ALL
            .iter()
            .map(|f| record.get(*f).unwrap_or(""))
            .collect();
        row.push(&record.file);
        row.push(&record.sample_text_snippet);
        wtr.write_record(&row)?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(record: &ExtractedRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!("Statement: {}\n\n", record.file));

    let value = |field: Field| record.get(field).unwrap_or("-").to_string();
    output.push_str(&format!("  Card:          {}\n", value(Field::CardLast4)));
    output.push_str(&format!("  Card variant:  {}\n", value(Field::CardVariant)));
    output.push_str(&format!("  Billing cycle: {}\n", value(Field::BillingCycle)));
    output.push_str(&format!("  Payment due:   {}\n", value(Field::PaymentDueDate)));

    // Balances that did not normalize are shown as captured
    let balance = match record.total_balance.as_deref() {
        Some(raw) => parse_amount(raw)
            .map(format_display_amount)
            .unwrap_or_else(|| raw.to_string()),
        None => "-".to_string(),
    };
    output.push_str(&format!("  Total balance: {}\n", balance));

    let missing = record.missing_fields();
    if !missing.is_empty() {
        output.push_str(&format!("\nNot found: {}\n", missing.join(", ")));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ExtractedRecord {
        ExtractedRecord {
            card_last4: Some("1234".to_string()),
            total_balance: Some("1234.50".to_string()),
            file: "june.pdf".to_string(),
            sample_text_snippet: "Account, ending 1234".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_format_csv() {
        let csv = format_csv(&[record()]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("card_last4,card_variant,billing_cycle,payment_due_date,total_balance,_file,_sample_text_snippet")
        );
        assert_eq!(
            lines.next(),
            Some("1234,,,,1234.50,june.pdf,\"Account, ending 1234\"")
        );
    }

    #[test]
    fn test_format_text() {
        let text = format_text(&record());
        assert!(text.contains("Total balance: $1,234.50"));
        assert!(text.contains("Not found: card_variant, billing_cycle, payment_due_date"));
    }
}
