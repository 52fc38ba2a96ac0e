//! Parse command - extract transactions from a single statement.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use vypiska_core::{ParseResult, StatementParser};

use super::load_config;

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Input statement (PDF)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Wrap JSON output as {"status": "success", "data": ...}
    #[arg(long)]
    envelope: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV of transactions
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// How a result is rendered.
#[derive(Clone, Copy, Debug)]
pub struct Rendering {
    pub format: OutputFormat,
    pub pretty: bool,
    pub envelope: bool,
}

pub async fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let data = read_statement(&args.input)?;
    info!("Parsing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    pb.set_message("Extracting transactions...");

    let parser = StatementParser::with_config(config);
    let result = tokio::task::spawn_blocking(move || parser.parse_bytes(&data)).await??;

    pb.finish_and_clear();

    let output = format_result(
        &result,
        Rendering {
            format: args.format,
            pretty: args.pretty,
            envelope: args.envelope,
        },
    )?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Read a statement, rejecting missing, non-PDF and empty files.
pub fn read_statement(path: &Path) -> anyhow::Result<Vec<u8>> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    if extension != "pdf" {
        anyhow::bail!("Unsupported file format: only PDF statements are accepted");
    }

    let data = fs::read(path)?;
    if data.is_empty() {
        anyhow::bail!("Input file is empty: {}", path.display());
    }

    Ok(data)
}

pub fn format_result(result: &ParseResult, rendering: Rendering) -> anyhow::Result<String> {
    match rendering.format {
        OutputFormat::Json => format_json(result, rendering.pretty, rendering.envelope),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

fn format_json(result: &ParseResult, pretty: bool, envelope: bool) -> anyhow::Result<String> {
    let value = if envelope {
        serde_json::json!({ "status": "success", "data": result })
    } else {
        serde_json::to_value(result)?
    };

    if pretty {
        Ok(serde_json::to_string_pretty(&value)?)
    } else {
        Ok(serde_json::to_string(&value)?)
    }
}

fn format_csv(result: &ParseResult) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["date", "amount", "description", "type", "method", "card"])?;

    for tx in &result.transactions {
        wtr.write_record([
            tx.date.to_string().as_str(),
            tx.amount.to_string().as_str(),
            tx.description.as_str(),
            tx.category.as_str(),
            tx.method.as_str(),
            tx.card.as_deref().unwrap_or(""),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &ParseResult) -> String {
    let mut output = String::new();

    output.push_str(&format!("Bank: {}\n", result.bank_name));
    let info = &result.account_info;
    if let (Some(start), Some(end)) = (info.period_start, info.period_end) {
        output.push_str(&format!("Period: {} - {}\n", start, end));
    }
    if let Some(contract) = &info.contract_number {
        output.push_str(&format!("Contract: {}\n", contract));
    }
    output.push('\n');

    output.push_str(&format!("Transactions: {}\n", result.transactions_count));
    for tx in &result.transactions {
        output.push_str(&format!(
            "  {}  {:>12}  {:<10}  {}\n",
            tx.date,
            tx.amount.to_string(),
            tx.category.as_str(),
            tx.description
        ));
    }

    if result.rejected_rows_count > 0 {
        output.push_str(&format!("\nRejected rows: {}\n", result.rejected_rows_count));
        for row in &result.rejected_rows {
            output.push_str(&format!("  - {}\n", row.reason));
        }
    }

    if let Some(strategy) = &result.winning_strategy {
        output.push_str(&format!("\nExtracted by: {}\n", strategy));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use vypiska_core::{AccountInfo, Category, ExtractionMethod, Transaction};

    fn sample() -> ParseResult {
        let tx = Transaction {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            amount: Decimal::new(-50000, 2),
            description: "Оплата, магазин".to_string(),
            category: Category::Payment,
            method: ExtractionMethod::Table,
            card: None,
        };
        ParseResult::new("ТБанк".to_string(), AccountInfo::default(), vec![tx], Vec::new())
    }

    #[test]
    fn test_envelope() {
        let json = format_json(&sample(), false, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["status"], "success");
        assert_eq!(value["data"]["bank_name"], "ТБанк");
        assert_eq!(value["data"]["transactions_count"], 1);
    }

    #[test]
    fn test_csv_quotes_descriptions() {
        let csv = format_csv(&sample()).unwrap();
        let lines: Vec<_> = csv.lines().collect();

        assert_eq!(lines[0], "date,amount,description,type,method,card");
        assert_eq!(lines[1], "2024-03-01,-500.00,\"Оплата, магазин\",payment,table,");
    }

    #[test]
    fn test_text_summary() {
        let text = format_text(&sample());

        assert!(text.starts_with("Bank: ТБанк\n"));
        assert!(text.contains("Transactions: 1"));
        assert!(!text.contains("Rejected rows"));
    }
}
