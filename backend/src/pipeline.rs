//! High-level pipeline API: CSV in, analysis run out.
//!
//! Combines every stage: parsing, derivation, aggregation, report
//! assembly and schema validation of the output documents.
//!
//! # Example
//!
//! ```rust,ignore
//! use shoplens::pipeline::{analyze_csv, write_run, AnalyzeOptions};
//! use shoplens::config::AnalysisConfig;
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let run = analyze_csv(Path::new("ecommerce_dataset.csv"), &AnalyzeOptions::default())?;
//!     println!("Top category: {}", run.aggregates.summary.top_category);
//!     write_run(&run, &AnalysisConfig::from_env())?;
//!     Ok(())
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use uuid::Uuid;

use crate::aggregation::{aggregate, Aggregates};
use crate::api::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::config::AnalysisConfig;
use crate::derivation::{derive, derive_rows, REQUIRED_COLUMNS};
use crate::error::{PipelineResult, ReportError};
use crate::models::{AugmentedRecord, TransactionRecord};
use crate::parser::{parse_bytes_auto, parse_csv_file_auto, require_columns, ParseResult};
use crate::report::{build_dashboard, write_outputs, Dashboard, OutputPaths, PresentationFindings, SourceTable};
use crate::validation::{validate_dashboard, validate_findings, validate_summary};

/// Options for one analysis run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzeOptions {
    /// Skip schema validation of the output documents
    pub skip_validation: bool,
}

/// CSV file information
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

/// Everything one run produced.
///
/// Serializes as the summary document: run metadata plus every aggregate
/// under its own name. The tables, findings and dashboard are written to
/// their own files.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRun {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    /// File name of the input, when read from disk.
    pub source: Option<String>,
    pub csv_info: CsvInfo,
    #[serde(flatten)]
    pub aggregates: Aggregates,
    /// Input cells as read, written back unchanged.
    #[serde(skip)]
    pub source_table: SourceTable,
    #[serde(skip)]
    pub table: Vec<AugmentedRecord>,
    #[serde(skip)]
    pub findings: PresentationFindings,
    #[serde(skip)]
    pub dashboard: Dashboard,
}

impl AnalysisRun {
    /// The summary document as JSON.
    pub fn summary_document(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Check the summary, findings and dashboard against their schemas.
    pub fn validate_documents(&self) -> PipelineResult<()> {
        let summary = self.summary_document().map_err(ReportError::from)?;
        validate_summary(&summary).map_err(|errors| ReportError::SchemaError { document: "summary", errors })?;

        let findings = serde_json::to_value(&self.findings).map_err(ReportError::from)?;
        validate_findings(&findings).map_err(|errors| ReportError::SchemaError { document: "findings", errors })?;

        let dashboard = serde_json::to_value(&self.dashboard).map_err(ReportError::from)?;
        validate_dashboard(&dashboard).map_err(|errors| ReportError::SchemaError { document: "dashboard", errors })?;

        Ok(())
    }
}

/// Analyze a CSV file.
///
/// This is the main entry point. It:
/// 1. Parses the CSV with encoding and delimiter auto-detection
/// 2. Checks the required columns
/// 3. Validates and derives every record
/// 4. Computes the aggregates
/// 5. Assembles and validates findings and dashboard
pub fn analyze_csv(path: &Path, options: &AnalyzeOptions) -> PipelineResult<AnalysisRun> {
    let parse_result = parse_csv_file_auto(path)?;
    let source = path.file_name().map(|n| n.to_string_lossy().into_owned());
    analyze_parsed(parse_result, options, source)
}

/// Same as [`analyze_csv`] for an uploaded file.
pub fn analyze_bytes(bytes: &[u8], options: &AnalyzeOptions) -> PipelineResult<AnalysisRun> {
    let parse_result = parse_bytes_auto(bytes)?;
    analyze_parsed(parse_result, options, None)
}

/// Analyze records that are already typed (no CSV involved).
pub fn analyze_records(records: &[TransactionRecord], options: &AnalyzeOptions) -> PipelineResult<AnalysisRun> {
    log_info(format!("📋 {} typed records", records.len()));
    let table = derive(records)?;
    let csv_info = CsvInfo {
        encoding: "utf-8".to_string(),
        delimiter: ',',
        headers: REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
        row_count: records.len(),
    };
    finish(SourceTable::from_records(records), table, csv_info, None, options)
}

/// Parse and derive only: the processed table without aggregation.
pub fn derive_csv(path: &Path) -> PipelineResult<(CsvInfo, SourceTable, Vec<AugmentedRecord>)> {
    let parse_result = parse_csv_file_auto(path)?;
    let csv_info = read_step(&parse_result)?;

    log_info("🧮 Deriving columns...");
    let table = derive_rows(&parse_result.rows)?;
    log_success(format!("{} records derived", table.len()));

    Ok((csv_info, SourceTable::from_parsed(&parse_result), table))
}

/// Write all output files of a run.
pub fn write_run(run: &AnalysisRun, config: &AnalysisConfig) -> PipelineResult<OutputPaths> {
    log_info(format!("💾 Writing outputs to {}...", config.output_dir.display()));
    Ok(write_outputs(config, &run.source_table, &run.table, run, &run.findings, &run.dashboard)?)
}

fn analyze_parsed(
    parse_result: ParseResult,
    options: &AnalyzeOptions,
    source: Option<String>,
) -> PipelineResult<AnalysisRun> {
    let csv_info = read_step(&parse_result)?;

    log_info("🧮 Validating and deriving records...");
    let table = derive_rows(&parse_result.rows)?;
    log_success(format!("{} records derived (7 new columns)", table.len()));

    finish(SourceTable::from_parsed(&parse_result), table, csv_info, source, options)
}

/// Log what was read and check the required columns.
fn read_step(parse_result: &ParseResult) -> PipelineResult<CsvInfo> {
    log_info("📖 Reading CSV file...");
    log_success(format!("Detected encoding: {}", parse_result.encoding));
    log_success(format!("Detected separator: '{}'", format_delimiter(parse_result.delimiter)));
    log_success(format!("Read {} rows", parse_result.rows.len()));

    log_info(format!("📋 CSV has {} columns:", parse_result.headers.len()));
    for (i, col) in parse_result.headers.iter().enumerate() {
        log_info_indent(format!("[{:2}] {}", i + 1, col), 1);
    }

    require_columns(&parse_result.headers, &REQUIRED_COLUMNS)?;

    let extra = parse_result
        .headers
        .iter()
        .filter(|h| !REQUIRED_COLUMNS.contains(&h.as_str()))
        .count();
    if extra > 0 {
        log_warning(format!("{} extra column(s) not analyzed, kept in the processed table", extra));
    }

    Ok(CsvInfo {
        encoding: parse_result.encoding.clone(),
        delimiter: parse_result.delimiter,
        headers: parse_result.headers.clone(),
        row_count: parse_result.rows.len(),
    })
}

fn finish(
    source_table: SourceTable,
    table: Vec<AugmentedRecord>,
    csv_info: CsvInfo,
    source: Option<String>,
    options: &AnalyzeOptions,
) -> PipelineResult<AnalysisRun> {
    log_info("📊 Computing aggregates...");
    let aggregates = aggregate(&table)?;
    log_success(format!(
        "Total sales {:.2} over {} transactions",
        aggregates.summary.total_revenue, aggregates.summary.total_transactions
    ));

    log_info("📈 Building findings and chart datasets...");
    let findings = PresentationFindings::from_aggregates(&aggregates);
    let dashboard = build_dashboard(&table, &aggregates);
    log_success(format!("{} charts", dashboard.charts.len()));

    let run = AnalysisRun {
        run_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        source,
        csv_info,
        aggregates,
        source_table,
        table,
        findings,
        dashboard,
    };

    if options.skip_validation {
        log_info("(validation skipped)");
    } else {
        log_info("✔️  Validating output documents...");
        run.validate_documents()?;
        log_success("All output documents valid");
    }

    Ok(run)
}

/// Format delimiter for display
fn format_delimiter(d: char) -> &'static str {
    match d {
        ';' => ";",
        ',' => ",",
        '\t' => "TAB",
        '|' => "|",
        _ => "?",
    }
}
