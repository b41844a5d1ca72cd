//! Error types for the shoplens analysis pipeline.
//!
//! One error type per layer:
//!
//! - [`CsvError`] - Reading and decoding the input table
//! - [`MalformedRecordError`] - A single record outside its declared domain
//! - [`AnalysisError`] - Derivation and aggregation failures
//! - [`ReportError`] - Writing and validating outputs
//! - [`PipelineError`] - Top-level orchestration errors
//! - [`ServerError`] - HTTP adapter errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// CSV Parsing Errors
// =============================================================================

/// Errors while reading the input table.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to decode the file content.
    #[error("Failed to decode content: {0}")]
    EncodingError(String),

    /// Invalid CSV syntax.
    #[error("Invalid CSV format at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,

    /// A required column is absent from the header row.
    #[error("Missing required column: {0}")]
    MissingColumn(String),
}

// =============================================================================
// Record Errors
// =============================================================================

/// A record with a missing or out-of-domain field.
///
/// Carries enough context to find the offending row without re-running.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Malformed record '{record_id}' (line {line}): field '{field}' expected {expected}, got '{value}'")]
pub struct MalformedRecordError {
    /// Transaction identifier, or `<unknown>` when the id itself is missing.
    pub record_id: String,
    /// 1-based line in the source file (header is line 1), 0 if not from a file.
    pub line: usize,
    /// Column that violated its domain.
    pub field: String,
    /// Human-readable description of the expected domain.
    pub expected: String,
    /// The offending raw value.
    pub value: String,
}

impl MalformedRecordError {
    pub fn new(
        record_id: impl Into<String>,
        field: impl Into<String>,
        expected: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            record_id: record_id.into(),
            line: 0,
            field: field.into(),
            expected: expected.into(),
            value: value.into(),
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }
}

// =============================================================================
// Analysis Errors
// =============================================================================

/// Errors from the derivation and aggregation stages.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// A record failed input validation.
    #[error(transparent)]
    MalformedRecord(#[from] MalformedRecordError),

    /// Zero records were supplied; every aggregate is undefined.
    #[error("No records to analyze")]
    EmptyInput,

    /// An aggregate needs at least one non-empty group.
    #[error("Aggregate '{aggregate}' has no groups to rank")]
    DegenerateAggregate { aggregate: &'static str },
}

// =============================================================================
// Report Errors
// =============================================================================

/// Errors while writing or validating outputs.
#[derive(Debug, Error)]
pub enum ReportError {
    /// IO error.
    #[error("Report IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error.
    #[error("Report JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// CSV writer error.
    #[error("Report CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Source cells and derived rows are out of step.
    #[error("Processed table has {source_rows} source rows but {table_rows} derived rows")]
    TableMismatch { source_rows: usize, table_rows: usize },

    /// Output failed its embedded schema.
    #[error("Output '{document}' failed schema validation: {errors:?}")]
    SchemaError {
        document: &'static str,
        errors: Vec<String>,
    },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the main error type returned by [`crate::pipeline::analyze_csv`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// CSV parsing error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Derivation or aggregation error.
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    /// Output error.
    #[error("Report error: {0}")]
    Report(#[from] ReportError),
}

impl From<MalformedRecordError> for PipelineError {
    fn from(err: MalformedRecordError) -> Self {
        PipelineError::Analysis(err.into())
    }
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for derivation and aggregation.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Result type for report adapters.
pub type ReportResult<T> = Result<T, ReportError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
