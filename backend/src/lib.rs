//! # Shoplens - e-commerce transaction analysis
//!
//! Shoplens reads an e-commerce transaction CSV export, derives calendar,
//! time-of-day, pricing and demographic columns for every record, and
//! reduces the resulting table to a fixed set of named aggregates.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV File   │────▶│   Parser    │────▶│ Derivation  │────▶│ Aggregation │────▶│   Reports   │
//! │ (ISO/UTF8)  │     │ (auto-enc)  │     │ (augmented) │     │  (named)    │     │ (CSV/JSON)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use shoplens::{analyze_csv, AnalyzeOptions};
//! use std::path::Path;
//!
//! let run = analyze_csv(Path::new("ecommerce_dataset.csv"), &AnalyzeOptions::default()).unwrap();
//! println!("Top category: {}", run.aggregates.summary.top_category);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Transaction and augmented records, column enums
//! - [`parser`] - CSV parsing with auto-detection
//! - [`derivation`] - Record validation and derived columns
//! - [`aggregation`] - Statistics, correlations, group-by rollups
//! - [`pipeline`] - End-to-end orchestration
//! - [`report`] - Console report, processed CSV, findings, chart datasets
//! - [`validation`] - Output schema validation
//! - [`config`] - Run configuration
//! - [`api`] - HTTP API server

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Analysis
pub mod aggregation;
pub mod derivation;

// Orchestration and outputs
pub mod pipeline;
pub mod report;

// Validation
pub mod validation;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{AnalysisError, CsvError, MalformedRecordError, PipelineError, ReportError, ServerError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    AgeGroup, AugmentedRecord, CategoricalColumn, NumericColumn, ReturnFlag, TimePeriod, TransactionRecord,
};

// =============================================================================
// Re-exports - Stages
// =============================================================================

pub use aggregation::{aggregate, Aggregates, SummaryStats};
pub use derivation::{derive, derive_record, derive_rows};
pub use parser::{detect_delimiter, detect_encoding, parse_bytes_auto, parse_csv_file_auto, ParseResult, RawRow};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use pipeline::{analyze_bytes, analyze_csv, analyze_records, write_run, AnalysisRun, AnalyzeOptions, CsvInfo};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::logs::LOG_BROADCASTER;
pub use api::types::{error_response, AnalysisResponse};

// Server
pub mod server {
    pub use crate::api::server::{router, start_server};
}
