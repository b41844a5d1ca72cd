//! Report adapters over the pipeline outputs.
//!
//! Nothing here computes new statistics; each adapter reshapes the
//! augmented table or the aggregates for one consumer:
//!
//! - [`findings`] - Formatted headline figures for presentations
//! - [`charts`] - Chart datasets (dashboard JSON)
//! - [`console`] - Plain-text console report
//! - [`export`] - Processed CSV and JSON files

pub mod charts;
pub mod console;
pub mod export;
pub mod findings;

pub use charts::{build_dashboard, Chart, ChartData, Dashboard};
pub use export::{write_json, write_outputs, write_processed_csv, OutputPaths, SourceTable, DERIVED_COLUMNS, RETURN_NUMERIC};
pub use findings::{format_money, format_thousands, PresentationFindings};
