//! REST API types for dashboard clients.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::pipeline::{AnalysisRun, CsvInfo};
use crate::report::PresentationFindings;

/// Response sent after a CSV upload has been analyzed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    /// Run identifier, shared with the summary document
    pub job_id: String,

    /// Always "ready" on success; failures use [`error_response`]
    pub status: String,

    /// CSV info
    pub csv_info: CsvMetadata,

    /// Formatted headline figures
    pub findings: PresentationFindings,

    /// Summary document (run metadata plus named aggregates)
    pub summary: Value,

    /// Chart datasets
    pub dashboard: Value,
}

/// CSV file metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvMetadata {
    pub encoding: String,
    pub delimiter: String,
    pub row_count: usize,
    pub columns: Vec<String>,
}

impl From<&CsvInfo> for CsvMetadata {
    fn from(info: &CsvInfo) -> Self {
        CsvMetadata {
            encoding: info.encoding.clone(),
            delimiter: info.delimiter.to_string(),
            row_count: info.row_count,
            columns: info.headers.clone(),
        }
    }
}

impl TryFrom<&AnalysisRun> for AnalysisResponse {
    type Error = serde_json::Error;

    fn try_from(run: &AnalysisRun) -> Result<Self, Self::Error> {
        Ok(AnalysisResponse {
            job_id: run.run_id.to_string(),
            status: "ready".to_string(),
            csv_info: CsvMetadata::from(&run.csv_info),
            findings: run.findings.clone(),
            summary: run.summary_document()?,
            dashboard: serde_json::to_value(&run.dashboard)?,
        })
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
        "findings": null,
        "summary": null,
        "dashboard": null
    })
}
