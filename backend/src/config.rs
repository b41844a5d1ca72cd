//! Run configuration.
//!
//! Compiled defaults, overridable through environment variables (a `.env`
//! file is loaded by the CLI before this is read). Command-line flags take
//! precedence over both.

use serde::Serialize;
use std::path::PathBuf;

use crate::api::logs::log_warning;

/// Directory that receives every output file.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Processed table: original columns plus derived columns.
pub const DEFAULT_PROCESSED_CSV: &str = "ecommerce_dataset_processed.csv";

/// Full aggregate mapping.
pub const DEFAULT_SUMMARY_JSON: &str = "analysis_summary.json";

/// Formatted headline findings.
pub const DEFAULT_FINDINGS_JSON: &str = "presentation_findings.json";

/// Chart datasets.
pub const DEFAULT_DASHBOARD_JSON: &str = "dashboard.json";

/// HTTP port for `serve`.
pub const DEFAULT_PORT: u16 = 3000;

/// Maximum upload size accepted by the HTTP API (50 MB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisConfig {
    pub output_dir: PathBuf,
    pub processed_csv: String,
    pub summary_json: String,
    pub findings_json: String,
    pub dashboard_json: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            processed_csv: DEFAULT_PROCESSED_CSV.to_string(),
            summary_json: DEFAULT_SUMMARY_JSON.to_string(),
            findings_json: DEFAULT_FINDINGS_JSON.to_string(),
            dashboard_json: DEFAULT_DASHBOARD_JSON.to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl AnalysisConfig {
    /// Read `SHOPLENS_*` variables from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup("SHOPLENS_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(name) = lookup("SHOPLENS_PROCESSED_CSV") {
            config.processed_csv = name;
        }
        if let Some(name) = lookup("SHOPLENS_SUMMARY_JSON") {
            config.summary_json = name;
        }
        if let Some(name) = lookup("SHOPLENS_FINDINGS_JSON") {
            config.findings_json = name;
        }
        if let Some(name) = lookup("SHOPLENS_DASHBOARD_JSON") {
            config.dashboard_json = name;
        }
        if let Some(port) = lookup("SHOPLENS_PORT") {
            match port.trim().parse() {
                Ok(p) => config.port = p,
                Err(_) => log_warning(format!("Ignoring SHOPLENS_PORT='{}' (not a port number)", port)),
            }
        }
        if let Some(limit) = lookup("SHOPLENS_MAX_UPLOAD_BYTES") {
            match limit.trim().parse() {
                Ok(n) => config.max_upload_bytes = n,
                Err(_) => log_warning(format!("Ignoring SHOPLENS_MAX_UPLOAD_BYTES='{}' (not a byte count)", limit)),
            }
        }

        config
    }

    pub fn processed_csv_path(&self) -> PathBuf {
        self.output_dir.join(&self.processed_csv)
    }

    pub fn summary_json_path(&self) -> PathBuf {
        self.output_dir.join(&self.summary_json)
    }

    pub fn findings_json_path(&self) -> PathBuf {
        self.output_dir.join(&self.findings_json)
    }

    pub fn dashboard_json_path(&self) -> PathBuf {
        self.output_dir.join(&self.dashboard_json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.processed_csv_path(), PathBuf::from("output/ecommerce_dataset_processed.csv"));
    }

    #[test]
    fn test_lookup_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("SHOPLENS_OUTPUT_DIR", "/tmp/run"),
            ("SHOPLENS_SUMMARY_JSON", "s.json"),
            ("SHOPLENS_PORT", "8080"),
        ]);
        let config = AnalysisConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.summary_json_path(), PathBuf::from("/tmp/run/s.json"));
        assert_eq!(config.port, 8080);
        assert_eq!(config.findings_json, DEFAULT_FINDINGS_JSON);
    }

    #[test]
    fn test_invalid_number_keeps_default() {
        let config = AnalysisConfig::from_lookup(|k| (k == "SHOPLENS_PORT").then(|| "http".to_string()));
        assert_eq!(config.port, DEFAULT_PORT);
    }
}
