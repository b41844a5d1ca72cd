//! Integration tests for output files
//!
//! Run the pipeline, write every output into a temp directory and read the
//! files back.

mod common;

use common::{sample_records, to_csv};
use shoplens::config::AnalysisConfig;
use shoplens::report::{DERIVED_COLUMNS, RETURN_NUMERIC};
use shoplens::validation::{is_valid_dashboard, is_valid_findings, is_valid_summary};
use shoplens::{analyze_bytes, write_run, AnalyzeOptions};
use std::collections::HashMap;
use std::fs;

fn config_in(dir: &std::path::Path) -> AnalysisConfig {
    let vars = HashMap::from([("SHOPLENS_OUTPUT_DIR", dir.join("out").to_string_lossy().into_owned())]);
    AnalysisConfig::from_lookup(|k| vars.get(k).cloned())
}

#[test]
fn test_write_run_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let records = sample_records(35);
    let run = analyze_bytes(to_csv(&records, ',').as_bytes(), &AnalyzeOptions::default()).unwrap();
    let paths = write_run(&run, &config).unwrap();

    assert!(paths.processed_csv.starts_with(dir.path().join("out")));
    for path in [&paths.processed_csv, &paths.summary_json, &paths.findings_json, &paths.dashboard_json] {
        assert!(path.exists(), "{} not written", path.display());
    }

    let summary: serde_json::Value = serde_json::from_str(&fs::read_to_string(&paths.summary_json).unwrap()).unwrap();
    let findings: serde_json::Value = serde_json::from_str(&fs::read_to_string(&paths.findings_json).unwrap()).unwrap();
    let dashboard: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&paths.dashboard_json).unwrap()).unwrap();

    assert!(is_valid_summary(&summary));
    assert!(is_valid_findings(&findings));
    assert!(is_valid_dashboard(&dashboard));

    assert_eq!(summary["run_id"], run.run_id.to_string());
    assert_eq!(summary["summary"]["total_transactions"], 35);
    assert_eq!(findings["top_category"], run.aggregates.summary.top_category);
}

#[test]
fn test_processed_csv_shape() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let records = sample_records(18);
    let run = analyze_bytes(to_csv(&records, ';').as_bytes(), &AnalyzeOptions::default()).unwrap();
    let paths = write_run(&run, &config).unwrap();

    let mut reader = csv::Reader::from_path(&paths.processed_csv).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    let expected: Vec<String> = run
        .csv_info
        .headers
        .iter()
        .cloned()
        .chain(DERIVED_COLUMNS.iter().map(|c| c.to_string()))
        .chain([RETURN_NUMERIC.to_string()])
        .collect();
    assert_eq!(headers, expected);

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), records.len());

    // Same order, identifiers preserved
    for (row, record) in rows.iter().zip(&records) {
        assert_eq!(&row[0], record.transaction_id);
        assert_eq!(row.len(), expected.len());
        assert_eq!(&row[expected.len() - 1], if record.return_flag.is_returned() { "1" } else { "0" });
    }
}

#[test]
fn test_processed_csv_keeps_source_cells() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let text = format!(
        "{},Store_ID\nT1,2024-04-03,20,28,F,Books,100.0,1,0,0,3,Card,5,Sí,100.0,S9\n\
         T2,2024-04-05 18:30:00,18,41,M,Toys,20.50,2,0,3,5,Cash,3,no,44.0,S2\n",
        common::HEADER.join(",")
    );
    let run = analyze_bytes(text.as_bytes(), &AnalyzeOptions::default()).unwrap();
    let paths = write_run(&run, &config).unwrap();

    let written = fs::read_to_string(&paths.processed_csv).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains(",total_amount,store_id,"));
    assert!(lines[1].starts_with("T1,2024-04-03,20,28,F,Books,100.0,1,0,0,3,Card,5,Sí,100.0,S9,"));
    assert!(lines[1].ends_with(",1"));
    assert!(lines[2].starts_with("T2,2024-04-05 18:30:00,18,41,M,Toys,20.50,2,0,3,5,Cash,3,no,44.0,S2,"));
    assert!(lines[2].ends_with(",0"));
}

#[test]
fn test_dashboard_charts() {
    let run = analyze_bytes(to_csv(&sample_records(40), ',').as_bytes(), &AnalyzeOptions::default()).unwrap();

    let age = serde_json::to_value(run.dashboard.chart("age_distribution").unwrap()).unwrap();
    assert_eq!(age["type"], "histogram");
    assert_eq!(age["bins"].as_array().unwrap().len(), 20);

    let amount = serde_json::to_value(run.dashboard.chart("amount_distribution").unwrap()).unwrap();
    let counted: u64 = amount["bins"].as_array().unwrap().iter().map(|b| b["count"].as_u64().unwrap()).sum();
    assert_eq!(counted, 40);

    for id in [
        "revenue_by_category",
        "monthly_revenue",
        "price_vs_satisfaction",
        "correlation_heatmap",
        "satisfaction_by_category",
        "daily_revenue",
        "hourly_revenue",
        "time_period_share",
        "satisfaction_by_payment",
        "delivery_return_rate",
    ] {
        assert!(run.dashboard.chart(id).is_some(), "missing chart {id}");
    }
}

#[test]
fn test_skip_validation_still_writes() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let run = analyze_bytes(
        to_csv(&sample_records(5), ',').as_bytes(),
        &AnalyzeOptions { skip_validation: true },
    )
    .unwrap();
    let paths = write_run(&run, &config).unwrap();
    assert!(paths.findings_json.exists());
}
