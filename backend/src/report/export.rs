//! Output files: processed table and JSON documents.

use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::api::logs::log_success;
use crate::config::AnalysisConfig;
use crate::derivation::REQUIRED_COLUMNS;
use crate::error::{ReportError, ReportResult};
use crate::models::{AugmentedRecord, TransactionRecord};
use crate::parser::ParseResult;

/// Derived columns, appended after the original ones.
pub const DERIVED_COLUMNS: [&str; 7] = [
    "purchase_month",
    "purchase_month_name",
    "purchase_weekday",
    "time_period",
    "discounted_price",
    "margin",
    "age_group",
];

/// Return flag as 0/1, the last column of the processed table.
pub const RETURN_NUMERIC: &str = "return_numeric";

/// Where a run's files were written.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputPaths {
    pub processed_csv: PathBuf,
    pub summary_json: PathBuf,
    pub findings_json: PathBuf,
    pub dashboard_json: PathBuf,
}

/// The input columns of a run, cell for cell, one row per record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceTable {
    /// Normalized header names, in file order.
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SourceTable {
    /// Every column of the parsed file, extra ones included.
    pub fn from_parsed(parsed: &ParseResult) -> Self {
        Self {
            headers: parsed.headers.clone(),
            rows: parsed.rows.iter().map(|r| r.cells.clone()).collect(),
        }
    }

    /// Typed records rendered under the required columns.
    pub fn from_records(records: &[TransactionRecord]) -> Self {
        Self {
            headers: REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: records.iter().map(record_fields).collect(),
        }
    }

    /// Header of the processed table built on this source.
    pub fn processed_header(&self) -> Vec<&str> {
        self.headers
            .iter()
            .map(String::as_str)
            .chain(DERIVED_COLUMNS)
            .chain([RETURN_NUMERIC])
            .collect()
    }
}

fn record_fields(r: &TransactionRecord) -> Vec<String> {
    vec![
        r.transaction_id.clone(),
        r.purchase_date_text(),
        r.purchase_hour.to_string(),
        r.customer_age.to_string(),
        r.customer_gender.clone(),
        r.product_category.clone(),
        r.product_price.to_string(),
        r.quantity.to_string(),
        r.discount_applied.to_string(),
        r.shipping_cost.to_string(),
        r.delivery_days.to_string(),
        r.payment_method.clone(),
        r.customer_satisfaction.to_string(),
        r.return_flag.label().to_string(),
        r.total_amount.to_string(),
    ]
}

fn derived_fields(row: &AugmentedRecord) -> [String; 8] {
    [
        row.purchase_month.to_string(),
        row.purchase_month_name.clone(),
        row.purchase_weekday.clone(),
        row.time_period.label().to_string(),
        row.discounted_price.to_string(),
        row.margin.to_string(),
        row.age_group.label().to_string(),
        if row.record.return_flag.is_returned() { "1" } else { "0" }.to_string(),
    ]
}

/// Write the processed table: source cells unchanged, then the derived
/// columns, one row per record in table order.
pub fn write_processed_csv<W: Write>(writer: W, source: &SourceTable, table: &[AugmentedRecord]) -> ReportResult<()> {
    if source.rows.len() != table.len() {
        return Err(ReportError::TableMismatch {
            source_rows: source.rows.len(),
            table_rows: table.len(),
        });
    }

    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(source.processed_header())?;
    for (cells, row) in source.rows.iter().zip(table) {
        wtr.write_record(cells.iter().map(String::as_str).chain(derived_fields(row).iter().map(String::as_str)))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Pretty-printed JSON file.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> ReportResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Write the four output files of a run under the configured directory.
pub fn write_outputs<S, F, D>(
    config: &AnalysisConfig,
    source: &SourceTable,
    table: &[AugmentedRecord],
    summary: &S,
    findings: &F,
    dashboard: &D,
) -> ReportResult<OutputPaths>
where
    S: Serialize + ?Sized,
    F: Serialize + ?Sized,
    D: Serialize + ?Sized,
{
    fs::create_dir_all(&config.output_dir)?;

    let paths = OutputPaths {
        processed_csv: config.processed_csv_path(),
        summary_json: config.summary_json_path(),
        findings_json: config.findings_json_path(),
        dashboard_json: config.dashboard_json_path(),
    };

    write_processed_csv(BufWriter::new(File::create(&paths.processed_csv)?), source, table)?;
    log_success(format!("Processed table: {}", paths.processed_csv.display()));

    write_json(&paths.summary_json, summary)?;
    log_success(format!("Summary: {}", paths.summary_json.display()));

    write_json(&paths.findings_json, findings)?;
    log_success(format!("Findings: {}", paths.findings_json.display()));

    write_json(&paths.dashboard_json, dashboard)?;
    log_success(format!("Dashboard: {}", paths.dashboard_json.display()));

    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derivation::{derive_record, derive_rows};
    use crate::models::ReturnFlag;
    use crate::parser::parse_string_with_metadata;
    use chrono::NaiveDate;

    fn record() -> TransactionRecord {
        TransactionRecord {
            transaction_id: "T-1".to_string(),
            purchase_date: NaiveDate::from_ymd_opt(2024, 2, 10).unwrap().and_hms_opt(0, 0, 0).unwrap(),
            purchase_hour: 9,
            customer_age: 30,
            customer_gender: "F".to_string(),
            product_category: "Books".to_string(),
            product_price: 100.0,
            quantity: 2,
            discount_applied: 10.0,
            shipping_cost: 5.5,
            delivery_days: 4,
            payment_method: "PayPal".to_string(),
            customer_satisfaction: 4,
            return_flag: ReturnFlag::Returned,
            total_amount: 185.5,
        }
    }

    #[test]
    fn test_header_order() {
        let source = SourceTable::from_records(&[record()]);
        let header = source.processed_header();

        assert_eq!(header.len(), 23);
        assert_eq!(header[0], "transaction_id");
        assert_eq!(header[15], "purchase_month");
        assert_eq!(header[21], "age_group");
        assert_eq!(header[22], "return_numeric");
    }

    #[test]
    fn test_typed_records_rendered() {
        let mut buf = Vec::new();
        let records = [record()];
        let table = [derive_record(record())];
        write_processed_csv(&mut buf, &SourceTable::from_records(&records), &table).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("transaction_id,purchase_date,purchase_hour"));
        assert_eq!(
            lines[1],
            "T-1,2024-02-10,9,30,F,Books,100,2,10,5.5,4,PayPal,4,Yes,185.5,2,February,Saturday,Morning,90,84.5,25-34,1"
        );
    }

    #[test]
    fn test_source_cells_written_unchanged() {
        let text = "Transaction_ID,Purchase_Date,Purchase_Hour,Customer_Age,Customer_Gender,Product_Category,\
                    Product_Price,Quantity,Discount_Applied,Shipping_Cost,Delivery_Days,Payment_Method,\
                    Customer_Satisfaction,Return_Flag,Total_Amount,Store_ID\n\
                    T1,2024-04-03,20,28,F,Books,100.0,1,0,0,3,Card,5,Sí,100.0,S9\n";
        let parsed = parse_string_with_metadata(text, ',', "utf-8".to_string()).unwrap();
        let table = derive_rows(&parsed.rows).unwrap();

        let mut buf = Vec::new();
        write_processed_csv(&mut buf, &SourceTable::from_parsed(&parsed), &table).unwrap();
        let out = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = out.lines().collect();

        assert!(lines[0].starts_with("transaction_id,"));
        assert!(lines[0].contains(",total_amount,store_id,purchase_month,"));
        assert!(lines[0].ends_with(",age_group,return_numeric"));
        assert_eq!(
            lines[1],
            "T1,2024-04-03,20,28,F,Books,100.0,1,0,0,3,Card,5,Sí,100.0,S9,4,April,Wednesday,Night,100,100,25-34,1"
        );
    }

    #[test]
    fn test_row_count_mismatch() {
        let source = SourceTable::from_records(&[record(), record()]);
        let err = write_processed_csv(Vec::new(), &source, &[derive_record(record())]).unwrap_err();
        assert!(matches!(err, ReportError::TableMismatch { source_rows: 2, table_rows: 1 }));
    }

    #[test]
    fn test_write_json_pretty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.json");
        write_json(&path, &serde_json::json!({"a": 1})).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"a\": 1"));
    }
}
