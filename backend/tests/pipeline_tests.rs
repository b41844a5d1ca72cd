//! Integration tests for the analysis pipeline
//!
//! Drive the public API from CSV text (or typed records) to aggregates.

mod common;

use common::{approx, latin1, sample_records, to_csv};
use shoplens::{
    analyze_bytes, analyze_csv, analyze_records, AnalysisError, AnalyzeOptions, CsvError, NumericColumn,
    PipelineError, ReturnFlag,
};

fn options() -> AnalyzeOptions {
    AnalyzeOptions::default()
}

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn test_latin1_semicolon_export() {
    let records = sample_records(30);
    let returned = records.iter().filter(|r| r.return_flag.is_returned()).count();
    assert!(returned > 0);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ventas.csv");
    std::fs::write(&path, latin1(&to_csv(&records, ';'))).unwrap();

    let run = analyze_csv(&path, &options()).unwrap();

    assert_eq!(run.csv_info.delimiter, ';');
    assert_eq!(run.csv_info.row_count, 30);
    assert_eq!(run.source.as_deref(), Some("ventas.csv"));
    assert_eq!(
        run.table.iter().filter(|r| r.record.return_flag.is_returned()).count(),
        returned
    );
}

#[test]
fn test_tab_and_pipe_delimiters() {
    let records = sample_records(12);
    for delimiter in ['\t', '|', ','] {
        let text = to_csv(&records, delimiter);
        let run = analyze_bytes(text.as_bytes(), &options()).unwrap();
        assert_eq!(run.csv_info.delimiter, delimiter);
        assert_eq!(run.table.len(), 12);
    }
}

#[test]
fn test_headers_are_normalized() {
    let text = "Transaction ID,Purchase Date,Purchase Hour,Customer Age,Customer Gender,Product Category,\
                Product Price,Quantity,Discount Applied,Shipping Cost,Delivery Days,Payment Method,\
                Customer Satisfaction,Return Flag,Total Amount\n\
                X1,2024-06-01,12,35,M,Books,20,1,0,3,2,Cash,4,no,23\n";
    let run = analyze_bytes(text.as_bytes(), &options()).unwrap();
    assert_eq!(run.csv_info.headers[0], "transaction_id");
    assert_eq!(run.aggregates.summary.top_category, "Books");
}

// ============================================================================
// Derivation
// ============================================================================

#[test]
fn test_table_preserves_count_order_and_fields() {
    let records = sample_records(25);
    let run = analyze_records(&records, &options()).unwrap();

    assert_eq!(run.table.len(), records.len());
    for (augmented, original) in run.table.iter().zip(&records) {
        assert_eq!(&augmented.record, original);
    }
}

#[test]
fn test_csv_and_typed_inputs_agree() {
    let records = sample_records(20);
    let from_records = analyze_records(&records, &options()).unwrap();
    let from_csv = analyze_bytes(to_csv(&records, ',').as_bytes(), &options()).unwrap();

    assert_eq!(from_records.table, from_csv.table);
    // NaN-safe comparison: undefined statistics serialize as null
    assert_eq!(
        serde_json::to_value(&from_records.aggregates).unwrap(),
        serde_json::to_value(&from_csv.aggregates).unwrap()
    );
}

// ============================================================================
// Aggregation
// ============================================================================

#[test]
fn test_top_correlations_stable_under_reordering() {
    let records = sample_records(60);
    let mut reversed = records.clone();
    reversed.reverse();
    let mut rotated = records.clone();
    rotated.rotate_left(17);

    let base = analyze_records(&records, &options()).unwrap().aggregates.top_correlations;
    for shuffled in [reversed, rotated] {
        let other = analyze_records(&shuffled, &options()).unwrap().aggregates.top_correlations;
        assert_eq!(base.len(), other.len());
        for (a, b) in base.iter().zip(&other) {
            assert_eq!((a.left, a.right), (b.left, b.right));
            assert!((a.coefficient - b.coefficient).abs() < 1e-9);
        }
    }
}

#[test]
fn test_correlation_matrix_properties() {
    let run = analyze_records(&sample_records(40), &options()).unwrap();
    let m = &run.aggregates.correlation;

    for a in NumericColumn::ALL {
        assert_eq!(m.get(a, a), Some(1.0));
        for b in NumericColumn::ALL {
            let ab = m.get(a, b).unwrap();
            let ba = m.get(b, a).unwrap();
            assert!(ab == ba || (ab.is_nan() && ba.is_nan()));
        }
    }
}

#[test]
fn test_summary_totals_match_table() {
    let records = sample_records(50);
    let run = analyze_records(&records, &options()).unwrap();
    let s = &run.aggregates.summary;

    let total: f64 = records.iter().map(|r| r.total_amount).sum();
    assert_eq!(s.total_transactions, 50);
    assert!((s.total_revenue - total).abs() < 1e-6);
    assert!(approx(s.avg_ticket, s.total_revenue / 50.0));

    let by_category: f64 = run.aggregates.revenue_by_category.iter().map(|v| v.value).sum();
    assert!((by_category - total).abs() < 1e-6);
    assert_eq!(run.aggregates.revenue_by_category[0].key, s.top_category);
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_unknown_return_flag_is_rejected() {
    let mut records = sample_records(3);
    for r in &mut records {
        r.return_flag = ReturnFlag::Kept;
    }
    let text = to_csv(&records, ',').replacen(",No,", ",maybe,", 1);

    let err = analyze_bytes(text.as_bytes(), &options()).unwrap_err();
    match err {
        PipelineError::Analysis(AnalysisError::MalformedRecord(e)) => {
            assert_eq!(e.field, "return_flag");
            assert_eq!(e.value, "maybe");
            assert_eq!(e.record_id, "TX0001");
            assert_eq!(e.line, 2);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_duplicate_identifier_is_rejected() {
    let mut records = sample_records(4);
    records[3].transaction_id = records[1].transaction_id.clone();

    let err = analyze_bytes(to_csv(&records, ',').as_bytes(), &options()).unwrap_err();
    match err {
        PipelineError::Analysis(AnalysisError::MalformedRecord(e)) => {
            assert_eq!(e.field, "transaction_id");
            assert_eq!(e.record_id, records[1].transaction_id);
            assert_eq!(e.line, 5);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_missing_required_column() {
    let text = "transaction_id,purchase_date,total_amount\nT1,2024-01-01,10\n";
    let err = analyze_bytes(text.as_bytes(), &options()).unwrap_err();
    assert!(matches!(err, PipelineError::Csv(CsvError::MissingColumn(ref c)) if c == "purchase_hour"));
}

#[test]
fn test_empty_file() {
    let err = analyze_bytes(b"", &options()).unwrap_err();
    assert!(matches!(err, PipelineError::Csv(CsvError::EmptyFile)));
}
