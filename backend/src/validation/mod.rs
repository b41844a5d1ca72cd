//! JSON Schema validation of the output documents.
//!
//! Every JSON file a run writes is checked against a Draft 7 schema before
//! it reaches disk or an HTTP client.
//!
//! # Embedded Schemas
//!
//! Schemas are embedded at compile time from the `schemas/` directory:
//! - `analysis-summary.json` - run metadata plus named aggregates
//! - `presentation-findings.json` - formatted headline figures
//! - `dashboard.json` - chart datasets
//!
//! Undefined statistics (`NaN`) serialize as `null`, so numeric aggregate
//! fields accept `["number", "null"]`.
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use shoplens::validation::{validate, is_valid_findings};
//!
//! let schema = json!({ "type": "object", "required": ["name"] });
//! assert!(validate(&schema, &json!({ "name": "x" })).is_ok());
//! assert!(!is_valid_findings(&json!({})));
//! ```

use once_cell::sync::Lazy;
use serde_json::Value;

static SUMMARY_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/analysis-summary.json")).expect("Invalid embedded schema")
});

static FINDINGS_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/presentation-findings.json")).expect("Invalid embedded schema")
});

static DASHBOARD_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/dashboard.json")).expect("Invalid embedded schema")
});

/// Validate a JSON value against a JSON schema.
///
/// # Returns
/// * `Ok(())` if valid
/// * `Err(Vec<String>)` with every violation otherwise
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema).map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Just true/false.
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

/// Validate a summary document.
pub fn validate_summary(data: &Value) -> Result<(), Vec<String>> {
    validate(&SUMMARY_SCHEMA, data)
}

pub fn is_valid_summary(data: &Value) -> bool {
    is_valid(&SUMMARY_SCHEMA, data)
}

/// Validate a findings document.
pub fn validate_findings(data: &Value) -> Result<(), Vec<String>> {
    validate(&FINDINGS_SCHEMA, data)
}

pub fn is_valid_findings(data: &Value) -> bool {
    is_valid(&FINDINGS_SCHEMA, data)
}

/// Validate a dashboard document.
pub fn validate_dashboard(data: &Value) -> Result<(), Vec<String>> {
    validate(&DASHBOARD_SCHEMA, data)
}

pub fn is_valid_dashboard(data: &Value) -> bool {
    is_valid(&DASHBOARD_SCHEMA, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn findings() -> Value {
        json!({
            "total_sales": "$12,345.68 MXN",
            "transactions": "1,000",
            "avg_ticket": "$12.35 MXN",
            "avg_satisfaction": "3.98/5",
            "return_rate": "12.5%",
            "top_category": "Electronics",
            "top_month": "March",
            "peak_hour": "20",
            "profitable_profile": "25-34 / F",
            "main_correlation": "product_price vs total_amount: 0.912"
        })
    }

    #[test]
    fn test_embedded_schemas_parse() {
        assert!(SUMMARY_SCHEMA.is_object());
        assert!(FINDINGS_SCHEMA.is_object());
        assert!(DASHBOARD_SCHEMA.is_object());
    }

    #[test]
    fn test_valid_findings() {
        assert!(is_valid_findings(&findings()));
        assert!(validate_findings(&findings()).is_ok());
    }

    #[test]
    fn test_findings_with_errors() {
        let mut doc = findings();
        doc["peak_hour"] = json!("24");
        doc.as_object_mut().unwrap().remove("top_month");

        let errors = validate_findings(&doc).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_summary_requires_aggregates() {
        let doc = json!({ "run_id": "not-a-uuid", "generated_at": "2024-01-01T00:00:00Z" });
        assert!(!is_valid_summary(&doc));
    }

    #[test]
    fn test_dashboard_chart_type() {
        let ok = json!({ "title": "d", "charts": [
            { "id": "hourly_revenue", "title": "t", "x_label": "", "y_label": "", "type": "bar", "labels": ["1"], "values": [2.0] }
        ]});
        assert!(is_valid_dashboard(&ok));

        let bad = json!({ "title": "d", "charts": [
            { "id": "x", "title": "t", "x_label": "", "y_label": "", "type": "radar" }
        ]});
        assert!(!is_valid_dashboard(&bad));
    }

    #[test]
    fn test_generic_validate() {
        let schema = json!({ "type": "object", "required": ["name"], "properties": { "name": { "type": "string" } } });
        assert!(validate(&schema, &json!({ "name": "test" })).is_ok());
        assert!(validate(&schema, &json!({ "age": 42 })).is_err());
    }
}
