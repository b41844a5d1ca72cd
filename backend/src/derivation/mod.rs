//! Derivation stage: raw transaction records to augmented records.
//!
//! ```text
//! RawRow ──from_row──▶ TransactionRecord ──derive_record──▶ AugmentedRecord
//!                      (domain checks)                      (calendar, buckets, pricing)
//! ```
//!
//! Every derived field is a pure function of one record. Count, order and
//! identifiers are preserved; the first malformed record fails the run.

pub mod buckets;
pub mod record;

use chrono::Datelike;
use std::collections::HashSet;

use crate::error::{AnalysisError, AnalysisResult, MalformedRecordError};
use crate::models::{AugmentedRecord, TransactionRecord};
use crate::parser::RawRow;

pub use buckets::{age_group, classify_hour, month_name, weekday_name};
pub use record::{parse_timestamp, REQUIRED_COLUMNS};

/// Derive all computed fields for one validated record.
pub fn derive_record(record: TransactionRecord) -> AugmentedRecord {
    let month = record.purchase_date.month();
    let discounted_price = record.product_price * (1.0 - record.discount_applied / 100.0);

    AugmentedRecord {
        purchase_month: month,
        purchase_month_name: month_name(month).to_string(),
        purchase_weekday: weekday_name(record.purchase_date.weekday()).to_string(),
        time_period: classify_hour(record.purchase_hour),
        discounted_price,
        margin: discounted_price - record.shipping_cost,
        age_group: age_group(record.customer_age),
        record,
    }
}

/// Derive augmented records from typed records.
///
/// Re-checks each record's domains and identifier uniqueness, since typed
/// records can be built in code without passing through [`derive_rows`].
pub fn derive(records: &[TransactionRecord]) -> AnalysisResult<Vec<AugmentedRecord>> {
    let mut seen = HashSet::with_capacity(records.len());
    let mut augmented = Vec::with_capacity(records.len());

    for record in records {
        record.validate()?;
        check_unique(&mut seen, &record.transaction_id, 0)?;
        augmented.push(derive_record(record.clone()));
    }

    Ok(augmented)
}

/// Validate raw rows and derive augmented records in one pass.
pub fn derive_rows(rows: &[RawRow]) -> AnalysisResult<Vec<AugmentedRecord>> {
    let mut seen = HashSet::with_capacity(rows.len());
    let mut augmented = Vec::with_capacity(rows.len());

    for row in rows {
        let record = TransactionRecord::from_row(row)?;
        check_unique(&mut seen, &record.transaction_id, row.line)?;
        augmented.push(derive_record(record));
    }

    Ok(augmented)
}

fn check_unique(seen: &mut HashSet<String>, id: &str, line: usize) -> Result<(), AnalysisError> {
    if seen.insert(id.to_string()) {
        Ok(())
    } else {
        Err(MalformedRecordError::new(id, "transaction_id", "a unique identifier", id)
            .at_line(line)
            .into())
    }
}
