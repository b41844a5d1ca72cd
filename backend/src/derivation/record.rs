//! Input boundary: raw string rows to validated transaction records.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::MalformedRecordError;
use crate::models::{ReturnFlag, TransactionRecord};
use crate::parser::RawRow;

/// Columns every input table must carry (normalized names).
pub const REQUIRED_COLUMNS: [&str; 15] = [
    "transaction_id",
    "purchase_date",
    "purchase_hour",
    "customer_age",
    "customer_gender",
    "product_category",
    "product_price",
    "quantity",
    "discount_applied",
    "shipping_cost",
    "delivery_days",
    "payment_method",
    "customer_satisfaction",
    "return_flag",
    "total_amount",
];

const UNKNOWN_ID: &str = "<unknown>";

const ID_DOMAIN: &str = "a non-empty identifier";
const TEXT_DOMAIN: &str = "a non-empty value";
const DATE_DOMAIN: &str = "a date (YYYY-MM-DD[ HH:MM[:SS]], RFC 3339 or DD/MM/YYYY)";
const HOUR_DOMAIN: &str = "an integer in [0, 23]";
const AGE_DOMAIN: &str = "a non-negative integer";
const QUANTITY_DOMAIN: &str = "a positive integer";
const DAYS_DOMAIN: &str = "a non-negative integer";
const DISCOUNT_DOMAIN: &str = "a number in [0, 100]";
const SATISFACTION_DOMAIN: &str = "an integer in [1, 5]";
const AMOUNT_DOMAIN: &str = "a finite non-negative number";

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

/// Parse a purchase timestamp in any accepted format.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.naive_local()))
}

/// Field reader bound to one row, so every error carries id and line.
struct FieldReader<'a> {
    row: &'a RawRow,
    id: &'a str,
}

impl<'a> FieldReader<'a> {
    fn error(&self, field: &str, expected: &str, value: &str) -> MalformedRecordError {
        MalformedRecordError::new(self.id, field, expected, value).at_line(self.row.line)
    }

    fn raw(&self, field: &str) -> &'a str {
        self.row.fields.get(field).map(|v| v.trim()).unwrap_or("")
    }

    fn text(&self, field: &str) -> Result<String, MalformedRecordError> {
        self.row
            .get(field)
            .map(str::to_string)
            .ok_or_else(|| self.error(field, TEXT_DOMAIN, ""))
    }

    fn integer<T: TryFrom<i64>>(&self, field: &str, expected: &str) -> Result<T, MalformedRecordError> {
        let raw = self.raw(field);
        parse_integral(raw)
            .and_then(|n| T::try_from(n).ok())
            .ok_or_else(|| self.error(field, expected, raw))
    }

    fn number(&self, field: &str, expected: &str) -> Result<f64, MalformedRecordError> {
        let raw = self.raw(field);
        raw.parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or_else(|| self.error(field, expected, raw))
    }

    fn timestamp(&self, field: &str) -> Result<NaiveDateTime, MalformedRecordError> {
        let raw = self.raw(field);
        parse_timestamp(raw).ok_or_else(|| self.error(field, DATE_DOMAIN, raw))
    }

    fn return_flag(&self, field: &str) -> Result<ReturnFlag, MalformedRecordError> {
        let raw = self.raw(field);
        ReturnFlag::from_token(raw).ok_or_else(|| self.error(field, ReturnFlag::DOMAIN, raw))
    }
}

/// Integers may be written as integral floats (`"4.0"`).
fn parse_integral(raw: &str) -> Option<i64> {
    if let Ok(n) = raw.parse::<i64>() {
        return Some(n);
    }
    let f = raw.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

impl TransactionRecord {
    /// Build a record from a raw row, checking every field's domain.
    pub fn from_row(row: &RawRow) -> Result<Self, MalformedRecordError> {
        let id = row.get("transaction_id").unwrap_or(UNKNOWN_ID);
        if id == UNKNOWN_ID {
            return Err(MalformedRecordError::new(UNKNOWN_ID, "transaction_id", ID_DOMAIN, "").at_line(row.line));
        }

        let f = FieldReader { row, id };

        let record = TransactionRecord {
            transaction_id: id.to_string(),
            purchase_date: f.timestamp("purchase_date")?,
            purchase_hour: f.integer("purchase_hour", HOUR_DOMAIN)?,
            customer_age: f.integer("customer_age", AGE_DOMAIN)?,
            customer_gender: f.text("customer_gender")?,
            product_category: f.text("product_category")?,
            product_price: f.number("product_price", AMOUNT_DOMAIN)?,
            quantity: f.integer("quantity", QUANTITY_DOMAIN)?,
            discount_applied: f.number("discount_applied", DISCOUNT_DOMAIN)?,
            shipping_cost: f.number("shipping_cost", AMOUNT_DOMAIN)?,
            delivery_days: f.integer("delivery_days", DAYS_DOMAIN)?,
            payment_method: f.text("payment_method")?,
            customer_satisfaction: f.integer("customer_satisfaction", SATISFACTION_DOMAIN)?,
            return_flag: f.return_flag("return_flag")?,
            total_amount: f.number("total_amount", AMOUNT_DOMAIN)?,
        };

        record.validate().map_err(|e| e.at_line(row.line))?;
        Ok(record)
    }

    /// Check the declared domains of an already-typed record.
    pub fn validate(&self) -> Result<(), MalformedRecordError> {
        let id = self.transaction_id.trim();
        if id.is_empty() {
            return Err(MalformedRecordError::new(UNKNOWN_ID, "transaction_id", ID_DOMAIN, &self.transaction_id));
        }
        let err = |field: &str, expected: &str, value: String| MalformedRecordError::new(id, field, expected, value);

        if self.purchase_hour > 23 {
            return Err(err("purchase_hour", HOUR_DOMAIN, self.purchase_hour.to_string()));
        }
        if !(1..=5).contains(&self.customer_satisfaction) {
            return Err(err("customer_satisfaction", SATISFACTION_DOMAIN, self.customer_satisfaction.to_string()));
        }
        if self.quantity == 0 {
            return Err(err("quantity", QUANTITY_DOMAIN, self.quantity.to_string()));
        }
        if !(0.0..=100.0).contains(&self.discount_applied) {
            return Err(err("discount_applied", DISCOUNT_DOMAIN, self.discount_applied.to_string()));
        }

        for (field, value) in [
            ("product_price", self.product_price),
            ("shipping_cost", self.shipping_cost),
            ("total_amount", self.total_amount),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(err(field, AMOUNT_DOMAIN, value.to_string()));
            }
        }

        for (field, value) in [
            ("customer_gender", &self.customer_gender),
            ("product_category", &self.product_category),
            ("payment_method", &self.payment_method),
        ] {
            if value.trim().is_empty() {
                return Err(err(field, TEXT_DOMAIN, value.clone()));
            }
        }

        Ok(())
    }
}
