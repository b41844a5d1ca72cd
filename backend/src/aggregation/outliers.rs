//! IQR outlier detection.
//!
//! Bounds are `[Q1 - 1.5 IQR, Q3 + 1.5 IQR]`, inclusive: a value sitting
//! exactly on a bound is not an outlier.

use serde::Serialize;

use super::stats::{quantile_sorted, sorted};
use crate::models::NumericColumn;

/// Fence multiplier applied to the interquartile range.
pub const IQR_MULTIPLIER: f64 = 1.5;

/// Quartiles and fences of one column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IqrBounds {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower: f64,
    pub upper: f64,
}

impl IqrBounds {
    /// Fences for an arbitrary pair of quartiles.
    pub fn from_quartiles(q1: f64, q3: f64) -> Self {
        let iqr = q3 - q1;
        Self {
            q1,
            q3,
            iqr,
            lower: q1 - IQR_MULTIPLIER * iqr,
            upper: q3 + IQR_MULTIPLIER * iqr,
        }
    }

    /// Fences computed from a column's values.
    pub fn from_values(values: &[f64]) -> Self {
        let s = sorted(values);
        Self::from_quartiles(quantile_sorted(&s, 0.25), quantile_sorted(&s, 0.75))
    }

    /// Strictly outside the fences.
    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.lower || value > self.upper
    }
}

/// Outlier count of one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierSummary {
    pub column: NumericColumn,
    #[serde(flatten)]
    pub bounds: IqrBounds,
    pub outliers: usize,
    /// Share of all rows, in percent.
    pub percent: f64,
}

/// Count a column's outliers against its own fences.
pub fn outlier_summary(column: NumericColumn, values: &[f64]) -> OutlierSummary {
    let bounds = IqrBounds::from_values(values);
    let outliers = values.iter().filter(|v| bounds.is_outlier(**v)).count();
    let percent = if values.is_empty() {
        0.0
    } else {
        outliers as f64 / values.len() as f64 * 100.0
    };

    OutlierSummary {
        column,
        bounds,
        outliers,
        percent,
    }
}
