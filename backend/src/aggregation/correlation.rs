//! Pearson correlation matrix and pair ranking over the numeric columns.

use serde::Serialize;
use std::cmp::Ordering;

use super::stats::{has_variance, pearson};
use crate::models::NumericColumn;

/// Decimal places compared when ranking, so that summation order
/// (and therefore row order) cannot reorder near-ties.
const RANK_PRECISION: f64 = 1e12;

/// Square, symmetric correlation matrix in declared column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<NumericColumn>,
    /// Row-major; `NaN` (serialized as `null`) where undefined.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Build the matrix from one value vector per column.
    ///
    /// Diagonal entries are exactly 1 for columns with spread, `NaN`
    /// otherwise. Each off-diagonal pair is computed once and mirrored.
    pub fn compute(columns: &[NumericColumn], data: &[Vec<f64>]) -> Self {
        let n = columns.len();
        let mut values = vec![vec![f64::NAN; n]; n];

        for i in 0..n {
            values[i][i] = if has_variance(&data[i]) { 1.0 } else { f64::NAN };
            for j in (i + 1)..n {
                let r = pearson(&data[i], &data[j]);
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        Self {
            columns: columns.to_vec(),
            values,
        }
    }

    fn index(&self, column: NumericColumn) -> Option<usize> {
        self.columns.iter().position(|c| *c == column)
    }

    /// Coefficient between two columns, if both are in the matrix.
    pub fn get(&self, a: NumericColumn, b: NumericColumn) -> Option<f64> {
        Some(self.values[self.index(a)?][self.index(b)?])
    }

    /// Every `i < j` pair in declared order.
    pub fn pairs(&self) -> Vec<CorrelationPair> {
        let n = self.columns.len();
        let mut out = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for i in 0..n {
            for j in (i + 1)..n {
                out.push(CorrelationPair::new(self.columns[i], self.columns[j], self.values[i][j]));
            }
        }
        out
    }

    /// The `n` pairs with the largest absolute coefficient.
    ///
    /// Stable: equal magnitudes keep declared-pair order; `NaN` ranks last.
    pub fn top_pairs(&self, n: usize) -> Vec<CorrelationPair> {
        let mut pairs = self.pairs();
        pairs.sort_by(|a, b| compare_magnitude_desc(a.coefficient, b.coefficient));
        pairs.truncate(n);
        pairs
    }

    /// `|r|` of every other column against `target`, strongest first.
    pub fn drivers_of(&self, target: NumericColumn) -> Vec<CorrelationDriver> {
        let Some(t) = self.index(target) else {
            return Vec::new();
        };
        let mut drivers: Vec<CorrelationDriver> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != t)
            .map(|(i, column)| CorrelationDriver {
                column: *column,
                strength: self.values[i][t].abs(),
            })
            .collect();
        drivers.sort_by(|a, b| compare_magnitude_desc(a.strength, b.strength));
        drivers
    }
}

fn rank_key(r: f64) -> f64 {
    if r.is_nan() {
        -1.0
    } else {
        (r.abs() * RANK_PRECISION).round() / RANK_PRECISION
    }
}

fn compare_magnitude_desc(a: f64, b: f64) -> Ordering {
    rank_key(b).total_cmp(&rank_key(a))
}

/// One ranked column pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationPair {
    pub left: NumericColumn,
    pub right: NumericColumn,
    pub coefficient: f64,
    /// Business reading of the pair.
    pub relevance: &'static str,
}

impl CorrelationPair {
    pub fn new(left: NumericColumn, right: NumericColumn, coefficient: f64) -> Self {
        Self {
            left,
            right,
            coefficient,
            relevance: relevance(left, right),
        }
    }
}

/// Strength of one column's relation to a target column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationDriver {
    pub column: NumericColumn,
    pub strength: f64,
}

/// Business interpretation of a known column pair.
pub fn relevance(left: NumericColumn, right: NumericColumn) -> &'static str {
    use NumericColumn::*;
    match (left, right) {
        (ProductPrice, TotalAmount) => "Higher unit prices drive higher revenue per transaction",
        (Quantity, TotalAmount) => "Buying more units raises the total value of the sale",
        (DeliveryDays, CustomerSatisfaction) => "Faster deliveries improve customer satisfaction",
        (DiscountApplied, CustomerSatisfaction) => "Discounts may shape the customer's perception of value",
        _ => "This correlation needs deeper analysis before a business reading",
    }
}
