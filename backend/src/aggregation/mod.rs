//! Aggregation stage: the augmented table to a fixed set of named aggregates.
//!
//! Every aggregate is an independent pure reduction over the table. The
//! first failure aborts the whole aggregation.
//!
//! - [`stats`] - means, quantiles, Pearson, describe
//! - [`outliers`] - IQR fences
//! - [`correlation`] - correlation matrix and pair ranking
//! - [`grouping`] - group-by rollups

pub mod correlation;
pub mod grouping;
pub mod outliers;
pub mod stats;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{AnalysisError, AnalysisResult};
use crate::models::{AugmentedRecord, CategoricalColumn, NumericColumn, TimePeriod};

pub use correlation::{CorrelationDriver, CorrelationMatrix, CorrelationPair};
pub use grouping::{
    CategoricalCounts, CategoryMargin, DailySales, DeliveryReturnRate, DemographicProfile, GroupTotals, KeyedCount,
    KeyedValue,
};
pub use outliers::{IqrBounds, OutlierSummary};
pub use stats::ColumnSummary;

use grouping::{group_by, measure, sort_desc};

/// Number of ranked correlation pairs, months and hours reported.
pub const TOP_N: usize = 3;

/// Headline numbers of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total_transactions: usize,
    pub total_revenue: f64,
    pub avg_ticket: f64,
    pub avg_satisfaction: f64,
    /// Percent of all transactions that were returned.
    pub return_rate: f64,
    pub top_category: String,
    pub top_month: String,
    pub peak_hour: u8,
}

/// Every aggregate of one run, keyed by name when serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregates {
    pub summary: SummaryStats,
    pub descriptive: Vec<ColumnSummary>,
    pub outliers: Vec<OutlierSummary>,
    pub value_counts: Vec<CategoricalCounts>,
    pub revenue_by_category: Vec<KeyedValue<String>>,
    pub satisfaction_by_category: Vec<KeyedValue<String>>,
    pub returns_by_category: Vec<KeyedCount<String>>,
    pub revenue_by_month: Vec<KeyedValue<u32>>,
    pub revenue_by_month_name: Vec<KeyedValue<String>>,
    pub revenue_by_hour: Vec<KeyedValue<u8>>,
    pub top_hours: Vec<KeyedValue<u8>>,
    pub delivery_returns: Vec<DeliveryReturnRate>,
    pub delivery_return_correlation: f64,
    pub correlation: CorrelationMatrix,
    pub top_correlations: Vec<CorrelationPair>,
    pub satisfaction_drivers: Vec<CorrelationDriver>,
    pub demographic_profiles: Vec<DemographicProfile>,
    pub category_margins: Vec<CategoryMargin>,
    pub time_periods: Vec<KeyedCount<TimePeriod>>,
    pub satisfaction_by_payment: Vec<KeyedValue<String>>,
    pub daily_sales: Vec<DailySales>,
}

impl Aggregates {
    /// Aggregate name to value, as handed to reporting adapters.
    pub fn to_mapping(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Ok(Map::from_iter([("aggregates".to_string(), other)])),
        }
    }
}

/// Values of one numeric column, in table order.
pub fn column_values(table: &[AugmentedRecord], column: NumericColumn) -> Vec<f64> {
    table.iter().map(|r| r.record.numeric(column)).collect()
}

/// Key of the first entry, or a degenerate-aggregate error.
fn first_key<K: Clone>(ranked: &[KeyedValue<K>], aggregate: &'static str) -> AnalysisResult<K> {
    ranked
        .first()
        .map(|v| v.key.clone())
        .ok_or(AnalysisError::DegenerateAggregate { aggregate })
}

/// Headline numbers of the table.
pub fn summary_stats(table: &[AugmentedRecord]) -> AnalysisResult<SummaryStats> {
    if table.is_empty() {
        return Err(AnalysisError::EmptyInput);
    }

    let overall = group_by(table, |_| ()).remove(&()).unwrap_or_default();

    let by_category = sort_desc(measure(&group_by(table, |r| r.record.product_category.clone()), |t| t.revenue));
    // Keyed by name: equal revenue resolves alphabetically
    let by_month_name = sort_desc(measure(&group_by(table, |r| r.purchase_month_name.clone()), |t| t.revenue));
    let by_hour = sort_desc(measure(&group_by(table, |r| r.record.purchase_hour), |t| t.revenue));

    Ok(SummaryStats {
        total_transactions: overall.count,
        total_revenue: overall.revenue,
        avg_ticket: overall.avg_ticket(),
        avg_satisfaction: overall.avg_satisfaction(),
        return_rate: overall.return_rate(),
        top_category: first_key(&by_category, "top_category")?,
        top_month: first_key(&by_month_name, "top_month")?,
        peak_hour: first_key(&by_hour, "peak_hour")?,
    })
}

/// Compute every aggregate over the augmented table.
pub fn aggregate(table: &[AugmentedRecord]) -> AnalysisResult<Aggregates> {
    let summary = summary_stats(table)?;

    let columns: Vec<Vec<f64>> = NumericColumn::ALL.iter().map(|c| column_values(table, *c)).collect();

    let descriptive = NumericColumn::ALL
        .iter()
        .zip(&columns)
        .map(|(c, values)| stats::describe(*c, values))
        .collect();

    let outliers = NumericColumn::ALL
        .iter()
        .zip(&columns)
        .map(|(c, values)| outliers::outlier_summary(*c, values))
        .collect();

    let value_counts = CategoricalColumn::ALL
        .iter()
        .map(|c| grouping::value_counts(table, *c))
        .collect();

    let by_category = group_by(table, |r| r.record.product_category.clone());
    let by_month = group_by(table, |r| r.purchase_month);
    let by_month_name = group_by(table, |r| r.purchase_month_name.clone());
    let by_hour = group_by(table, |r| r.record.purchase_hour);
    let by_period = group_by(table, |r| r.time_period);
    let by_payment = group_by(table, |r| r.record.payment_method.clone());

    let revenue_by_month_name = sort_desc(measure(&by_month_name, |t| t.revenue));

    let revenue_by_hour = measure(&by_hour, |t| t.revenue);
    let mut top_hours = sort_desc(revenue_by_hour.clone());
    top_hours.truncate(TOP_N);

    let correlation = CorrelationMatrix::compute(&NumericColumn::ALL, &columns);
    let top_correlations = correlation.top_pairs(TOP_N);
    let satisfaction_drivers = correlation.drivers_of(NumericColumn::CustomerSatisfaction);

    let returned: Vec<f64> = table
        .iter()
        .map(|r| if r.record.return_flag.is_returned() { 1.0 } else { 0.0 })
        .collect();
    let delivery_return_correlation = stats::pearson(&column_values(table, NumericColumn::DeliveryDays), &returned);

    Ok(Aggregates {
        summary,
        descriptive,
        outliers,
        value_counts,
        revenue_by_category: sort_desc(measure(&by_category, |t| t.revenue)),
        satisfaction_by_category: sort_desc(measure(&by_category, |t| t.avg_satisfaction())),
        returns_by_category: grouping::returns_by_category(table),
        revenue_by_month: measure(&by_month, |t| t.revenue),
        revenue_by_month_name,
        revenue_by_hour,
        top_hours,
        delivery_returns: grouping::delivery_return_rates(table),
        delivery_return_correlation,
        correlation,
        top_correlations,
        satisfaction_drivers,
        demographic_profiles: grouping::demographic_profiles(table),
        category_margins: grouping::category_margins(table),
        time_periods: grouping::counts(&by_period),
        satisfaction_by_payment: measure(&by_payment, |t| t.avg_satisfaction()),
        daily_sales: grouping::daily_sales(table),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derivation::derive;
    use crate::models::{ReturnFlag, TransactionRecord};
    use chrono::NaiveDate;

    fn tx(id: &str, category: &str, amount: f64, satisfaction: u8, returned: bool) -> TransactionRecord {
        TransactionRecord {
            transaction_id: id.to_string(),
            purchase_date: NaiveDate::from_ymd_opt(2024, 4, 3).unwrap().and_hms_opt(0, 0, 0).unwrap(),
            purchase_hour: 20,
            customer_age: 28,
            customer_gender: "F".to_string(),
            product_category: category.to_string(),
            product_price: amount,
            quantity: 1,
            discount_applied: 0.0,
            shipping_cost: 0.0,
            delivery_days: 3,
            payment_method: "Card".to_string(),
            customer_satisfaction: satisfaction,
            return_flag: if returned { ReturnFlag::Returned } else { ReturnFlag::Kept },
            total_amount: amount,
        }
    }

    fn scenario() -> Vec<AugmentedRecord> {
        derive(&[
            tx("1", "Electronics", 100.0, 5, false),
            tx("2", "Electronics", 50.0, 3, true),
            tx("3", "Clothing", 30.0, 4, false),
        ])
        .unwrap()
    }

    #[test]
    fn test_three_record_scenario() {
        let agg = aggregate(&scenario()).unwrap();

        assert_eq!(agg.revenue_by_category.len(), 2);
        assert_eq!(agg.revenue_by_category[0].key, "Electronics");
        assert!((agg.revenue_by_category[0].value - 150.0).abs() < 1e-9);
        assert_eq!(agg.revenue_by_category[1].key, "Clothing");
        assert!((agg.revenue_by_category[1].value - 30.0).abs() < 1e-9);

        assert!((agg.summary.return_rate - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(agg.summary.total_transactions, 3);
        assert!((agg.summary.total_revenue - 180.0).abs() < 1e-9);
        assert!((agg.summary.avg_ticket - 60.0).abs() < 1e-9);
        assert!((agg.summary.avg_satisfaction - 4.0).abs() < 1e-9);
        assert_eq!(agg.summary.top_category, "Electronics");
        assert_eq!(agg.summary.top_month, "April");
        assert_eq!(agg.summary.peak_hour, 20);
    }

    #[test]
    fn test_per_category_means_and_returns() {
        let agg = aggregate(&scenario()).unwrap();

        let clothing = agg.satisfaction_by_category.iter().find(|v| v.key == "Clothing").unwrap();
        let electronics = agg.satisfaction_by_category.iter().find(|v| v.key == "Electronics").unwrap();
        assert!((clothing.value - 4.0).abs() < 1e-9);
        assert!((electronics.value - 4.0).abs() < 1e-9);

        assert_eq!(agg.returns_by_category.len(), 1);
        assert_eq!(agg.returns_by_category[0].key, "Electronics");
    }

    #[test]
    fn test_top_month_ties_resolve_alphabetically() {
        let mut february = tx("F", "Books", 40.0, 4, false);
        february.purchase_date = NaiveDate::from_ymd_opt(2024, 2, 7).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let april = tx("A", "Books", 40.0, 4, false);

        let agg = aggregate(&derive(&[february, april]).unwrap()).unwrap();

        assert_eq!(agg.summary.top_month, "April");
        let names: Vec<&str> = agg.revenue_by_month_name.iter().map(|v| v.key.as_str()).collect();
        assert_eq!(names, ["April", "February"]);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(aggregate(&[]).unwrap_err(), AnalysisError::EmptyInput);
    }

    #[test]
    fn test_first_key_on_empty_ranking() {
        let empty: Vec<KeyedValue<String>> = Vec::new();
        let err = first_key(&empty, "top_category").unwrap_err();
        assert_eq!(err, AnalysisError::DegenerateAggregate { aggregate: "top_category" });
    }

    #[test]
    fn test_input_table_not_mutated() {
        let table = scenario();
        let before = table.clone();
        let _ = aggregate(&table).unwrap();
        assert_eq!(table, before);
    }

    #[test]
    fn test_mapping_has_named_aggregates() {
        let map = aggregate(&scenario()).unwrap().to_mapping().unwrap();
        for name in ["summary", "revenue_by_category", "outliers", "correlation", "top_correlations", "delivery_returns"] {
            assert!(map.contains_key(name), "missing {name}");
        }
    }
}
