//! Group-by rollups over the augmented table.
//!
//! ```text
//! Augmented rows                     Groups (key-sorted)
//! ┌─────────────────────────┐       ┌──────────────────────────────┐
//! │ Electronics, 100, kept  │       │ Clothing:    n=1, rev=30     │
//! │ Electronics,  50, ret.  │  →    │ Electronics: n=2, rev=150,   │
//! │ Clothing,     30, kept  │       │              returned=1      │
//! └─────────────────────────┘       └──────────────────────────────┘
//! ```
//!
//! Only keys that occur in the table produce a group, so every group has
//! at least one row and per-group rates never divide by zero.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{AgeGroup, AugmentedRecord, CategoricalColumn};

/// Running totals for one group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupTotals {
    pub count: usize,
    pub revenue: f64,
    pub satisfaction: f64,
    pub returned: usize,
    pub margin: f64,
    pub discount: f64,
}

impl GroupTotals {
    fn add(&mut self, row: &AugmentedRecord) {
        self.count += 1;
        self.revenue += row.record.total_amount;
        self.satisfaction += row.record.customer_satisfaction as f64;
        self.margin += row.margin;
        self.discount += row.record.discount_applied;
        if row.record.return_flag.is_returned() {
            self.returned += 1;
        }
    }

    pub fn avg_ticket(&self) -> f64 {
        self.revenue / self.count as f64
    }

    pub fn avg_satisfaction(&self) -> f64 {
        self.satisfaction / self.count as f64
    }

    /// Returned share of the group, in percent.
    pub fn return_rate(&self) -> f64 {
        self.returned as f64 / self.count as f64 * 100.0
    }

    pub fn avg_margin(&self) -> f64 {
        self.margin / self.count as f64
    }

    pub fn avg_discount(&self) -> f64 {
        self.discount / self.count as f64
    }
}

/// Accumulate totals per key; keys come back sorted.
pub fn group_by<K, F>(table: &[AugmentedRecord], key: F) -> BTreeMap<K, GroupTotals>
where
    K: Ord,
    F: Fn(&AugmentedRecord) -> K,
{
    let mut groups: BTreeMap<K, GroupTotals> = BTreeMap::new();
    for row in table {
        groups.entry(key(row)).or_default().add(row);
    }
    groups
}

// =============================================================================
// Output shapes
// =============================================================================

/// A group key with one measure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyedValue<K> {
    pub key: K,
    pub value: f64,
}

/// A group key with a row count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyedCount<K> {
    pub key: K,
    pub count: usize,
}

/// Project each group to one measure, in key order.
pub fn measure<K: Clone>(groups: &BTreeMap<K, GroupTotals>, f: impl Fn(&GroupTotals) -> f64) -> Vec<KeyedValue<K>> {
    groups
        .iter()
        .map(|(key, totals)| KeyedValue {
            key: key.clone(),
            value: f(totals),
        })
        .collect()
}

/// Stable descending sort by value; equal values keep their key order.
pub fn sort_desc<K>(mut values: Vec<KeyedValue<K>>) -> Vec<KeyedValue<K>> {
    values.sort_by(|a, b| b.value.total_cmp(&a.value));
    values
}

/// Stable descending sort by count.
pub fn sort_counts_desc<K>(mut counts: Vec<KeyedCount<K>>) -> Vec<KeyedCount<K>> {
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Row counts per key, most frequent first (ties in key order).
pub fn counts<K: Clone>(groups: &BTreeMap<K, GroupTotals>) -> Vec<KeyedCount<K>> {
    sort_counts_desc(
        groups
            .iter()
            .map(|(key, totals)| KeyedCount {
                key: key.clone(),
                count: totals.count,
            })
            .collect(),
    )
}

// =============================================================================
// Named rollups
// =============================================================================

/// Returned transactions per category; categories without returns are omitted.
pub fn returns_by_category(table: &[AugmentedRecord]) -> Vec<KeyedCount<String>> {
    let returned: Vec<AugmentedRecord> = table
        .iter()
        .filter(|r| r.record.return_flag.is_returned())
        .cloned()
        .collect();
    group_by(&returned, |r| r.record.product_category.clone())
        .into_iter()
        .map(|(key, totals)| KeyedCount { key, count: totals.count })
        .collect()
}

/// Value counts of one categorical column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalCounts {
    pub column: CategoricalColumn,
    pub counts: Vec<KeyedCount<String>>,
}

pub fn value_counts(table: &[AugmentedRecord], column: CategoricalColumn) -> CategoricalCounts {
    let groups = group_by(table, |r| r.record.categorical(column).to_string());
    CategoricalCounts {
        column,
        counts: counts(&groups),
    }
}

/// Return behaviour per delivery time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryReturnRate {
    pub delivery_days: u32,
    /// Percent of the group's transactions that were returned.
    pub return_rate: f64,
    pub transactions: usize,
}

/// Delivery-time groups, highest return rate first.
pub fn delivery_return_rates(table: &[AugmentedRecord]) -> Vec<DeliveryReturnRate> {
    let mut rates: Vec<DeliveryReturnRate> = group_by(table, |r| r.record.delivery_days)
        .into_iter()
        .map(|(delivery_days, totals)| DeliveryReturnRate {
            delivery_days,
            return_rate: totals.return_rate(),
            transactions: totals.count,
        })
        .collect();
    rates.sort_by(|a, b| b.return_rate.total_cmp(&a.return_rate));
    rates
}

/// One (age group, gender) customer segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemographicProfile {
    pub age_group: AgeGroup,
    pub gender: String,
    pub total_revenue: f64,
    pub avg_ticket: f64,
    pub transactions: usize,
    pub avg_satisfaction: f64,
}

/// Segments by total revenue, highest first.
pub fn demographic_profiles(table: &[AugmentedRecord]) -> Vec<DemographicProfile> {
    let mut profiles: Vec<DemographicProfile> = group_by(table, |r| (r.age_group, r.record.customer_gender.clone()))
        .into_iter()
        .map(|((age_group, gender), totals)| DemographicProfile {
            age_group,
            gender,
            total_revenue: totals.revenue,
            avg_ticket: totals.avg_ticket(),
            transactions: totals.count,
            avg_satisfaction: totals.avg_satisfaction(),
        })
        .collect();
    profiles.sort_by(|a, b| b.total_revenue.total_cmp(&a.total_revenue));
    profiles
}

/// Margin picture of one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryMargin {
    pub category: String,
    pub avg_margin: f64,
    pub avg_discount: f64,
    pub total_revenue: f64,
}

/// Categories by mean margin, highest first.
pub fn category_margins(table: &[AugmentedRecord]) -> Vec<CategoryMargin> {
    let mut margins: Vec<CategoryMargin> = group_by(table, |r| r.record.product_category.clone())
        .into_iter()
        .map(|(category, totals)| CategoryMargin {
            category,
            avg_margin: totals.avg_margin(),
            avg_discount: totals.avg_discount(),
            total_revenue: totals.revenue,
        })
        .collect();
    margins.sort_by(|a, b| b.avg_margin.total_cmp(&a.avg_margin));
    margins
}

/// Revenue and volume of one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySales {
    pub date: NaiveDate,
    pub revenue: f64,
    pub transactions: usize,
}

/// Per-day series in date order.
pub fn daily_sales(table: &[AugmentedRecord]) -> Vec<DailySales> {
    group_by(table, |r| r.record.purchase_date.date())
        .into_iter()
        .map(|(date, totals)| DailySales {
            date,
            revenue: totals.revenue,
            transactions: totals.count,
        })
        .collect()
}
