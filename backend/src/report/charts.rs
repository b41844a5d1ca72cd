//! Chart datasets.
//!
//! Each chart of the analysis is emitted as data (bins, series, box
//! statistics) in one dashboard document; drawing is left to whatever
//! consumes it.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::aggregation::outliers::IqrBounds;
use crate::aggregation::stats::{quantile_sorted, sorted};
use crate::aggregation::{column_values, Aggregates};
use crate::models::{AugmentedRecord, NumericColumn};

const AGE_BINS: usize = 20;
const AMOUNT_BINS: usize = 30;

/// One histogram bucket, `[start, end)` except the last which is closed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Box-and-whisker statistics for one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub label: String,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

/// Chart payloads.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartData {
    Histogram { bins: Vec<HistogramBin> },
    Bar { labels: Vec<String>, values: Vec<f64> },
    Line { x: Vec<String>, y: Vec<f64> },
    Scatter { x: Vec<f64>, y: Vec<f64>, color: Option<Vec<f64>> },
    Pie { labels: Vec<String>, values: Vec<f64> },
    Heatmap { labels: Vec<String>, values: Vec<Vec<f64>> },
    BoxPlot { groups: Vec<BoxStats> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub id: &'static str,
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    #[serde(flatten)]
    pub data: ChartData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub title: &'static str,
    pub charts: Vec<Chart>,
}

impl Dashboard {
    pub fn chart(&self, id: &str) -> Option<&Chart> {
        self.charts.iter().find(|c| c.id == id)
    }
}

/// Equal-width bins spanning `[min, max]`.
///
/// A column without spread gets one unit-wide range centred on its value.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let s = sorted(values);
    let (mut lo, mut hi) = (s[0], s[s.len() - 1]);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;

    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            start: lo + width * i as f64,
            end: if i + 1 == bins { hi } else { lo + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();

    for v in values {
        let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

/// Quartiles, whiskers (most extreme values inside the IQR fences) and
/// the points beyond them.
pub fn box_stats(label: impl Into<String>, values: &[f64]) -> BoxStats {
    let s = sorted(values);
    let bounds = IqrBounds::from_values(&s);
    let inside: Vec<f64> = s.iter().copied().filter(|v| !bounds.is_outlier(*v)).collect();

    BoxStats {
        label: label.into(),
        q1: bounds.q1,
        median: quantile_sorted(&s, 0.5),
        q3: bounds.q3,
        lower_whisker: inside.first().copied().unwrap_or(f64::NAN),
        upper_whisker: inside.last().copied().unwrap_or(f64::NAN),
        outliers: s.iter().copied().filter(|v| bounds.is_outlier(*v)).collect(),
    }
}

fn month_abbrev(month: u32) -> &'static str {
    const MONTHS: [&str; 12] = ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"];
    MONTHS.get(month.wrapping_sub(1) as usize).copied().unwrap_or("?")
}

/// Assemble every chart of the analysis.
pub fn build_dashboard(table: &[AugmentedRecord], agg: &Aggregates) -> Dashboard {
    let mut charts = Vec::new();

    charts.push(Chart {
        id: "age_distribution",
        title: "Customer Age Distribution",
        x_label: "Age",
        y_label: "Frequency",
        data: ChartData::Histogram { bins: histogram(&column_values(table, NumericColumn::CustomerAge), AGE_BINS) },
    });

    charts.push(Chart {
        id: "amount_distribution",
        title: "Transaction Amount Distribution",
        x_label: "Total Amount",
        y_label: "Frequency",
        data: ChartData::Histogram { bins: histogram(&column_values(table, NumericColumn::TotalAmount), AMOUNT_BINS) },
    });

    // Horizontal bar, smallest first
    let mut by_category = agg.revenue_by_category.clone();
    by_category.reverse();
    charts.push(Chart {
        id: "revenue_by_category",
        title: "Total Sales by Product Category",
        x_label: "Total Sales",
        y_label: "Category",
        data: ChartData::Bar {
            labels: by_category.iter().map(|v| v.key.clone()).collect(),
            values: by_category.iter().map(|v| v.value).collect(),
        },
    });

    charts.push(Chart {
        id: "monthly_revenue",
        title: "Sales by Month",
        x_label: "Month",
        y_label: "Total Sales",
        data: ChartData::Line {
            x: agg.revenue_by_month.iter().map(|v| month_abbrev(v.key).to_string()).collect(),
            y: agg.revenue_by_month.iter().map(|v| v.value).collect(),
        },
    });

    charts.push(Chart {
        id: "price_vs_satisfaction",
        title: "Product Price vs Customer Satisfaction",
        x_label: "Product Price",
        y_label: "Customer Satisfaction (1-5)",
        data: ChartData::Scatter {
            x: column_values(table, NumericColumn::ProductPrice),
            y: column_values(table, NumericColumn::CustomerSatisfaction),
            color: Some(column_values(table, NumericColumn::DiscountApplied)),
        },
    });

    charts.push(Chart {
        id: "correlation_heatmap",
        title: "Correlation Matrix - Numeric Variables",
        x_label: "",
        y_label: "",
        data: ChartData::Heatmap {
            labels: agg.correlation.columns.iter().map(|c| c.name().to_string()).collect(),
            values: agg.correlation.values.clone(),
        },
    });

    let mut satisfaction_by_category: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for row in table {
        satisfaction_by_category
            .entry(row.record.product_category.as_str())
            .or_default()
            .push(row.record.customer_satisfaction as f64);
    }
    charts.push(Chart {
        id: "satisfaction_by_category",
        title: "Customer Satisfaction by Category",
        x_label: "Product Category",
        y_label: "Customer Satisfaction",
        data: ChartData::BoxPlot {
            groups: satisfaction_by_category
                .into_iter()
                .map(|(label, values)| box_stats(label, &values))
                .collect(),
        },
    });

    charts.push(Chart {
        id: "daily_revenue",
        title: "Daily Sales",
        x_label: "Date",
        y_label: "Total Sales",
        data: ChartData::Line {
            x: agg.daily_sales.iter().map(|d| d.date.to_string()).collect(),
            y: agg.daily_sales.iter().map(|d| d.revenue).collect(),
        },
    });

    charts.push(Chart {
        id: "daily_transactions",
        title: "Daily Transactions",
        x_label: "Date",
        y_label: "Transactions",
        data: ChartData::Line {
            x: agg.daily_sales.iter().map(|d| d.date.to_string()).collect(),
            y: agg.daily_sales.iter().map(|d| d.transactions as f64).collect(),
        },
    });

    charts.push(Chart {
        id: "hourly_revenue",
        title: "Sales by Hour of Day",
        x_label: "Hour",
        y_label: "Total Sales",
        data: ChartData::Bar {
            labels: agg.revenue_by_hour.iter().map(|v| v.key.to_string()).collect(),
            values: agg.revenue_by_hour.iter().map(|v| v.value).collect(),
        },
    });

    charts.push(Chart {
        id: "time_period_share",
        title: "Transactions by Time Period",
        x_label: "",
        y_label: "",
        data: ChartData::Pie {
            labels: agg.time_periods.iter().map(|c| c.key.label().to_string()).collect(),
            values: agg.time_periods.iter().map(|c| c.count as f64).collect(),
        },
    });

    charts.push(Chart {
        id: "satisfaction_by_payment",
        title: "Average Satisfaction by Payment Method",
        x_label: "Payment Method",
        y_label: "Average Satisfaction",
        data: ChartData::Bar {
            labels: agg.satisfaction_by_payment.iter().map(|v| v.key.clone()).collect(),
            values: agg.satisfaction_by_payment.iter().map(|v| v.value).collect(),
        },
    });

    let mut delivery = agg.delivery_returns.clone();
    delivery.sort_by_key(|d| d.delivery_days);
    charts.push(Chart {
        id: "delivery_return_rate",
        title: "Return Rate vs Delivery Days",
        x_label: "Delivery Days",
        y_label: "Return Rate (%)",
        data: ChartData::Scatter {
            x: delivery.iter().map(|d| d.delivery_days as f64).collect(),
            y: delivery.iter().map(|d| d.return_rate).collect(),
            color: None,
        },
    });

    Dashboard {
        title: "E-commerce Analytics Dashboard",
        charts,
    }
}
