//! Headline findings, formatted for slides.

use serde::{Deserialize, Serialize};

use crate::aggregation::Aggregates;

/// Currency label appended to money amounts.
pub const CURRENCY: &str = "MXN";

/// Formatted headline figures of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentationFindings {
    pub total_sales: String,
    pub transactions: String,
    pub avg_ticket: String,
    pub avg_satisfaction: String,
    pub return_rate: String,
    pub top_category: String,
    pub top_month: String,
    pub peak_hour: String,
    pub profitable_profile: String,
    pub main_correlation: String,
}

impl PresentationFindings {
    pub fn from_aggregates(agg: &Aggregates) -> Self {
        let s = &agg.summary;

        let profitable_profile = agg
            .demographic_profiles
            .first()
            .map(|p| format!("{} / {}", p.age_group.label(), p.gender))
            .unwrap_or_else(|| "n/a".to_string());

        let main_correlation = agg
            .top_correlations
            .first()
            .map(|p| format!("{} vs {}: {:.3}", p.left.name(), p.right.name(), p.coefficient))
            .unwrap_or_else(|| "n/a".to_string());

        Self {
            total_sales: format_money(s.total_revenue),
            transactions: format_thousands(s.total_transactions as f64, 0),
            avg_ticket: format_money(s.avg_ticket),
            avg_satisfaction: format!("{:.2}/5", s.avg_satisfaction),
            return_rate: format!("{:.1}%", s.return_rate),
            top_category: s.top_category.clone(),
            top_month: s.top_month.clone(),
            peak_hour: s.peak_hour.to_string(),
            profitable_profile,
            main_correlation,
        }
    }
}

/// `1234567.891` with 2 decimals → `1,234,567.89`.
pub fn format_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && formatted.chars().any(|c| c != '0' && c != '.') { "-" } else { "" };
    match frac_part {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

/// `$1,234.50 MXN`
pub fn format_money(value: f64) -> String {
    format!("${} {}", format_thousands(value, 2), CURRENCY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0.0, 0), "0");
        assert_eq!(format_thousands(999.0, 0), "999");
        assert_eq!(format_thousands(1000.0, 0), "1,000");
        assert_eq!(format_thousands(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_thousands(-98765.4, 1), "-98,765.4");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(180.0), "$180.00 MXN");
        assert_eq!(format_money(12345.678), "$12,345.68 MXN");
    }
}
