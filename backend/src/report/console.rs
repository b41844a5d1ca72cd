//! Plain-text console report.
//!
//! Each report is a `Display` wrapper, so callers print it with `{}` or
//! collect it with `to_string()`.

use std::fmt;

use crate::aggregation::{Aggregates, CorrelationMatrix, TOP_N};
use crate::pipeline::AnalysisRun;
use crate::report::export::DERIVED_COLUMNS;
use crate::report::findings::format_money;

const RULE_WIDTH: usize = 70;
const PROFILES_SHOWN: usize = 5;

fn banner(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(f, "{}", title)?;
    writeln!(f, "{}", "=".repeat(RULE_WIDTH))
}

fn heading(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "{}", title)?;
    writeln!(f, "{}", "-".repeat(RULE_WIDTH))
}

/// Descriptive statistics, outlier counts and value counts.
pub struct DescribeReport<'a>(pub &'a Aggregates);

impl fmt::Display for DescribeReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let agg = self.0;

        writeln!(
            f,
            "{:<22} {:>6} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
            "column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
        )?;
        for s in &agg.descriptive {
            writeln!(
                f,
                "{:<22} {:>6} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2}",
                s.column.name(),
                s.count,
                s.mean,
                s.std,
                s.min,
                s.q25,
                s.median,
                s.q75,
                s.max
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Outliers (1.5 x IQR):")?;
        for o in &agg.outliers {
            writeln!(
                f,
                "  {:<22} {:>5} ({:.1}%)  fences [{:.2}, {:.2}]",
                o.column.name(),
                o.outliers,
                o.percent,
                o.bounds.lower,
                o.bounds.upper
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Value counts:")?;
        for vc in &agg.value_counts {
            let counts: Vec<String> = vc.counts.iter().map(|c| format!("{}={}", c.key, c.count)).collect();
            writeln!(f, "  {}: {}", vc.column.name(), counts.join(", "))?;
        }
        Ok(())
    }
}

/// Correlation matrix and the strongest pairs.
pub struct CorrelationReport<'a> {
    pub matrix: &'a CorrelationMatrix,
    pub top: usize,
}

impl fmt::Display for CorrelationReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.matrix;

        write!(f, "{:<22}", "")?;
        for c in &m.columns {
            write!(f, " {:>8}", abbreviate(c.name()))?;
        }
        writeln!(f)?;
        for (c, row) in m.columns.iter().zip(&m.values) {
            write!(f, "{:<22}", c.name())?;
            for v in row {
                write!(f, " {:>8.3}", v)?;
            }
            writeln!(f)?;
        }

        writeln!(f)?;
        writeln!(f, "Top {} correlations (by |r|):", self.top)?;
        for (i, pair) in m.top_pairs(self.top).iter().enumerate() {
            writeln!(f, "  {}. {} vs {}: {:.3}", i + 1, pair.left.name(), pair.right.name(), pair.coefficient)?;
            writeln!(f, "     {}", pair.relevance)?;
        }
        Ok(())
    }
}

fn abbreviate(name: &str) -> String {
    name.chars().take(8).collect()
}

/// The full console report of a run.
pub struct ConsoleReport<'a>(pub &'a AnalysisRun);

impl fmt::Display for ConsoleReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let run = self.0;
        let agg = &run.aggregates;
        let s = &agg.summary;

        banner(f, "E-COMMERCE TRANSACTION ANALYSIS")?;
        if let Some(source) = &run.source {
            writeln!(f, "Source: {}", source)?;
        }
        writeln!(f, "Run: {} ({})", run.run_id, run.generated_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
        writeln!(
            f,
            "Rows: {} | Columns: {} | Encoding: {} | Separator: {:?}",
            run.csv_info.row_count,
            run.csv_info.headers.len(),
            run.csv_info.encoding,
            run.csv_info.delimiter
        )?;

        heading(f, "1. DATA PREPARATION")?;
        writeln!(f, "Derived columns: {}", DERIVED_COLUMNS.join(", "))?;

        heading(f, "2. DESCRIPTIVE STATISTICS")?;
        write!(f, "{}", DescribeReport(agg))?;

        heading(f, "3. PRELIMINARY INSIGHTS")?;
        writeln!(f, "Sales by category:")?;
        for v in &agg.revenue_by_category {
            writeln!(f, "  {:<20} {:>22}", v.key, format_money(v.value))?;
        }
        writeln!(f, "Average satisfaction: {:.2}/5", s.avg_satisfaction)?;
        writeln!(f, "Satisfaction by category:")?;
        for v in &agg.satisfaction_by_category {
            writeln!(f, "  {:<20} {:.2}", v.key, v.value)?;
        }
        writeln!(f, "Return rate: {:.1}%", s.return_rate)?;
        writeln!(f, "Returns by category:")?;
        for c in &agg.returns_by_category {
            writeln!(f, "  {:<20} {}", c.key, c.count)?;
        }

        heading(f, "4. SIGNIFICANT CORRELATIONS")?;
        for (i, pair) in agg.top_correlations.iter().enumerate() {
            writeln!(f, "  {}. {} vs {}: {:.3}", i + 1, pair.left.name(), pair.right.name(), pair.coefficient)?;
            writeln!(f, "     {}", pair.relevance)?;
        }

        heading(f, "5. EXECUTIVE QUESTIONS")?;
        writeln!(f, "When do customers buy the most?")?;
        let months: Vec<String> = agg
            .revenue_by_month_name
            .iter()
            .take(TOP_N)
            .map(|v| format!("{} ({})", v.key, format_money(v.value)))
            .collect();
        writeln!(f, "  Top months: {}", months.join(", "))?;
        let hours: Vec<String> = agg
            .top_hours
            .iter()
            .map(|v| format!("{}:00 ({})", v.key, format_money(v.value)))
            .collect();
        writeln!(f, "  Top hours: {}", hours.join(", "))?;
        let periods: Vec<String> = agg.time_periods.iter().map(|c| format!("{}={}", c.key.label(), c.count)).collect();
        writeln!(f, "  By time period: {}", periods.join(", "))?;

        writeln!(f)?;
        writeln!(f, "Most profitable customer profiles:")?;
        for p in agg.demographic_profiles.iter().take(PROFILES_SHOWN) {
            writeln!(
                f,
                "  {:<6} {:<8} {:>22}  avg ticket {}  n={}  satisfaction {:.2}",
                p.age_group.label(),
                p.gender,
                format_money(p.total_revenue),
                format_money(p.avg_ticket),
                p.transactions,
                p.avg_satisfaction
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Margins by category:")?;
        for m in &agg.category_margins {
            writeln!(
                f,
                "  {:<20} avg margin {:>10.2}  avg discount {:>5.1}%  sales {}",
                m.category,
                m.avg_margin,
                m.avg_discount,
                format_money(m.total_revenue)
            )?;
        }

        writeln!(f)?;
        writeln!(f, "What drives satisfaction?")?;
        for d in &agg.satisfaction_drivers {
            writeln!(f, "  {:<22} {:.3}", d.column.name(), d.strength)?;
        }
        let payments: Vec<String> = agg
            .satisfaction_by_payment
            .iter()
            .map(|v| format!("{}={:.2}", v.key, v.value))
            .collect();
        writeln!(f, "  By payment method: {}", payments.join(", "))?;

        writeln!(f)?;
        writeln!(f, "Does delivery time affect returns?")?;
        writeln!(f, "  Correlation delivery_days vs returned: {:.3}", agg.delivery_return_correlation)?;
        for d in &agg.delivery_returns {
            writeln!(f, "  {:>3} days: {:>5.1}% returned (n={})", d.delivery_days, d.return_rate, d.transactions)?;
        }

        heading(f, "SUMMARY")?;
        let findings = &run.findings;
        for (label, value) in [
            ("Total sales", &findings.total_sales),
            ("Transactions", &findings.transactions),
            ("Average ticket", &findings.avg_ticket),
            ("Average satisfaction", &findings.avg_satisfaction),
            ("Return rate", &findings.return_rate),
            ("Top category", &findings.top_category),
            ("Top month", &findings.top_month),
            ("Peak hour", &findings.peak_hour),
            ("Most profitable profile", &findings.profitable_profile),
            ("Main correlation", &findings.main_correlation),
        ] {
            writeln!(f, "  {:<24} {}", label, value)?;
        }
        writeln!(f, "{}", "=".repeat(RULE_WIDTH))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{analyze_bytes, AnalyzeOptions};

    fn run() -> AnalysisRun {
        let csv = "transaction_id,purchase_date,purchase_hour,customer_age,customer_gender,product_category,product_price,quantity,discount_applied,shipping_cost,delivery_days,payment_method,customer_satisfaction,return_flag,total_amount\n\
                   T1,2024-04-03,20,28,F,Electronics,100,1,0,0,3,Card,5,No,100\n\
                   T2,2024-05-03,9,41,M,Electronics,50,1,10,5,6,Cash,3,Yes,50\n\
                   T3,2024-04-07,14,60,F,Clothing,30,1,0,2,2,Card,4,No,30\n";
        analyze_bytes(csv.as_bytes(), &AnalyzeOptions::default()).unwrap()
    }

    #[test]
    fn test_report_sections() {
        let text = ConsoleReport(&run()).to_string();
        for section in [
            "1. DATA PREPARATION",
            "2. DESCRIPTIVE STATISTICS",
            "3. PRELIMINARY INSIGHTS",
            "4. SIGNIFICANT CORRELATIONS",
            "5. EXECUTIVE QUESTIONS",
            "SUMMARY",
        ] {
            assert!(text.contains(section), "missing {section}");
        }
        assert!(text.contains("$180.00 MXN"));
        assert!(text.starts_with(&"=".repeat(RULE_WIDTH)));
    }

    #[test]
    fn test_correlation_report_top_n() {
        let run = run();
        let text = CorrelationReport { matrix: &run.aggregates.correlation, top: 2 }.to_string();
        assert!(text.contains("Top 2 correlations"));
        assert!(text.contains("  2. "));
        assert!(!text.contains("  3. "));
    }

    #[test]
    fn test_describe_lists_every_column() {
        let run = run();
        let text = DescribeReport(&run.aggregates).to_string();
        assert!(text.contains("customer_satisfaction"));
        assert!(text.contains("Outliers"));
        assert!(text.contains("product_category: Electronics=2, Clothing=1"));
    }
}
