use std::path::Path;

use crate::agent::{self, Intent};
use crate::cli::report;
use crate::error::Result;
use crate::metrics;
use crate::store::DataStore;

const HELP_TEXT: &str =
    "I can help with: Revenue vs Budget, Gross Margin % trend, Opex breakdown, EBITDA, Cash runway.";

pub fn run(dir: &Path, question: &str) -> Result<()> {
    let store = DataStore::from_directory(dir)?;
    println!("{}", answer(&store, question));
    Ok(())
}

/// Classify the question and render the matching metric. Pure so it can be
/// tested without a data directory on disk.
fn answer(store: &DataStore, question: &str) -> String {
    match agent::classify(question) {
        Intent::RevenueVsBudget { month_text } => {
            match metrics::revenue_vs_budget(store, month_text.as_deref()) {
                Some(r) => report::format_revenue(&r),
                None => "No data available.".to_string(),
            }
        }
        Intent::GrossMarginTrend { months, end_text } => {
            let trend = metrics::gross_margin_trend(store, months, end_text.as_deref());
            if trend.is_empty() {
                "No data available for Gross Margin % trend.".to_string()
            } else {
                report::format_margin(&trend)
            }
        }
        Intent::OpexBreakdown { month_text } => {
            match metrics::opex_breakdown(store, month_text.as_deref()) {
                Some(b) if !b.rows.is_empty() => report::format_opex(&b),
                _ => "No Opex data for that period.".to_string(),
            }
        }
        Intent::CashRunway => match metrics::cash_runway(store, 3) {
            Some(r) => report::format_runway(&r),
            None => "No data available.".to_string(),
        },
        Intent::Ebitda { month_text } => match metrics::ebitda(store, month_text.as_deref()) {
            Some(e) => report::format_ebitda(&e),
            None => "No data available.".to_string(),
        },
        Intent::Unknown => HELP_TEXT.to_string(),
    }
}
