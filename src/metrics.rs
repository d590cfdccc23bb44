use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::classify;
use crate::schema::add_months;
use crate::store::{DataStore, LedgerRow};

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn sum_matching(rows: &[LedgerRow], month: NaiveDate, matches: fn(&str) -> bool) -> f64 {
    rows.iter()
        .filter(|r| r.month == month && matches(&r.account_norm))
        .map(|r| r.amount_usd)
        .sum()
}

fn any_matching(rows: &[LedgerRow], month: NaiveDate, matches: fn(&str) -> bool) -> bool {
    rows.iter()
        .any(|r| r.month == month && matches(&r.account_norm))
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn ebitda_for(store: &DataStore, month: NaiveDate) -> f64 {
    let revenue = sum_matching(&store.actuals, month, classify::is_revenue);
    let cogs = sum_matching(&store.actuals, month, classify::is_cogs);
    let opex = sum_matching(&store.actuals, month, classify::is_opex);
    revenue - cogs - opex
}

/// Distinct actuals months, ascending.
fn actuals_months(store: &DataStore) -> Vec<NaiveDate> {
    let mut months: Vec<NaiveDate> = store.actuals.iter().map(|r| r.month).collect();
    months.sort();
    months.dedup();
    months
}

// ---------------------------------------------------------------------------
// Revenue vs budget
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonRow {
    pub label: &'static str,
    pub amount_usd: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RevenueVsBudget {
    pub month: NaiveDate,
    pub rows: Vec<ComparisonRow>,
    pub actual: f64,
    pub budget: f64,
    pub variance: f64,
    pub variance_pct: Option<f64>,
}

pub fn revenue_vs_budget(store: &DataStore, month_text: Option<&str>) -> Option<RevenueVsBudget> {
    let month = store.resolve_month(month_text)?;
    let actual = sum_matching(&store.actuals, month, classify::is_revenue);
    let budget = sum_matching(&store.budget, month, classify::is_revenue);
    let variance = actual - budget;
    let variance_pct = if budget != 0.0 {
        Some(variance / budget)
    } else {
        None
    };
    Some(RevenueVsBudget {
        month,
        rows: vec![
            ComparisonRow {
                label: "Actual",
                amount_usd: actual,
            },
            ComparisonRow {
                label: "Budget",
                amount_usd: budget,
            },
        ],
        actual,
        budget,
        variance,
        variance_pct,
    })
}

// ---------------------------------------------------------------------------
// Gross margin trend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct MarginPoint {
    pub month: NaiveDate,
    pub revenue: f64,
    pub cogs: f64,
    /// None when revenue is exactly zero (margin undefined).
    pub gross_margin_pct: Option<f64>,
}

/// Gross margin per month over the `months`-wide window ending at the
/// resolved end month. Months with neither revenue nor COGS rows are
/// omitted; a month present on only one side is zero-filled on the other.
pub fn gross_margin_trend(
    store: &DataStore,
    months: u32,
    end_month_text: Option<&str>,
) -> Vec<MarginPoint> {
    let Some(end) = store.resolve_month(end_month_text) else {
        return Vec::new();
    };
    let months = months.max(1);
    let start = add_months(end, -(months as i32 - 1));

    let mut out = Vec::new();
    let mut m = start;
    while m <= end {
        let has_revenue = any_matching(&store.actuals, m, classify::is_revenue);
        let has_cogs = any_matching(&store.actuals, m, classify::is_cogs);
        if has_revenue || has_cogs {
            let revenue = sum_matching(&store.actuals, m, classify::is_revenue);
            let cogs = sum_matching(&store.actuals, m, classify::is_cogs);
            let gross_margin_pct = if revenue != 0.0 {
                Some((revenue - cogs) / revenue)
            } else {
                None
            };
            out.push(MarginPoint {
                month: m,
                revenue,
                cogs,
                gross_margin_pct,
            });
        }
        m = add_months(m, 1);
    }
    out
}

// ---------------------------------------------------------------------------
// Opex breakdown
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct OpexCategory {
    pub category: String,
    pub amount_usd: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OpexBreakdown {
    pub month: NaiveDate,
    pub rows: Vec<OpexCategory>,
}

/// Opex rows for the resolved month, summed per sub-category, descending by
/// amount. Empty rows are a valid result, not an error.
pub fn opex_breakdown(store: &DataStore, month_text: Option<&str>) -> Option<OpexBreakdown> {
    let month = store.resolve_month(month_text)?;
    let mut totals: HashMap<String, f64> = HashMap::new();
    for row in &store.actuals {
        if row.month == month && classify::is_opex(&row.account_norm) {
            *totals.entry(classify::opex_category(&row.account)).or_default() += row.amount_usd;
        }
    }
    let mut rows: Vec<OpexCategory> = totals
        .into_iter()
        .map(|(category, amount_usd)| OpexCategory {
            category,
            amount_usd,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.amount_usd
            .partial_cmp(&a.amount_usd)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.category.cmp(&b.category))
    });
    Some(OpexBreakdown { month, rows })
}

// ---------------------------------------------------------------------------
// EBITDA
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Ebitda {
    pub month: NaiveDate,
    pub revenue: f64,
    pub cogs: f64,
    pub opex: f64,
    pub ebitda: f64,
}

pub fn ebitda(store: &DataStore, month_text: Option<&str>) -> Option<Ebitda> {
    let month = store.resolve_month(month_text)?;
    let revenue = sum_matching(&store.actuals, month, classify::is_revenue);
    let cogs = sum_matching(&store.actuals, month, classify::is_cogs);
    let opex = sum_matching(&store.actuals, month, classify::is_opex);
    Some(Ebitda {
        month,
        revenue,
        cogs,
        opex,
        ebitda: revenue - cogs - opex,
    })
}

// ---------------------------------------------------------------------------
// Cash runway
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BurnMethod {
    Ebitda,
    GrossBurn,
    None,
}

impl BurnMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            BurnMethod::Ebitda => "ebitda",
            BurnMethod::GrossBurn => "gross_burn",
            BurnMethod::None => "none",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CashRunway {
    pub as_of: NaiveDate,
    /// None with method `none` means profitable or break-even, not an error.
    pub runway_months: Option<f64>,
    pub last_cash: f64,
    pub avg_burn: f64,
    pub method: BurnMethod,
    pub months_in_window: usize,
}

/// Estimate months of cash left from a trailing burn window. Burn is
/// EBITDA-based when any window month was unprofitable, gross (COGS + opex)
/// otherwise; both zero means no burn to extrapolate.
pub fn cash_runway(store: &DataStore, lookback_months: usize) -> Option<CashRunway> {
    let as_of = store
        .cash
        .iter()
        .map(|c| c.month)
        .max()
        .or_else(|| store.latest_month())?;
    // Duplicate balances for the as-of month are summed.
    let last_cash: f64 = store
        .cash
        .iter()
        .filter(|c| c.month == as_of)
        .map(|c| c.amount_usd)
        .sum();

    let months = actuals_months(store);
    if months.is_empty() {
        return Some(CashRunway {
            as_of,
            runway_months: None,
            last_cash,
            avg_burn: 0.0,
            method: BurnMethod::None,
            months_in_window: 0,
        });
    }
    let lookback = lookback_months.max(1);
    let window = &months[months.len().saturating_sub(lookback)..];

    let ebitda_burns: Vec<f64> = window
        .iter()
        .map(|&m| (-ebitda_for(store, m)).max(0.0))
        .collect();
    let avg_burn = mean(&ebitda_burns);
    if avg_burn > 0.0 {
        return Some(CashRunway {
            as_of,
            runway_months: Some(last_cash / avg_burn),
            last_cash,
            avg_burn,
            method: BurnMethod::Ebitda,
            months_in_window: window.len(),
        });
    }

    let gross_burns: Vec<f64> = window
        .iter()
        .map(|&m| {
            let cogs = sum_matching(&store.actuals, m, classify::is_cogs);
            let opex = sum_matching(&store.actuals, m, classify::is_opex);
            (cogs + opex).max(0.0)
        })
        .collect();
    let avg_burn = mean(&gross_burns);
    if avg_burn > 0.0 {
        return Some(CashRunway {
            as_of,
            runway_months: Some(last_cash / avg_burn),
            last_cash,
            avg_burn,
            method: BurnMethod::GrossBurn,
            months_in_window: window.len(),
        });
    }

    Some(CashRunway {
        as_of,
        runway_months: None,
        last_cash,
        avg_burn: 0.0,
        method: BurnMethod::None,
        months_in_window: window.len(),
    })
}

// ---------------------------------------------------------------------------
// Revenue trend (actual vs budget over a window)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct TrendPoint {
    pub month: NaiveDate,
    pub actual: f64,
    pub budget: f64,
}

/// Monthly revenue, actuals against budget, over the window ending at the
/// resolved end month. Months with revenue rows on either side are included,
/// zero-filled on the other.
pub fn revenue_trend(
    store: &DataStore,
    months_back: u32,
    end_month_text: Option<&str>,
) -> Vec<TrendPoint> {
    let Some(end) = store.resolve_month(end_month_text) else {
        return Vec::new();
    };
    let months_back = months_back.max(1);
    let start = add_months(end, -(months_back as i32 - 1));

    let mut out = Vec::new();
    let mut m = start;
    while m <= end {
        let has_actual = any_matching(&store.actuals, m, classify::is_revenue);
        let has_budget = any_matching(&store.budget, m, classify::is_revenue);
        if has_actual || has_budget {
            out.push(TrendPoint {
                month: m,
                actual: sum_matching(&store.actuals, m, classify::is_revenue),
                budget: sum_matching(&store.budget, m, classify::is_revenue),
            });
        }
        m = add_months(m, 1);
    }
    out
}
