use std::path::Path;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::fmt::{money, month_label, month_name, pct};
use crate::metrics::{self, BurnMethod};
use crate::store::DataStore;

// ---------------------------------------------------------------------------
// Dispatch wrappers (load, compute, print)
// ---------------------------------------------------------------------------

pub fn revenue(dir: &Path, month: Option<&str>, json: bool) -> Result<()> {
    let store = DataStore::from_directory(dir)?;
    match metrics::revenue_vs_budget(&store, month) {
        Some(r) if json => println!("{}", serde_json::to_string_pretty(&r)?),
        Some(r) => println!("{}", format_revenue(&r)),
        None => println!("No data available."),
    }
    Ok(())
}

pub fn margin(dir: &Path, months: u32, month: Option<&str>, json: bool) -> Result<()> {
    let store = DataStore::from_directory(dir)?;
    let trend = metrics::gross_margin_trend(&store, months, month);
    if json {
        println!("{}", serde_json::to_string_pretty(&trend)?);
    } else if trend.is_empty() {
        println!("No data available for Gross Margin % trend.");
    } else {
        println!("{}", format_margin(&trend));
    }
    Ok(())
}

pub fn opex(dir: &Path, month: Option<&str>, json: bool) -> Result<()> {
    let store = DataStore::from_directory(dir)?;
    match metrics::opex_breakdown(&store, month) {
        Some(b) if json => println!("{}", serde_json::to_string_pretty(&b)?),
        Some(b) if b.rows.is_empty() => {
            println!("No Opex data for {}.", month_name(b.month));
        }
        Some(b) => println!("{}", format_opex(&b)),
        None => println!("No data available."),
    }
    Ok(())
}

pub fn ebitda(dir: &Path, month: Option<&str>, json: bool) -> Result<()> {
    let store = DataStore::from_directory(dir)?;
    match metrics::ebitda(&store, month) {
        Some(e) if json => println!("{}", serde_json::to_string_pretty(&e)?),
        Some(e) => println!("{}", format_ebitda(&e)),
        None => println!("No data available."),
    }
    Ok(())
}

pub fn runway(dir: &Path, lookback: usize, json: bool) -> Result<()> {
    let store = DataStore::from_directory(dir)?;
    match metrics::cash_runway(&store, lookback) {
        Some(r) if json => println!("{}", serde_json::to_string_pretty(&r)?),
        Some(r) => println!("{}", format_runway(&r)),
        None => println!("No data available."),
    }
    Ok(())
}

pub fn revenue_trend(dir: &Path, months: u32, month: Option<&str>, json: bool) -> Result<()> {
    let store = DataStore::from_directory(dir)?;
    let trend = metrics::revenue_trend(&store, months, month);
    if json {
        println!("{}", serde_json::to_string_pretty(&trend)?);
    } else if trend.is_empty() {
        println!("No revenue data in that window.");
    } else {
        println!("{}", format_revenue_trend(&trend));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Pure formatting functions (metric data → String)
// ---------------------------------------------------------------------------

fn signed_money(val: f64) -> String {
    if val < 0.0 {
        money(val).red().to_string()
    } else {
        money(val).green().to_string()
    }
}

pub fn format_revenue(r: &metrics::RevenueVsBudget) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Type", "Amount (USD)"]);
    for row in &r.rows {
        table.add_row(vec![Cell::new(row.label), Cell::new(money(row.amount_usd))]);
    }
    format!(
        "Revenue in {}: Actual {} vs Budget {} (Variance {}, {}).\n{table}",
        month_name(r.month),
        money(r.actual),
        money(r.budget),
        signed_money(r.variance),
        pct(r.variance_pct),
    )
}

pub fn format_margin(trend: &[metrics::MarginPoint]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Month", "Revenue", "COGS", "Gross Margin %"]);
    for point in trend {
        table.add_row(vec![
            Cell::new(month_label(point.month)),
            Cell::new(money(point.revenue)),
            Cell::new(money(point.cogs)),
            Cell::new(match point.gross_margin_pct {
                Some(p) => format!("{:.1}%", p * 100.0),
                None => "n/a".to_string(),
            }),
        ]);
    }
    let latest = &trend[trend.len() - 1];
    let headline = match latest.gross_margin_pct {
        Some(p) => format!(
            "Latest Gross Margin %: {:.1}% for {}.",
            p * 100.0,
            month_label(latest.month)
        ),
        None => format!(
            "Gross Margin % undefined for {} (no revenue).",
            month_label(latest.month)
        ),
    };
    format!("{headline}\n{table}")
}

pub fn format_opex(b: &metrics::OpexBreakdown) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Category", "Amount (USD)"]);
    let mut total = 0.0;
    for row in &b.rows {
        table.add_row(vec![Cell::new(&row.category), Cell::new(money(row.amount_usd))]);
        total += row.amount_usd;
    }
    table.add_row(vec![
        Cell::new("Total".bold()),
        Cell::new(money(total).bold()),
    ]);
    format!("Opex breakdown for {}.\n{table}", month_name(b.month))
}

pub fn format_ebitda(e: &metrics::Ebitda) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Line", "Amount (USD)"]);
    table.add_row(vec![Cell::new("Revenue"), Cell::new(money(e.revenue))]);
    table.add_row(vec![Cell::new("COGS"), Cell::new(money(e.cogs))]);
    table.add_row(vec![Cell::new("Opex"), Cell::new(money(e.opex))]);
    table.add_row(vec![
        Cell::new("EBITDA".bold()),
        Cell::new(signed_money(e.ebitda).bold()),
    ]);
    format!(
        "EBITDA for {}: {}.\n{table}",
        month_name(e.month),
        money(e.ebitda)
    )
}

pub fn format_runway(r: &metrics::CashRunway) -> String {
    match r.runway_months {
        Some(months) => format!(
            "Cash runway: {months:.1} months based on last cash {} and avg monthly burn {} \
             ({} method, {} months in window). Cash as of {}.",
            money(r.last_cash),
            money(r.avg_burn),
            r.method.as_str(),
            r.months_in_window,
            month_label(r.as_of),
        ),
        None if r.method == BurnMethod::None => format!(
            "No burn detected; company appears profitable or break-even. \
             Runway is not applicable. Cash as of {}: {}.",
            month_label(r.as_of),
            money(r.last_cash),
        ),
        None => "Runway could not be computed due to missing data.".to_string(),
    }
}

pub fn format_revenue_trend(trend: &[metrics::TrendPoint]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Month", "Actual", "Budget", "Variance"]);
    for point in trend {
        table.add_row(vec![
            Cell::new(month_label(point.month)),
            Cell::new(money(point.actual)),
            Cell::new(money(point.budget)),
            Cell::new(signed_money(point.actual - point.budget)),
        ]);
    }
    format!("Revenue: Actual vs Budget, last {} months.\n{table}", trend.len())
}
