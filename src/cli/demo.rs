use std::path::Path;

use colored::Colorize;

use crate::error::{MargotError, Result};

// Six months of sample data ending 2025-06, with a EUR consulting line to
// exercise the FX join.
const MONTHS: &[&str] = &[
    "2025-01-01",
    "2025-02-01",
    "2025-03-01",
    "2025-04-01",
    "2025-05-01",
    "2025-06-01",
];

const REVENUE: &[f64] = &[310000.0, 325000.0, 340000.0, 352000.0, 366000.0, 380000.0];
const REVENUE_BUDGET: &[f64] = &[320000.0, 330000.0, 345000.0, 360000.0, 375000.0, 400000.0];
const COGS_PCT: f64 = 0.15;
const MARKETING: &[f64] = &[68000.0, 71000.0, 70000.0, 72000.0, 74000.0, 76000.0];
const ADMIN: &[f64] = &[21000.0, 21500.0, 22000.0, 22000.0, 22500.0, 22800.0];
const CONSULTING_EUR: &[f64] = &[140000.0, 142000.0, 145000.0, 147000.0, 150000.0, 152000.0];
const EUR_RATE: &[f64] = &[1.04, 1.05, 1.08, 1.07, 1.09, 1.10];
const CASH: &[f64] = &[
    1_450_000.0,
    1_380_000.0,
    1_300_000.0,
    1_210_000.0,
    1_110_000.0,
    1_000_000.0,
];

pub fn run(dir: &Path) -> Result<()> {
    if dir.exists() && dir.read_dir()?.next().is_some() {
        return Err(MargotError::Other(format!(
            "{} is not empty; refusing to overwrite it",
            dir.display()
        )));
    }
    std::fs::create_dir_all(dir)?;

    let mut actuals = String::from("Month,Account Category,Amount,Currency\n");
    let mut budget = String::from("month,line_item,value\n");
    let mut fx = String::from("month,currency,rate_to_usd\n");
    let mut cash = String::from("date,balance\n");

    for (i, month) in MONTHS.iter().enumerate() {
        let revenue = REVENUE[i];
        actuals.push_str(&format!("{month},Revenue,{revenue},USD\n"));
        actuals.push_str(&format!("{month},COGS,{},USD\n", revenue * COGS_PCT));
        actuals.push_str(&format!("{month},Opex:Marketing,{},USD\n", MARKETING[i]));
        actuals.push_str(&format!("{month},Opex:Admin,{},USD\n", ADMIN[i]));
        actuals.push_str(&format!("{month},Opex:Consulting,{},EUR\n", CONSULTING_EUR[i]));

        let planned = REVENUE_BUDGET[i];
        budget.push_str(&format!("{month},Revenue,{planned}\n"));
        budget.push_str(&format!("{month},COGS,{}\n", planned * COGS_PCT));
        budget.push_str(&format!("{month},Opex,{}\n", MARKETING[i] + ADMIN[i] + 150000.0));

        fx.push_str(&format!("{month},EUR,{}\n", EUR_RATE[i]));
        fx.push_str(&format!("{month},USD,1.0\n"));

        cash.push_str(&format!("{month},{}\n", CASH[i]));
    }

    std::fs::write(dir.join("actuals.csv"), actuals)?;
    std::fs::write(dir.join("budget.csv"), budget)?;
    std::fs::write(dir.join("fx.csv"), fx)?;
    std::fs::write(dir.join("cash.csv"), cash)?;

    println!("{} sample data written to {}", "OK".green().bold(), dir.display());
    println!("Try:");
    println!("  margot --data-dir {} ask \"June 2025 revenue vs budget\"", dir.display());
    println!("  margot --data-dir {} report runway", dir.display());
    Ok(())
}
