use std::collections::BTreeSet;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{MargotError, Result};
use crate::fx::Converter;
use crate::loader::{read_table, resolve_table_file, RawTable};
use crate::schema::{
    self, NormalizeSpec, NormalizedRow, MONTH_CANDIDATES, MONTH_CANDIDATES_NO_PERIOD,
};

// ---------------------------------------------------------------------------
// Canonical rows
// ---------------------------------------------------------------------------

/// One normalized financial line item, currency already folded into USD.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerRow {
    pub month: NaiveDate,
    pub account: String,
    pub account_norm: String,
    pub amount_usd: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FxRate {
    pub month: NaiveDate,
    pub currency: String,
    pub rate_to_usd: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CashBalance {
    pub month: NaiveDate,
    pub amount_usd: f64,
}

// ---------------------------------------------------------------------------
// DataStore
// ---------------------------------------------------------------------------

/// Immutable snapshot of the four input tables. Built once per load; a
/// reload constructs a fresh store and a failed reload leaves the previous
/// one untouched.
#[derive(Debug)]
pub struct DataStore {
    pub actuals: Vec<LedgerRow>,
    pub budget: Vec<LedgerRow>,
    pub fx: Vec<FxRate>,
    pub cash: Vec<CashBalance>,
}

impl DataStore {
    /// Load `actuals`, `budget`, `fx` and `cash` (`.csv` or `.xlsx`) from a
    /// directory. Any failure aborts the whole load.
    pub fn from_directory(dir: &Path) -> Result<Self> {
        let actuals = read_table(&resolve_table_file(dir, "actuals")?)?;
        let budget = read_table(&resolve_table_file(dir, "budget")?)?;
        let fx = read_table(&resolve_table_file(dir, "fx")?)?;
        let cash = read_table(&resolve_table_file(dir, "cash")?)?;
        Self::from_tables(&actuals, &budget, &fx, &cash)
    }

    /// Normalize + convert already-read tables into a store.
    pub fn from_tables(
        actuals: &RawTable,
        budget: &RawTable,
        fx: &RawTable,
        cash: &RawTable,
    ) -> Result<Self> {
        let actual_rows = schema::normalize(
            actuals,
            &NormalizeSpec {
                table: "actuals",
                month_candidates: MONTH_CANDIDATES,
                with_account: true,
                prefer_amount: None,
            },
        )?;
        let budget_rows = schema::normalize(
            budget,
            &NormalizeSpec {
                table: "budget",
                month_candidates: MONTH_CANDIDATES,
                with_account: true,
                prefer_amount: None,
            },
        )?;
        let fx_rows = schema::normalize(
            fx,
            &NormalizeSpec {
                table: "fx",
                month_candidates: MONTH_CANDIDATES_NO_PERIOD,
                with_account: false,
                prefer_amount: Some("rate_to_usd"),
            },
        )?;
        let cash_rows = schema::normalize(
            cash,
            &NormalizeSpec {
                table: "cash",
                month_candidates: MONTH_CANDIDATES_NO_PERIOD,
                with_account: false,
                prefer_amount: None,
            },
        )?;

        let converter = Converter::new(&fx_rows);
        let mut missing: BTreeSet<(NaiveDate, String)> = BTreeSet::new();

        let actuals = to_ledger(&actual_rows, &converter, &mut missing);
        let budget = to_ledger(&budget_rows, &converter, &mut missing);
        let cash: Vec<CashBalance> = converter
            .convert(&cash_rows, &mut missing)
            .into_iter()
            .map(|(row, amount_usd)| CashBalance {
                month: row.month,
                amount_usd,
            })
            .collect();

        if !missing.is_empty() {
            return Err(MargotError::MissingFxRates(missing.into_iter().collect()));
        }

        let fx = fx_rows
            .into_iter()
            .map(|row| FxRate {
                month: row.month,
                currency: row.currency,
                rate_to_usd: row.amount,
            })
            .collect();

        Ok(DataStore {
            actuals,
            budget,
            fx,
            cash,
        })
    }

    /// Latest month present across actuals, budget and cash.
    pub fn latest_month(&self) -> Option<NaiveDate> {
        let ledger = self
            .actuals
            .iter()
            .chain(self.budget.iter())
            .map(|r| r.month);
        let cash = self.cash.iter().map(|c| c.month);
        ledger.chain(cash).max()
    }

    /// Resolve a free-text month reference; absent or unparseable text falls
    /// back to the latest month available.
    pub fn resolve_month(&self, month_text: Option<&str>) -> Option<NaiveDate> {
        month_text
            .and_then(schema::parse_month_text)
            .or_else(|| self.latest_month())
    }
}

fn to_ledger(
    rows: &[NormalizedRow],
    converter: &Converter,
    missing: &mut BTreeSet<(NaiveDate, String)>,
) -> Vec<LedgerRow> {
    converter
        .convert(rows, missing)
        .into_iter()
        .map(|(row, amount_usd)| LedgerRow {
            month: row.month,
            account: row.account,
            account_norm: row.account_norm,
            amount_usd,
        })
        .collect()
}
