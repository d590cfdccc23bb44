use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;

use crate::schema::NormalizedRow;

/// Currency assumed when an input table has no currency column.
pub const DEFAULT_CURRENCY: &str = "USD";
/// USD converts at exactly 1.0, whatever the FX table says.
pub const USD_RATE: f64 = 1.0;

/// FX rate lookup keyed by (month, currency). Duplicate keys in the source
/// table resolve to the last row.
pub struct Converter {
    rates: HashMap<(NaiveDate, String), f64>,
}

impl Converter {
    pub fn new(fx_rows: &[NormalizedRow]) -> Self {
        let mut rates = HashMap::with_capacity(fx_rows.len());
        for row in fx_rows {
            rates.insert((row.month, row.currency.clone()), row.amount);
        }
        Converter { rates }
    }

    pub fn rate(&self, month: NaiveDate, currency: &str) -> Option<f64> {
        if currency == DEFAULT_CURRENCY {
            return Some(USD_RATE);
        }
        self.rates.get(&(month, currency.to_string())).copied()
    }

    /// Convert each row's amount to USD. Rows whose (month, currency) has no
    /// rate are recorded in `missing` instead of being converted; the caller
    /// fails the whole load once every table has been checked.
    pub fn convert(
        &self,
        rows: &[NormalizedRow],
        missing: &mut BTreeSet<(NaiveDate, String)>,
    ) -> Vec<(NormalizedRow, f64)> {
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            match self.rate(row.month, &row.currency) {
                Some(rate) => out.push((row.clone(), row.amount * rate)),
                None => {
                    missing.insert((row.month, row.currency.clone()));
                }
            }
        }
        out
    }
}
