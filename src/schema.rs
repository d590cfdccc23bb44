use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};

use crate::error::{MargotError, Result};
use crate::fx::DEFAULT_CURRENCY;
use crate::loader::{excel_serial_to_date, Cell, RawTable};

// ---------------------------------------------------------------------------
// Candidate-name rule tables, evaluated in priority order
// ---------------------------------------------------------------------------

pub const MONTH_CANDIDATES: &[&str] = &["month", "date", "period"];
pub const MONTH_CANDIDATES_NO_PERIOD: &[&str] = &["month", "date"];

const CURRENCY_CANDIDATES: &[&str] = &["currency", "curr", "ccy"];

const ACCOUNT_CANDIDATES: &[&str] = &[
    "account",
    "account_category",
    "account category",
    "category",
    "line_item",
    "line item",
    "acct",
    "name",
    "account name",
    "gl account",
    "gl_account",
];

const AMOUNT_CANDIDATES: &[&str] = &["amount_usd", "amount", "value", "usd", "total"];

const UNKNOWN_ACCOUNT: &str = "Unknown";

// Numeric cells in this range are treated as Excel date serials when a
// date is expected (1982..2064).
const EXCEL_SERIAL_MIN: f64 = 30_000.0;
const EXCEL_SERIAL_MAX: f64 = 60_000.0;

// ---------------------------------------------------------------------------
// Date parsing
// ---------------------------------------------------------------------------

// chrono's %b only matches abbreviated month names; %B is needed for the
// full ones.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%m-%d-%Y", "%d %b %Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
const MONTH_FORMATS: &[&str] = &[
    "%Y-%m", "%Y/%m", "%m-%Y", "%m/%Y", "%b %Y", "%b-%Y", "%B %Y", "%B-%Y",
];

pub fn parse_date_text(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    // Month-granular strings: borrow day 1 so chrono can parse them.
    for fmt in MONTH_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(&format!("{s} 1"), &format!("{fmt} %d")) {
            return Some(d);
        }
    }
    None
}

pub fn parse_date_cell(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Date(d) => Some(*d),
        Cell::Text(s) => parse_date_text(s),
        Cell::Number(n) if (EXCEL_SERIAL_MIN..=EXCEL_SERIAL_MAX).contains(n) => {
            Some(excel_serial_to_date(*n))
        }
        _ => None,
    }
}

/// Parse a user-supplied month reference ("June 2025", "2025-06", "06/2025",
/// a bare month name, or any full date). Unparseable text is not an error;
/// it means "no override".
pub fn parse_month_text(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(d) = parse_date_text(s) {
        return Some(month_of(d));
    }
    // Bare month name: missing components filled from today.
    let year = Local::now().year();
    let padded = format!("{s} 1 {year}");
    NaiveDate::parse_from_str(&padded, "%b %d %Y")
        .or_else(|_| NaiveDate::parse_from_str(&padded, "%B %d %Y"))
        .ok()
        .map(month_of)
}

/// Truncate a date to its enclosing calendar month — the canonical monthly
/// bucket for every entity.
pub fn month_of(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap()
}

pub fn add_months(month: NaiveDate, delta: i32) -> NaiveDate {
    let total = month.year() * 12 + month.month0() as i32 + delta;
    NaiveDate::from_ymd_opt(total.div_euclid(12), total.rem_euclid(12) as u32 + 1, 1).unwrap()
}

// ---------------------------------------------------------------------------
// Column detection
// ---------------------------------------------------------------------------

fn find_column(table: &RawTable, candidates: &[&str]) -> Option<usize> {
    for cand in candidates {
        if let Some(i) = table
            .columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(cand))
        {
            return Some(i);
        }
    }
    None
}

fn column_has_date(table: &RawTable, col: usize) -> bool {
    table.rows.iter().any(|row| parse_date_cell(&row[col]).is_some())
}

fn column_is_numeric(table: &RawTable, col: usize) -> bool {
    let mut seen = false;
    for row in &table.rows {
        match &row[col] {
            Cell::Number(_) => seen = true,
            Cell::Empty => {}
            _ => return false,
        }
    }
    seen
}

/// A candidate name only counts if at least one of its values parses to a
/// date; otherwise fall back to the first column where date-parsing succeeds.
fn detect_month_column(table: &RawTable, candidates: &[&str], name: &str) -> Result<usize> {
    for &cand in candidates {
        if let Some(i) = find_column(table, &[cand]) {
            if column_has_date(table, i) {
                return Ok(i);
            }
        }
    }
    for i in 0..table.columns.len() {
        if column_has_date(table, i) {
            return Ok(i);
        }
    }
    Err(MargotError::Schema {
        table: name.to_string(),
        reason: "no column parses as a month/date".to_string(),
    })
}

fn detect_account_column(table: &RawTable) -> Option<usize> {
    find_column(table, ACCOUNT_CANDIDATES).or_else(|| {
        table
            .columns
            .iter()
            .position(|c| c.to_lowercase().contains("account"))
    })
}

fn detect_amount_column(
    table: &RawTable,
    prefer: Option<&str>,
    month_col: usize,
    name: &str,
) -> Result<usize> {
    let mut candidates: Vec<&str> = Vec::new();
    if let Some(p) = prefer {
        candidates.push(p);
    }
    candidates.extend_from_slice(AMOUNT_CANDIDATES);
    if let Some(i) = find_column(table, &candidates) {
        return Ok(i);
    }
    // Fallback: first numeric-typed column (the month column is claimed).
    for i in 0..table.columns.len() {
        if i != month_col && column_is_numeric(table, i) {
            return Ok(i);
        }
    }
    Err(MargotError::Schema {
        table: name.to_string(),
        reason: "no numeric amount column".to_string(),
    })
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// One row with canonical fields, before currency conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    pub month: NaiveDate,
    pub currency: String,
    pub account: String,
    pub account_norm: String,
    pub amount: f64,
}

pub struct NormalizeSpec<'a> {
    pub table: &'a str,
    pub month_candidates: &'a [&'a str],
    pub with_account: bool,
    pub prefer_amount: Option<&'a str>,
}

/// Map a raw table onto canonical fields. Rows whose month or amount cell
/// does not parse are dropped; missing currency defaults to USD; missing
/// account columns default to "Unknown".
pub fn normalize(table: &RawTable, spec: &NormalizeSpec) -> Result<Vec<NormalizedRow>> {
    let month_col = detect_month_column(table, spec.month_candidates, spec.table)?;
    let currency_col = find_column(table, CURRENCY_CANDIDATES);
    let account_col = if spec.with_account {
        detect_account_column(table)
    } else {
        None
    };
    let amount_col = detect_amount_column(table, spec.prefer_amount, month_col, spec.table)?;

    let mut out = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let Some(date) = parse_date_cell(&row[month_col]) else {
            continue;
        };
        let Some(amount) = row[amount_col].as_number() else {
            continue;
        };
        let currency = match currency_col.map(|i| &row[i]) {
            Some(Cell::Text(s)) if !s.trim().is_empty() => s.trim().to_uppercase(),
            _ => DEFAULT_CURRENCY.to_string(),
        };
        let account = match account_col.map(|i| &row[i]) {
            Some(Cell::Text(s)) if !s.trim().is_empty() => s.trim().to_string(),
            Some(Cell::Number(n)) => n.to_string(),
            _ if spec.with_account => UNKNOWN_ACCOUNT.to_string(),
            _ => String::new(),
        };
        let account_norm = account.trim().to_lowercase();
        out.push(NormalizedRow {
            month: month_of(date),
            currency,
            account,
            account_norm,
            amount,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_parse_date_text_formats() {
        assert_eq!(parse_date_text("2023-01-15"), Some(d(2023, 1, 15)));
        assert_eq!(parse_date_text("2023/01/15"), Some(d(2023, 1, 15)));
        assert_eq!(parse_date_text("01/15/2023"), Some(d(2023, 1, 15)));
        assert_eq!(parse_date_text("2023-01"), Some(d(2023, 1, 1)));
        assert_eq!(parse_date_text("01-2023"), Some(d(2023, 1, 1)));
        assert_eq!(parse_date_text("Jan 2023"), Some(d(2023, 1, 1)));
        assert_eq!(parse_date_text("January 2023"), Some(d(2023, 1, 1)));
        assert_eq!(parse_date_text("September 2023"), Some(d(2023, 9, 1)));
        assert_eq!(parse_date_text("2023-01-15 10:30:00"), Some(d(2023, 1, 15)));
        assert_eq!(parse_date_text("garbage"), None);
        assert_eq!(parse_date_text(""), None);
    }

    #[test]
    fn test_parse_month_text_truncates() {
        assert_eq!(parse_month_text("2023-01-15"), Some(d(2023, 1, 1)));
        assert_eq!(parse_month_text("June 2025"), Some(d(2025, 6, 1)));
        assert_eq!(parse_month_text("06/2025"), Some(d(2025, 6, 1)));
        assert_eq!(parse_month_text("total nonsense"), None);
    }

    #[test]
    fn test_parse_month_text_bare_month_uses_current_year() {
        let year = Local::now().year();
        assert_eq!(parse_month_text("June"), Some(d(year, 6, 1)));
        assert_eq!(parse_month_text("Dec"), Some(d(year, 12, 1)));
        assert_eq!(parse_month_text("December"), Some(d(year, 12, 1)));
    }

    #[test]
    fn test_add_months() {
        assert_eq!(add_months(d(2023, 3, 1), -2), d(2023, 1, 1));
        assert_eq!(add_months(d(2023, 1, 1), -1), d(2022, 12, 1));
        assert_eq!(add_months(d(2023, 11, 1), 3), d(2024, 2, 1));
        assert_eq!(add_months(d(2023, 5, 1), 0), d(2023, 5, 1));
    }

    fn actuals_table() -> RawTable {
        RawTable::new(
            &["Period", "GL Account", "Total", "Ccy"],
            vec![
                vec![
                    Cell::Text("2023-01-15".into()),
                    Cell::Text("Revenue".into()),
                    Cell::Number(380000.0),
                    Cell::Text("usd ".into()),
                ],
                vec![
                    Cell::Text("2023-01-15".into()),
                    Cell::Text("COGS".into()),
                    Cell::Number(57000.0),
                    Cell::Empty,
                ],
            ],
        )
    }

    #[test]
    fn test_normalize_detects_alternate_names() {
        let rows = normalize(
            &actuals_table(),
            &NormalizeSpec {
                table: "actuals",
                month_candidates: MONTH_CANDIDATES,
                with_account: true,
                prefer_amount: None,
            },
        )
        .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].month, d(2023, 1, 1));
        assert_eq!(rows[0].account, "Revenue");
        assert_eq!(rows[0].account_norm, "revenue");
        assert_eq!(rows[0].amount, 380000.0);
        assert_eq!(rows[0].currency, "USD");
        // Empty currency cell falls back to USD
        assert_eq!(rows[1].currency, "USD");
    }

    #[test]
    fn test_normalize_is_idempotent_on_canonical_table() {
        let table = RawTable::new(
            &["month", "currency", "account", "amount"],
            vec![vec![
                Cell::Text("2023-01-01".into()),
                Cell::Text("USD".into()),
                Cell::Text("Revenue".into()),
                Cell::Number(380000.0),
            ]],
        );
        let spec = NormalizeSpec {
            table: "actuals",
            month_candidates: MONTH_CANDIDATES,
            with_account: true,
            prefer_amount: None,
        };
        let first = normalize(&table, &spec).unwrap();
        let round_trip = RawTable::new(
            &["month", "currency", "account", "amount"],
            first
                .iter()
                .map(|r| {
                    vec![
                        Cell::Text(r.month.format("%Y-%m-%d").to_string()),
                        Cell::Text(r.currency.clone()),
                        Cell::Text(r.account.clone()),
                        Cell::Number(r.amount),
                    ]
                })
                .collect(),
        );
        let second = normalize(&round_trip, &spec).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_normalize_falls_back_to_first_date_column() {
        let table = RawTable::new(
            &["as_of", "balance"],
            vec![vec![Cell::Text("Feb 2023".into()), Cell::Number(900000.0)]],
        );
        let rows = normalize(
            &table,
            &NormalizeSpec {
                table: "cash",
                month_candidates: MONTH_CANDIDATES_NO_PERIOD,
                with_account: false,
                prefer_amount: None,
            },
        )
        .unwrap();
        assert_eq!(rows[0].month, d(2023, 2, 1));
        assert_eq!(rows[0].amount, 900000.0);
    }

    #[test]
    fn test_normalize_missing_month_column_fails() {
        let table = RawTable::new(
            &["label", "amount"],
            vec![vec![Cell::Text("Revenue".into()), Cell::Number(1.0)]],
        );
        let err = normalize(
            &table,
            &NormalizeSpec {
                table: "actuals",
                month_candidates: MONTH_CANDIDATES,
                with_account: true,
                prefer_amount: None,
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("month/date"));
    }

    #[test]
    fn test_normalize_missing_amount_column_fails() {
        let table = RawTable::new(
            &["month", "note"],
            vec![vec![
                Cell::Text("2023-01".into()),
                Cell::Text("hello".into()),
            ]],
        );
        let err = normalize(
            &table,
            &NormalizeSpec {
                table: "cash",
                month_candidates: MONTH_CANDIDATES,
                with_account: false,
                prefer_amount: None,
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("amount"));
    }

    #[test]
    fn test_normalize_prefers_named_amount_column() {
        // `rate_to_usd` wins over the generic numeric fallback.
        let table = RawTable::new(
            &["month", "currency", "id", "rate_to_usd"],
            vec![vec![
                Cell::Text("2023-01".into()),
                Cell::Text("EUR".into()),
                Cell::Number(7.0),
                Cell::Number(1.08),
            ]],
        );
        let rows = normalize(
            &table,
            &NormalizeSpec {
                table: "fx",
                month_candidates: MONTH_CANDIDATES_NO_PERIOD,
                with_account: false,
                prefer_amount: Some("rate_to_usd"),
            },
        )
        .unwrap();
        assert_eq!(rows[0].amount, 1.08);
    }

    #[test]
    fn test_normalize_drops_unparseable_month_rows() {
        let table = RawTable::new(
            &["month", "amount"],
            vec![
                vec![Cell::Text("2023-01".into()), Cell::Number(10.0)],
                vec![Cell::Text("n/a".into()), Cell::Number(20.0)],
            ],
        );
        let rows = normalize(
            &table,
            &NormalizeSpec {
                table: "cash",
                month_candidates: MONTH_CANDIDATES,
                with_account: false,
                prefer_amount: None,
            },
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_normalize_unknown_account_default() {
        let table = RawTable::new(
            &["month", "amount"],
            vec![vec![Cell::Text("2023-01".into()), Cell::Number(5.0)]],
        );
        let rows = normalize(
            &table,
            &NormalizeSpec {
                table: "budget",
                month_candidates: MONTH_CANDIDATES,
                with_account: true,
                prefer_amount: None,
            },
        )
        .unwrap();
        assert_eq!(rows[0].account, "Unknown");
    }
}
