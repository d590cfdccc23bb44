use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::error::{MargotError, Result};

// ---------------------------------------------------------------------------
// Cell / RawTable
// ---------------------------------------------------------------------------

/// One value from an input file, typed as far as the source format allows.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
    Date(NaiveDate),
}

impl Cell {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// A table read from disk before any schema detection. Column layout is
/// whatever the export produced; rows are padded to the header width.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn new(columns: &[&str], rows: Vec<Vec<Cell>>) -> Self {
        let columns: Vec<String> = columns.iter().map(|c| c.trim().to_string()).collect();
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Empty);
                row
            })
            .collect();
        RawTable { columns, rows }
    }
}

// ---------------------------------------------------------------------------
// Value parsing helpers
// ---------------------------------------------------------------------------

/// Parse a monetary-looking string: commas, quotes, `$` and parenthesized
/// negatives accepted. Returns None when the string is not a number.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let s = raw.replace(',', "").replace('"', "").replace('$', "");
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return inner.trim().parse::<f64>().ok().map(|v| -v);
    }
    s.parse().ok()
}

/// Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug).
pub fn excel_serial_to_date(serial: f64) -> NaiveDate {
    let base = NaiveDate::from_ymd_opt(1899, 12, 30).unwrap();
    base + chrono::Duration::days(serial as i64)
}

fn typed_cell(raw: &str) -> Cell {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Cell::Empty;
    }
    match parse_amount(trimmed) {
        Some(n) => Cell::Number(n),
        None => Cell::Text(trimmed.to_string()),
    }
}

// ---------------------------------------------------------------------------
// File resolution + readers
// ---------------------------------------------------------------------------

/// Resolve `<name>.csv` then `<name>.xlsx` inside the data directory.
pub fn resolve_table_file(dir: &Path, name: &str) -> Result<PathBuf> {
    for ext in ["csv", "xlsx"] {
        let path = dir.join(format!("{name}.{ext}"));
        if path.exists() {
            return Ok(path);
        }
    }
    Err(MargotError::MissingFile {
        table: name.to_string(),
        dir: dir.to_path_buf(),
    })
}

pub fn read_table(path: &Path) -> Result<RawTable> {
    if path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("xlsx") || e.eq_ignore_ascii_case("xls"))
    {
        return read_xlsx(path);
    }
    read_csv(path)
}

fn read_csv(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));

    let mut columns: Vec<String> = Vec::new();
    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if columns.is_empty() {
            columns = record.iter().map(|f| f.trim().to_string()).collect();
            continue;
        }
        let mut row: Vec<Cell> = record.iter().map(typed_cell).collect();
        row.resize(columns.len(), Cell::Empty);
        rows.push(row);
    }
    Ok(RawTable { columns, rows })
}

#[cfg(feature = "xlsx")]
fn read_xlsx(path: &Path) -> Result<RawTable> {
    use calamine::{Data, Reader};

    let mut workbook = calamine::open_workbook_auto(path)
        .map_err(|e| MargotError::Xlsx(format!("failed to open {}: {e}", path.display())))?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| MargotError::Xlsx(format!("no worksheets in {}", path.display())))?;
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| MargotError::Xlsx(format!("failed to read sheet {sheet}: {e}")))?;

    let mut row_iter = range.rows();
    let columns: Vec<String> = match row_iter.next() {
        Some(header) => header.iter().map(|c| c.to_string().trim().to_string()).collect(),
        None => Vec::new(),
    };

    let mut rows = Vec::new();
    for row in row_iter {
        let mut cells: Vec<Cell> = row
            .iter()
            .map(|data| match data {
                Data::Empty | Data::Error(_) => Cell::Empty,
                Data::Float(f) => Cell::Number(*f),
                Data::Int(i) => Cell::Number(*i as f64),
                Data::DateTime(dt) => Cell::Date(excel_serial_to_date(dt.as_f64())),
                Data::String(s) => typed_cell(s),
                Data::Bool(b) => Cell::Text(b.to_string()),
                Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.trim().to_string()),
            })
            .collect();
        cells.resize(columns.len(), Cell::Empty);
        rows.push(cells);
    }
    Ok(RawTable { columns, rows })
}

#[cfg(not(feature = "xlsx"))]
fn read_xlsx(path: &Path) -> Result<RawTable> {
    Err(MargotError::Other(format!(
        "{} requires XLSX support; rebuild with the `xlsx` feature",
        path.display()
    )))
}
