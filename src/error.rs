use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MargotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "xlsx")]
    #[error("XLSX error: {0}")]
    Xlsx(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No {table}.csv or {table}.xlsx in {}", .dir.display())]
    MissingFile { table: String, dir: PathBuf },

    #[error("Schema error in {table}: {reason}")]
    Schema { table: String, reason: String },

    #[error("Missing FX rates for: {}", format_missing_fx(.0))]
    MissingFxRates(Vec<(NaiveDate, String)>),

    #[error("{0}")]
    Other(String),
}

fn format_missing_fx(pairs: &[(NaiveDate, String)]) -> String {
    pairs
        .iter()
        .map(|(month, currency)| format!("{} {currency}", month.format("%Y-%m")))
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, MargotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fx_rates_lists_every_pair() {
        let jan = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let feb = NaiveDate::from_ymd_opt(2023, 2, 1).unwrap();
        let err = MargotError::MissingFxRates(vec![
            (jan, "EUR".to_string()),
            (feb, "GBP".to_string()),
        ]);
        assert_eq!(
            err.to_string(),
            "Missing FX rates for: 2023-01 EUR, 2023-02 GBP"
        );
    }

    #[test]
    fn test_schema_error_names_table() {
        let err = MargotError::Schema {
            table: "cash".to_string(),
            reason: "no numeric amount column".to_string(),
        };
        assert!(err.to_string().contains("cash"));
    }
}
