pub mod ask;
pub mod demo;
pub mod report;
pub mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Resolve the data directory: flag, then MARGOT_DATA_DIR, then ./data.
pub(crate) fn data_dir(flag: &Option<String>) -> PathBuf {
    flag.clone()
        .or_else(|| std::env::var("MARGOT_DATA_DIR").ok())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"))
}

#[derive(Parser)]
#[command(
    name = "margot",
    about = "CFO copilot: ask plain-English questions about monthly actuals, budget, FX and cash."
)]
pub struct Cli {
    /// Directory containing actuals/budget/fx/cash (.csv or .xlsx)
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask a question in plain English, e.g. "June 2025 revenue vs budget".
    Ask {
        /// The question (quoting is optional)
        #[arg(required = true)]
        question: Vec<String>,
    },
    /// Generate a specific report.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Show what is loaded: tables, row counts, latest month.
    Status,
    /// Write sample data files into the data directory to explore margot.
    Demo,
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Revenue vs budget for one month.
    Revenue {
        /// Month, e.g. "2025-06" or "June 2025" (default: latest)
        #[arg(long)]
        month: Option<String>,
        /// Print the summary as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Gross margin % trend.
    Margin {
        /// Window size in months
        #[arg(long, default_value_t = 3)]
        months: u32,
        /// End month (default: latest)
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Opex breakdown by sub-category for one month.
    Opex {
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// EBITDA for one month.
    Ebitda {
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Cash runway estimate.
    Runway {
        /// Burn lookback window in months
        #[arg(long, default_value_t = 3)]
        lookback: usize,
        #[arg(long)]
        json: bool,
    },
    /// Monthly revenue, actual vs budget, over a window.
    RevenueTrend {
        #[arg(long, default_value_t = 12)]
        months: u32,
        /// End month (default: latest)
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        json: bool,
    },
}
