mod agent;
mod classify;
mod cli;
mod error;
mod fmt;
mod fx;
mod loader;
mod metrics;
mod schema;
mod store;

use clap::Parser;

use cli::{Cli, Commands, ReportCommands};

fn main() {
    let cli = Cli::parse();
    let dir = cli::data_dir(&cli.data_dir);

    let result = match cli.command {
        Commands::Ask { question } => cli::ask::run(&dir, &question.join(" ")),
        Commands::Report { command } => match command {
            ReportCommands::Revenue { month, json } => {
                cli::report::revenue(&dir, month.as_deref(), json)
            }
            ReportCommands::Margin {
                months,
                month,
                json,
            } => cli::report::margin(&dir, months, month.as_deref(), json),
            ReportCommands::Opex { month, json } => cli::report::opex(&dir, month.as_deref(), json),
            ReportCommands::Ebitda { month, json } => {
                cli::report::ebitda(&dir, month.as_deref(), json)
            }
            ReportCommands::Runway { lookback, json } => {
                cli::report::runway(&dir, lookback, json)
            }
            ReportCommands::RevenueTrend {
                months,
                month,
                json,
            } => cli::report::revenue_trend(&dir, months, month.as_deref(), json),
        },
        Commands::Status => cli::status::run(&dir),
        Commands::Demo => cli::demo::run(&dir),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
