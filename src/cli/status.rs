use std::path::Path;

use crate::error::Result;
use crate::fmt::{money, month_label};
use crate::loader::resolve_table_file;
use crate::metrics;
use crate::store::DataStore;

pub fn run(dir: &Path) -> Result<()> {
    println!("Data dir:   {}", dir.display());
    for table in ["actuals", "budget", "fx", "cash"] {
        match resolve_table_file(dir, table) {
            Ok(path) => println!("{table:<10} {}", path.display()),
            Err(_) => println!("{table:<10} (missing)"),
        }
    }

    let store = DataStore::from_directory(dir)?;
    println!();
    println!("Actuals rows:  {}", store.actuals.len());
    println!("Budget rows:   {}", store.budget.len());
    println!("FX rates:      {}", store.fx.len());
    println!("Cash months:   {}", store.cash.len());

    if let Some(latest) = store.latest_month() {
        println!("Latest month:  {}", month_label(latest));
    }
    if let Some(runway) = metrics::cash_runway(&store, 3) {
        println!("Last cash:     {}", money(runway.last_cash));
    }
    Ok(())
}
