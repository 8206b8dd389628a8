//! Caches command - list named caches in the store

use crate::cli::args::{CachesArgs, OutputFormat};
use crate::cli::host::Host;
use crate::config::Config;
use crate::error::ScopeCacheResult;
use crate::ui::{self, UiContext};
use console::style;
use serde::Serialize;

/// One row of the cache listing
#[derive(Debug, Serialize)]
struct CacheRow {
    name: String,
    entries: usize,
    /// Scope whose configuration owns this cache name
    owner: Option<String>,
}

/// Execute the caches command
pub async fn execute(args: CachesArgs, config: &Config) -> ScopeCacheResult<()> {
    let host = Host::new(config);

    let mut rows = vec![];
    for name in host.store.keys().await? {
        let entries = host.store.entries(&name).await.map(|e| e.len()).unwrap_or(0);
        let owner = config
            .scopes
            .iter()
            .find(|s| s.cache_name == name)
            .map(|s| s.scope.clone());
        rows.push(CacheRow {
            name,
            entries,
            owner,
        });
    }

    if rows.is_empty() {
        match args.format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => ui::step_info(&UiContext::detect(), "No caches in store"),
        }
        return Ok(());
    }

    match args.format {
        OutputFormat::Table => print_table(&rows),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Plain => {
            for row in &rows {
                println!("{}", row.name);
            }
        }
    }
    Ok(())
}

fn print_table(rows: &[CacheRow]) {
    println!(
        "{:<32} {:<8} {:<16}",
        style("CACHE").bold(),
        style("ENTRIES").bold(),
        style("OWNER").bold()
    );
    println!("{}", "-".repeat(58));

    for row in rows {
        let owner = match &row.owner {
            Some(scope) => style(scope.clone()).green(),
            None => style("-".to_string()).dim(),
        };
        println!("{:<32} {:<8} {:<16}", row.name, row.entries, owner);
    }

    println!();
    println!("Total: {} cache(s)", rows.len());
}
