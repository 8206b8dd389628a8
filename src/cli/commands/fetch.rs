//! Fetch command - answer a request through the active worker

use crate::cli::args::FetchArgs;
use crate::cli::host::Host;
use crate::config::Config;
use crate::error::{ScopeCacheError, ScopeCacheResult};
use crate::store::Request;
use std::io::{self, Write};

/// Execute the fetch command
pub async fn execute(args: FetchArgs, config: &Config) -> ScopeCacheResult<()> {
    let host = Host::new(config);
    let worker = host.active_worker(&args.scope).await?;

    let response = worker.handle_fetch(Request::new(args.url)).await?;

    let mut out = io::stdout().lock();
    let write_err = |e| ScopeCacheError::io("writing response", e);
    if args.include {
        writeln!(out, "{} {}", response.status, response.url).map_err(write_err)?;
        for (name, value) in &response.headers {
            writeln!(out, "{}: {}", name, value).map_err(write_err)?;
        }
        writeln!(out).map_err(write_err)?;
    }
    out.write_all(&response.body).map_err(write_err)?;
    out.flush().map_err(write_err)?;

    Ok(())
}
