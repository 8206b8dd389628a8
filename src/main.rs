//! scopecache - cache lifecycle manager
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use scopecache::cli::{Cli, Commands};
use scopecache::config::{Config, ConfigManager};
use scopecache::error::ScopeCacheResult;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8, config: &Config) {
    // 0 = warn, 1 = info, 2+ = debug
    let level = match verbose {
        0 if config.general.verbose => "info",
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::new(format!("scopecache={}", level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}

async fn run() -> ScopeCacheResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await?;

    init_logging(cli.verbose, &config);
    debug!("Loaded config from {}", config_manager.path().display());

    ConfigManager::ensure_state_dirs(&config).await?;

    match cli.command {
        Commands::Install(args) => scopecache::cli::commands::install(args, &config).await,
        Commands::Activate(args) => scopecache::cli::commands::activate(args, &config).await,
        Commands::Deploy(args) => scopecache::cli::commands::deploy(args, &config).await,
        Commands::Fetch(args) => scopecache::cli::commands::fetch(args, &config).await,
        Commands::Purge(args) => scopecache::cli::commands::purge(args, &config).await,
        Commands::Message(args) => scopecache::cli::commands::message(args, &config).await,
        Commands::Caches(args) => scopecache::cli::commands::caches(args, &config).await,
        Commands::Status => scopecache::cli::commands::status(&config).await,
        Commands::Config(args) => {
            scopecache::cli::commands::config(args, &config, cli.config.clone()).await
        }
    }
}
