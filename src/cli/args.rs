//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// scopecache - scope-aware response cache lifecycle manager
///
/// Pre-populates versioned named caches, sweeps stale caches on activation
/// and answers requests from cache with network fallback.
#[derive(Parser, Debug)]
#[command(name = "scopecache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "SCOPECACHE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install a new worker version, pre-populate its cache and take control
    Install(ScopeArgs),

    /// Activate the installed worker for a scope
    Activate(ScopeArgs),

    /// Install and activate (all scopes unless --scope is given)
    Deploy(DeployArgs),

    /// Answer a request through the active worker
    Fetch(FetchArgs),

    /// Delete the active worker's own cache
    Purge(ScopeArgs),

    /// Post a message to the active worker
    Message(MessageArgs),

    /// List named caches in the store
    Caches(CachesArgs),

    /// Show worker registrations
    Status,

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Arguments for commands acting on a single scope
#[derive(Parser, Debug)]
pub struct ScopeArgs {
    /// Scope path, e.g. / or /myapp/
    #[arg(short, long, default_value = "/")]
    pub scope: String,
}

/// Arguments for the deploy command
#[derive(Parser, Debug)]
pub struct DeployArgs {
    /// Scope path (defaults to every configured scope)
    #[arg(short, long)]
    pub scope: Option<String>,
}

/// Arguments for the fetch command
#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// Request URL, origin-relative (/other.html) or absolute
    pub url: String,

    /// Scope path
    #[arg(short, long, default_value = "/")]
    pub scope: String,

    /// Print status line and headers before the body
    #[arg(short, long)]
    pub include: bool,
}

/// Arguments for the message command
#[derive(Parser, Debug)]
pub struct MessageArgs {
    /// Payload: parsed as JSON when valid, otherwise sent as a string
    pub data: String,

    /// Scope path
    #[arg(short, long, default_value = "/")]
    pub scope: String,
}

/// Arguments for the caches command
#[derive(Parser, Debug)]
pub struct CachesArgs {
    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write the default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for list commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}
