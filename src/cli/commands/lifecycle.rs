//! Install, activate and deploy commands

use crate::cli::args::{DeployArgs, ScopeArgs};
use crate::cli::host::Host;
use crate::config::Config;
use crate::error::ScopeCacheResult;
use crate::ui::{self, TaskSpinner, UiContext};
use crate::worker::{ServiceWorker, WorkerState};

/// Execute the install command
///
/// A worker that skipped waiting takes control of its scope right away.
pub async fn install(args: ScopeArgs, config: &Config) -> ScopeCacheResult<()> {
    let host = Host::new(config);
    let ctx = UiContext::detect();

    roll_out(&host, &ctx, &args.scope, false).await
}

/// Execute the activate command
pub async fn activate(args: ScopeArgs, config: &Config) -> ScopeCacheResult<()> {
    let host = Host::new(config);
    let ctx = UiContext::detect();

    let mut worker = host.restore_worker(&args.scope).await?;
    activate_worker(&host, &ctx, &mut worker).await
}

/// Execute the deploy command
pub async fn deploy(args: DeployArgs, config: &Config) -> ScopeCacheResult<()> {
    let host = Host::new(config);
    let ctx = UiContext::detect();

    for scope in host.target_scopes(args.scope.as_deref())? {
        roll_out(&host, &ctx, &scope, true).await?;
    }
    Ok(())
}

/// Install a new version for a scope, activate it unless it is left waiting,
/// and retire the version it replaces.
async fn roll_out(
    host: &Host,
    ctx: &UiContext,
    scope: &str,
    activate_waiting: bool,
) -> ScopeCacheResult<()> {
    let mut worker = host.new_worker(scope)?;
    let previous = host
        .registrations
        .load(&worker.scope().config.scope)
        .await?;

    install_worker(host, ctx, &mut worker).await?;

    if worker.state() == WorkerState::Waiting && !activate_waiting {
        ui::step_warn_hint(
            ctx,
            &format!("{} is waiting", scope),
            "Run: scopecache activate",
        );
        return Ok(());
    }

    activate_worker(host, ctx, &mut worker).await?;

    if let Some(previous) = previous {
        if let Some(old) = host.retire(&previous, &worker)? {
            ui::step_info(ctx, &format!("Superseded worker {}", old.id()));
        }
    }
    Ok(())
}

async fn install_worker(
    host: &Host,
    ctx: &UiContext,
    worker: &mut ServiceWorker,
) -> ScopeCacheResult<()> {
    let scope = worker.scope().config.scope.clone();
    let cache = worker.scope().cache_name().to_string();
    let spinner = TaskSpinner::start(ctx, &format!("Installing {} ({})", scope, cache));

    if let Err(e) = worker.install().await {
        spinner.stop_error(&format!("Install of {} failed", scope));
        host.registrations.record(worker).await?;
        return Err(e);
    }
    host.registrations.record(worker).await?;

    let cached = host.store.entries(&cache).await.map(|e| e.len()).unwrap_or(0);
    let expected = worker.scope().config.manifest.len();
    spinner.stop(&format!("Installed {} ({}/{} cached)", scope, cached, expected));

    if cached < expected {
        ui::step_warn_hint(
            ctx,
            &format!("Manifest for {} was not cached", scope),
            "Run with -v to see the failing request",
        );
    }
    Ok(())
}

async fn activate_worker(
    host: &Host,
    ctx: &UiContext,
    worker: &mut ServiceWorker,
) -> ScopeCacheResult<()> {
    let before = host.store.keys().await?;
    worker.activate().await?;
    host.registrations.record(worker).await?;

    let after = host.store.keys().await?;
    let evicted: Vec<&String> = before.iter().filter(|name| !after.contains(name)).collect();

    ui::step_ok(
        ctx,
        &format!("{} active ({})", worker.scope().config.scope, worker.scope().cache_name()),
    );
    for name in evicted {
        ui::step_info(ctx, &format!("Evicted {}", name));
    }
    Ok(())
}
