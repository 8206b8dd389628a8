//! Status command - show worker registrations per scope

use crate::cli::host::Host;
use crate::config::Config;
use crate::error::ScopeCacheResult;
use crate::ui::{self, UiContext};

/// Execute the status command
pub async fn execute(config: &Config) -> ScopeCacheResult<()> {
    let host = Host::new(config);
    let ctx = UiContext::detect();
    let registrations = host.registrations.list().await?;

    for scope in &config.scopes {
        ui::section(&ctx, &format!("Scope {}", scope.scope));

        let Some(registration) = registrations.iter().find(|r| r.scope == scope.scope) else {
            ui::step_warn_hint(&ctx, "No worker registered", "Run: scopecache deploy");
            continue;
        };

        ui::key_value_status(
            &ctx,
            "state",
            &registration.state.to_string(),
            registration.state.is_active(),
        );
        ui::key_value(&ctx, "cache", &registration.cache_name);
        ui::key_value(&ctx, "worker", &registration.worker_id.to_string());
        ui::key_value(
            &ctx,
            "updated",
            &registration.updated_at.format("%Y-%m-%d %H:%M").to_string(),
        );

        if registration.cache_name != scope.cache_name {
            ui::step_warn_hint(
                &ctx,
                &format!("Configured cache {} is not installed", scope.cache_name),
                "Run: scopecache deploy",
            );
        }
    }

    Ok(())
}
