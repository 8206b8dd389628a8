//! Message and purge commands

use crate::cli::args::{MessageArgs, ScopeArgs};
use crate::cli::host::Host;
use crate::config::Config;
use crate::error::ScopeCacheResult;
use crate::ui::{self, UiContext};
use crate::worker::{MessageData, PURGE_CACHE_ACTION};

/// Execute the message command
pub async fn execute(args: MessageArgs, config: &Config) -> ScopeCacheResult<()> {
    let host = Host::new(config);
    let worker = host.active_worker(&args.scope).await?;

    worker.post_message(parse_payload(&args.data)).await?;

    ui::step_ok(
        &UiContext::detect(),
        &format!("Message delivered to {}", args.scope),
    );
    Ok(())
}

/// Execute the purge command
pub async fn purge(args: ScopeArgs, config: &Config) -> ScopeCacheResult<()> {
    let host = Host::new(config);
    let ctx = UiContext::detect();
    let worker = host.active_worker(&args.scope).await?;
    let cache = worker.scope().cache_name().to_string();

    let existed = host.store.has(&cache).await?;
    worker
        .post_message(MessageData::String(PURGE_CACHE_ACTION.to_string()))
        .await?;

    if !existed {
        ui::step_info(&ctx, &format!("Cache {} did not exist", cache));
    } else if host.store.has(&cache).await? {
        ui::step_warn_hint(
            &ctx,
            &format!("Cache {} could not be removed", cache),
            "Run with -v to see the error",
        );
    } else {
        ui::step_ok(&ctx, &format!("Purged cache {}", cache));
    }
    Ok(())
}

/// JSON when it parses, a plain string otherwise
fn parse_payload(raw: &str) -> MessageData {
    serde_json::from_str(raw).unwrap_or_else(|_| MessageData::String(raw.to_string()))
}
