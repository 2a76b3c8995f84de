use color_eyre::Result;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::Table;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use watchdeck_core::{ServiceEvent, SyncService, WatchlistStore};
use watchdeck_remote::{ChangeFeed, PollingChangeFeed, SessionProvider, WatchlistTable};

use crate::commands::{build_backend, load_config, require_session};
use crate::output::{Output, OutputFormat};
use watchdeck_config::PathManager;

/// Mirror the watchlist live until interrupted: load it for the signed-in
/// session, subscribe to the change feed, and re-render on every event.
pub async fn run_follow(output: &Output) -> Result<()> {
    let paths = PathManager::default();
    let config = load_config(&paths)?;
    let backend = build_backend(&config, &paths)?;

    // Fail fast with a clear message before entering the loop
    require_session(&backend.auth).await?;

    let table: Arc<dyn WatchlistTable> = backend.table.clone();
    let feed: Arc<dyn ChangeFeed> = Arc::new(PollingChangeFeed::new(
        table.clone(),
        Duration::from_secs(config.feed.poll_interval_secs),
    ));
    let provider: Arc<dyn SessionProvider> = backend.auth.clone();

    let mut service = SyncService::new(provider, table, feed);
    service.bootstrap().await?;

    print_snapshot(service.store(), output)?;
    output.info("Following watchlist changes (Ctrl-C to stop)");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                output.info("Stopped");
                break;
            }
            event = service.next() => match event {
                ServiceEvent::WatchlistRefreshed => {
                    if let Some(error) = service.store().last_error() {
                        output.warn(format!("Reconciliation failed: {}", error));
                    } else {
                        print_snapshot(service.store(), output)?;
                    }
                }
                ServiceEvent::SessionStarted(user) => {
                    output.info(format!("Session started for {}", user));
                    print_snapshot(service.store(), output)?;
                }
                ServiceEvent::SessionEnded => {
                    output.info("Signed out, watchlist cleared");
                }
                ServiceEvent::SessionRefreshed => {
                    debug!("Session token refreshed, nothing to re-render");
                }
                ServiceEvent::Closed => break,
            }
        }
    }

    Ok(())
}

fn print_snapshot(store: &WatchlistStore, output: &Output) -> Result<()> {
    match output.format() {
        OutputFormat::Human => {
            if store.is_empty() {
                output.info("Watchlist is empty");
                return Ok(());
            }
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL_CONDENSED)
                .set_header(vec!["Type", "ID", "Title"]);
            for entry in store.entries() {
                table.add_row(vec![
                    entry.media_type.as_str(),
                    entry.media_id.as_str(),
                    entry.title.as_str(),
                ]);
            }
            output.println(table.to_string());
        }
        _ => {
            output.json(&serde_json::to_value(store.entries())?);
        }
    }
    Ok(())
}
