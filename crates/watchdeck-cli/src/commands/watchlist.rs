use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::Table;
use std::sync::Arc;
use watchdeck_config::PathManager;
use watchdeck_core::{SyncPhase, WatchlistStore};
use watchdeck_models::MediaType;
use watchdeck_remote::{CatalogClient, WatchlistTable};

use crate::commands::{build_backend, load_config, require_session, spinner, MediaKind};
use crate::output::{Output, OutputFormat};

/// Build a store for the signed-in session, loaded and ready.
async fn load_store(output: &Output) -> Result<WatchlistStore> {
    let paths = PathManager::default();
    let config = load_config(&paths)?;
    let backend = build_backend(&config, &paths)?;
    let session = require_session(&backend.auth).await?;

    let table: Arc<dyn WatchlistTable> = backend.table.clone();
    let mut store = WatchlistStore::new(table);

    let pb = spinner(output, "Loading watchlist");
    store.begin_session(session).await;
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    if store.phase() == SyncPhase::Error {
        let message = store
            .last_error()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown error".to_string());
        return Err(eyre!("Failed to load watchlist: {}", message));
    }

    Ok(store)
}

pub async fn run_show(output: &Output) -> Result<()> {
    let store = load_store(output).await?;

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

pub async fn run_add(kind: MediaKind, id: u64, output: &Output) -> Result<()> {
    let paths = PathManager::default();
    let config = load_config(&paths)?;
    let catalog = CatalogClient::new(&config.catalog)?;
    let media_type = MediaType::from(kind);

    // Resolve title and poster from the catalog so the saved row is complete
    let pb = spinner(output, "Looking up title");
    let lookup = match media_type {
        MediaType::Movie => catalog
            .movie_details(id)
            .await
            .map(|d| (d.title, d.poster_path)),
        MediaType::Tv => catalog.tv_details(id).await.map(|d| (d.name, d.poster_path)),
    };
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    let (title, poster_path) = lookup?;

    let mut store = load_store(output).await?;
    let media_id = id.to_string();

    if store.is_in_watchlist(&media_id, media_type) {
        output.info(format!("\"{}\" is already in the watchlist", title));
        return Ok(());
    }

    if store
        .add_to_watchlist(&media_id, media_type, &title, poster_path.as_deref())
        .await
    {
        output.success(format!("Added \"{}\" to watchlist", title));
        Ok(())
    } else {
        let message = store
            .last_error()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown error".to_string());
        Err(eyre!("Failed to add to watchlist: {}", message))
    }
}

pub async fn run_remove(kind: MediaKind, id: u64, output: &Output) -> Result<()> {
    let media_type = MediaType::from(kind);
    let media_id = id.to_string();

    let mut store = load_store(output).await?;

    if !store.is_in_watchlist(&media_id, media_type) {
        output.warn(format!(
            "{} {} is not in the local watchlist, removing remotely anyway",
            media_type, media_id
        ));
    }

    if store.remove_from_watchlist(&media_id, media_type).await {
        output.success(format!("Removed {} {} from watchlist", media_type, media_id));
        Ok(())
    } else {
        let message = store
            .last_error()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown error".to_string());
        Err(eyre!("Failed to remove from watchlist: {}", message))
    }
}
