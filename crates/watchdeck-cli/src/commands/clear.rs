use color_eyre::Result;
use std::fs;
use watchdeck_config::PathManager;

use crate::output::Output;

pub async fn run_clear(all: bool, credentials: bool, logs: bool, output: &Output) -> Result<()> {
    let paths = PathManager::default();

    if all {
        clear_credentials(&paths, output)?;
        clear_logs(&paths, output)?;
        output.success("All credentials and logs cleared");
        return Ok(());
    }

    let mut cleared_anything = false;

    if credentials {
        clear_credentials(&paths, output)?;
        cleared_anything = true;
    }

    if logs {
        clear_logs(&paths, output)?;
        cleared_anything = true;
    }

    if !cleared_anything {
        output.warn("No clear option specified. Use --credentials, --logs, or --all");
        output.println("\nExample: watchdeck clear --credentials");
    }

    Ok(())
}

fn clear_credentials(paths: &PathManager, output: &Output) -> Result<()> {
    let path = paths.credentials_file();
    if path.exists() {
        fs::remove_file(&path).map_err(|e| {
            color_eyre::eyre::eyre!("Failed to remove credentials at {}: {}", path.display(), e)
        })?;
        output.success(format!("Cleared credentials: {}", path.display()));
    } else {
        output.info("No saved credentials to clear");
    }
    Ok(())
}

fn clear_logs(paths: &PathManager, output: &Output) -> Result<()> {
    let dir = paths.log_dir();
    if dir.exists() {
        fs::remove_dir_all(dir).map_err(|e| {
            color_eyre::eyre::eyre!("Failed to remove logs at {}: {}", dir.display(), e)
        })?;
        output.success(format!("Cleared logs: {}", dir.display()));
    } else {
        output.info("No logs to clear");
    }
    Ok(())
}
