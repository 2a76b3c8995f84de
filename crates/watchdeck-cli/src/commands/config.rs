use color_eyre::eyre::eyre;
use color_eyre::Result;
use dialoguer::Input;
use serde_json::json;
use watchdeck_config::{Config, PathManager};

use crate::output::{Output, OutputFormat};
use crate::ConfigCommands;

pub async fn run_config(cmd: Option<ConfigCommands>, output: &Output) -> Result<()> {
    let cmd = cmd.unwrap_or(ConfigCommands::Show { full: false });
    let paths = PathManager::default();

    match cmd {
        ConfigCommands::Show { full } => run_show(&paths, full, output),
        ConfigCommands::Backend { url, anon_key } => run_backend(&paths, url, anon_key, output),
        ConfigCommands::Catalog { api_key } => run_catalog(&paths, api_key, output),
        ConfigCommands::Feed { poll_interval } => run_feed(&paths, poll_interval, output),
    }
}

/// Existing config, or a fresh template when none has been written yet.
fn load_or_template(paths: &PathManager) -> Result<Config> {
    let path = paths.config_file();
    if path.exists() {
        Config::load_from_file(&path)
            .map_err(|e| eyre!("Failed to load config from {}: {}", path.display(), e))
    } else {
        Ok(Config::template())
    }
}

fn run_show(paths: &PathManager, full: bool, output: &Output) -> Result<()> {
    let config = load_or_template(paths)?;

    let anon_key = if full {
        config.backend.anon_key.clone()
    } else {
        mask(&config.backend.anon_key)
    };
    let api_key = if full {
        config.catalog.api_key.clone()
    } else {
        mask(&config.catalog.api_key)
    };

    match output.format() {
        OutputFormat::Human => {
            output.println(format!("Config file: {}", paths.config_file().display()));
            output.println("");
            output.println("[backend]");
            output.println(format!("url = {}", config.backend.url));
            output.println(format!("anon_key = {}", anon_key));
            output.println("");
            output.println("[catalog]");
            output.println(format!("api_key = {}", api_key));
            output.println("");
            output.println("[feed]");
            output.println(format!("poll_interval_secs = {}", config.feed.poll_interval_secs));
        }
        _ => {
            output.json(&json!({
                "config_file": paths.config_file().display().to_string(),
                "backend": { "url": config.backend.url, "anon_key": anon_key },
                "catalog": { "api_key": api_key },
                "feed": { "poll_interval_secs": config.feed.poll_interval_secs },
            }));
        }
    }

    if !config.is_backend_configured() {
        output.warn("Backend is not configured yet. Run `watchdeck config backend`");
    }
    if !config.is_catalog_configured() {
        output.warn("Catalog is not configured yet. Run `watchdeck config catalog`");
    }
    Ok(())
}

fn run_backend(
    paths: &PathManager,
    url: Option<String>,
    anon_key: Option<String>,
    output: &Output,
) -> Result<()> {
    let mut config = load_or_template(paths)?;

    let url = match url {
        Some(url) => url,
        None => Input::<String>::new()
            .with_prompt("Backend project URL")
            .interact_text()?,
    };
    let anon_key = match anon_key {
        Some(key) => key,
        None => rpassword::prompt_password("Backend anon key: ")?,
    };

    config.backend.url = url.trim_end_matches('/').to_string();
    config.backend.anon_key = anon_key;
    save_config(&config, paths)?;

    output.success("Backend configuration saved");
    Ok(())
}

fn run_catalog(paths: &PathManager, api_key: Option<String>, output: &Output) -> Result<()> {
    let mut config = load_or_template(paths)?;

    let api_key = match api_key {
        Some(key) => key,
        None => rpassword::prompt_password("Catalog API key: ")?,
    };

    config.catalog.api_key = api_key;
    save_config(&config, paths)?;

    output.success("Catalog configuration saved");
    Ok(())
}

fn run_feed(paths: &PathManager, poll_interval: u64, output: &Output) -> Result<()> {
    if poll_interval == 0 {
        return Err(eyre!("Poll interval must be at least 1 second"));
    }

    let mut config = load_or_template(paths)?;
    config.feed.poll_interval_secs = poll_interval;
    save_config(&config, paths)?;

    output.success(format!("Change-feed poll interval set to {}s", poll_interval));
    Ok(())
}

fn save_config(config: &Config, paths: &PathManager) -> Result<()> {
    paths
        .ensure_directories()
        .map_err(|e| eyre!("Failed to create configuration directories: {}", e))?;

    let path = paths.config_file();
    config
        .save_to_file(&path)
        .map_err(|e| eyre!("Failed to save config to {}: {}", path.display(), e))
}

fn mask(value: &str) -> String {
    if value.len() <= 4 {
        "****".to_string()
    } else {
        format!("{}****", &value[..4])
    }
}
