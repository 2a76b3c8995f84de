pub mod auth;
pub mod browse;
pub mod clear;
pub mod config;
pub mod follow;
pub mod watchlist;

use clap::ValueEnum;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use indicatif::ProgressBar;
use std::sync::Arc;
use std::time::Duration;
use watchdeck_config::{Config, PathManager};
use watchdeck_models::{MediaType, Session};
use watchdeck_remote::{SupabaseAuth, SupabaseWatchlistTable};

use crate::output::{Output, OutputFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MediaKind {
    Movie,
    Tv,
}

impl From<MediaKind> for MediaType {
    fn from(kind: MediaKind) -> Self {
        match kind {
            MediaKind::Movie => MediaType::Movie,
            MediaKind::Tv => MediaType::Tv,
        }
    }
}

/// Load and validate the config, writing a template on first run.
pub(crate) fn load_config(paths: &PathManager) -> Result<Config> {
    let path = paths.config_file();

    if !path.exists() {
        Config::template()
            .save_to_file(&path)
            .map_err(|e| eyre!("Failed to write config template to {}: {}", path.display(), e))?;
        return Err(eyre!(
            "No configuration found. A template was written to {}; fill it in or run `watchdeck config`",
            path.display()
        ));
    }

    let config = Config::load_from_file(&path)
        .map_err(|e| eyre!("Failed to load config from {}: {}", path.display(), e))?;
    config
        .validate()
        .map_err(|e| eyre!("{}. Run `watchdeck config` to fix it", e))?;
    Ok(config)
}

pub(crate) struct Backend {
    pub auth: Arc<SupabaseAuth>,
    pub table: Arc<SupabaseWatchlistTable>,
}

pub(crate) fn build_backend(config: &Config, paths: &PathManager) -> Result<Backend> {
    let auth = Arc::new(SupabaseAuth::new(
        &config.backend,
        paths.credentials_file(),
    )?);
    let table = Arc::new(SupabaseWatchlistTable::new(&config.backend, auth.clone())?);
    Ok(Backend { auth, table })
}

pub(crate) async fn require_session(auth: &SupabaseAuth) -> Result<Session> {
    match auth.resolve_session().await? {
        Some(session) => Ok(session),
        None => Err(eyre!("Not signed in. Run `watchdeck login` first")),
    }
}

/// Spinner for interactive human output; None in quiet/JSON modes.
pub(crate) fn spinner(output: &Output, msg: &str) -> Option<ProgressBar> {
    if output.is_quiet() || output.format() != OutputFormat::Human {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}
