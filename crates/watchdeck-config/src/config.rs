use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub backend: BackendConfig,
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub feed: FeedConfig,
}

/// Hosted backend (auth + watchlist row store) connection settings.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BackendConfig {
    /// Project base URL, e.g. https://xyzcompany.supabase.co
    pub url: String,
    /// Public anon API key (row-level security enforces per-user access).
    pub anon_key: String,
}

/// Metadata catalog (TMDB) settings.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CatalogConfig {
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_base_url: Option<String>,
}

/// Watchlist change-feed settings.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FeedConfig {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

fn default_poll_interval_secs() -> u64 {
    5
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.backend.url.is_empty() || self.backend.url == "YOUR_PROJECT_URL" {
            return Err(anyhow::anyhow!("backend.url is not configured"));
        }
        if !self.backend.url.starts_with("http://") && !self.backend.url.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "backend.url must start with http:// or https://: {}",
                self.backend.url
            ));
        }
        if self.backend.anon_key.is_empty() || self.backend.anon_key == "YOUR_ANON_KEY" {
            return Err(anyhow::anyhow!("backend.anon_key is not configured"));
        }
        if self.catalog.api_key.is_empty() || self.catalog.api_key == "YOUR_API_KEY" {
            return Err(anyhow::anyhow!("catalog.api_key is not configured"));
        }
        if self.feed.poll_interval_secs == 0 {
            return Err(anyhow::anyhow!("feed.poll_interval_secs must be at least 1"));
        }
        Ok(())
    }

    pub fn is_backend_configured(&self) -> bool {
        !self.backend.url.is_empty()
            && self.backend.url != "YOUR_PROJECT_URL"
            && !self.backend.anon_key.is_empty()
            && self.backend.anon_key != "YOUR_ANON_KEY"
    }

    pub fn is_catalog_configured(&self) -> bool {
        !self.catalog.api_key.is_empty() && self.catalog.api_key != "YOUR_API_KEY"
    }

    /// Placeholder config written on first run for the user to fill in.
    pub fn template() -> Self {
        Self {
            backend: BackendConfig {
                url: "YOUR_PROJECT_URL".to_string(),
                anon_key: "YOUR_ANON_KEY".to_string(),
            },
            catalog: CatalogConfig {
                api_key: "YOUR_API_KEY".to_string(),
                base_url: None,
                image_base_url: None,
            },
            feed: FeedConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn configured() -> Config {
        Config {
            backend: BackendConfig {
                url: "https://example.supabase.co".to_string(),
                anon_key: "anon-key".to_string(),
            },
            catalog: CatalogConfig {
                api_key: "tmdb-key".to_string(),
                base_url: None,
                image_base_url: None,
            },
            feed: FeedConfig::default(),
        }
    }

    #[test]
    fn test_config_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();

        let config = configured();
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.backend.url, "https://example.supabase.co");
        assert_eq!(loaded.backend.anon_key, "anon-key");
        assert_eq!(loaded.catalog.api_key, "tmdb-key");
        assert_eq!(loaded.feed.poll_interval_secs, 5);
    }

    #[test]
    fn test_config_validate_rejects_placeholders() {
        let template = Config::template();
        assert!(template.validate().is_err());
        assert!(!template.is_backend_configured());
        assert!(!template.is_catalog_configured());

        let config = configured();
        assert!(config.validate().is_ok());
        assert!(config.is_backend_configured());
        assert!(config.is_catalog_configured());
    }

    #[test]
    fn test_config_validate_rejects_bad_url() {
        let mut config = configured();
        config.backend.url = "example.supabase.co".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_feed_defaults_when_section_missing() {
        let toml_str = r#"
            [backend]
            url = "https://example.supabase.co"
            anon_key = "anon-key"

            [catalog]
            api_key = "tmdb-key"
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.feed.poll_interval_secs, 5);
    }
}
