use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::path::PathBuf;
use tokio::sync::{watch, RwLock};
use tracing::{info, warn};
use watchdeck_config::{BackendConfig, CredentialStore};
use watchdeck_models::{Session, UserId};

use crate::error::RemoteError;
use crate::supabase::api_rejection;
use crate::traits::SessionProvider;

/// Refresh the access token when it expires within this window.
const EXPIRY_MARGIN_MINUTES: i64 = 5;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: u64,
    user: AuthUser,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    email: Option<String>,
}

#[derive(Debug, Clone)]
struct TokenState {
    access_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
    user_id: UserId,
    email: Option<String>,
}

impl TokenState {
    fn session(&self) -> Session {
        Session {
            user_id: self.user_id.clone(),
            email: self.email.clone(),
            access_token: self.access_token.clone(),
            expires_at: self.expires_at,
        }
    }
}

/// Password-grant client for the hosted identity provider.
///
/// Tokens persist in `credentials.toml` so sessions survive process restarts;
/// near-expiry tokens are refreshed transparently by `current_session`.
/// Auth-state changes (sign-in, sign-out, refresh) are broadcast on a watch
/// channel consumed by the sync service.
pub struct SupabaseAuth {
    client: Client,
    base_url: String,
    anon_key: String,
    credentials_path: PathBuf,
    state: RwLock<Option<TokenState>>,
    sessions: watch::Sender<Option<Session>>,
}

impl SupabaseAuth {
    pub fn new(config: &BackendConfig, credentials_path: PathBuf) -> Result<Self, RemoteError> {
        if config.url.is_empty() || config.anon_key.is_empty() {
            return Err(RemoteError::NotConfigured(
                "backend URL and anon key are required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        let state = load_persisted(&credentials_path);
        let (sessions, _) = watch::channel(None);

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            credentials_path,
            state: RwLock::new(state),
            sessions,
        })
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, RemoteError> {
        let url = format!("{}/auth/v1/token", self.base_url);
        let payload = serde_json::json!({
            "email": email,
            "password": password,
        });

        let response = self
            .client
            .post(&url)
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_rejection(response).await);
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Parse(format!("Failed to parse token response: {}", e)))?;

        let state = self.install(token).await?;
        info!(user = %state.user_id, "Signed in");
        Ok(state.session())
    }

    /// Clear the session locally and revoke it remotely. Local state is
    /// cleared even when the revocation call fails.
    pub async fn sign_out(&self) -> Result<(), RemoteError> {
        let state = self.state.write().await.take();

        if let Some(state) = state {
            let url = format!("{}/auth/v1/logout", self.base_url);
            let result = self
                .client
                .post(&url)
                .header("apikey", &self.anon_key)
                .bearer_auth(&state.access_token)
                .send()
                .await;
            match result {
                Ok(response) if !response.status().is_success() => {
                    warn!(status = %response.status(), "Remote sign-out rejected, clearing local session anyway");
                }
                Err(e) => {
                    warn!(error = %e, "Remote sign-out failed, clearing local session anyway");
                }
                Ok(_) => {}
            }
        }

        self.clear_persisted()?;
        self.sessions.send_replace(None);
        info!("Signed out");
        Ok(())
    }

    /// The persisted session, refreshed if it is about to expire. Returns
    /// None (and clears stale tokens) when no valid session can be produced.
    pub async fn resolve_session(&self) -> Result<Option<Session>, RemoteError> {
        let current = self.state.read().await.clone();
        let Some(state) = current else {
            return Ok(None);
        };

        if state.expires_at > Utc::now() + Duration::minutes(EXPIRY_MARGIN_MINUTES) {
            return Ok(Some(state.session()));
        }

        info!(expires_at = %state.expires_at, "Access token expired or expiring soon, refreshing");
        match self.refresh(&state.refresh_token).await {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!(error = %e, "Token refresh failed, clearing saved session");
                *self.state.write().await = None;
                self.clear_persisted()?;
                self.sessions.send_replace(None);
                Ok(None)
            }
        }
    }

    /// A valid bearer token for data-plane calls.
    pub async fn access_token(&self) -> Result<String, RemoteError> {
        match self.resolve_session().await? {
            Some(session) => Ok(session.access_token),
            None => Err(RemoteError::Unauthenticated),
        }
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Session, RemoteError> {
        let url = format!("{}/auth/v1/token", self.base_url);
        let payload = serde_json::json!({ "refresh_token": refresh_token });

        let response = self
            .client
            .post(&url)
            .query(&[("grant_type", "refresh_token")])
            .header("apikey", &self.anon_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_rejection(response).await);
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Parse(format!("Failed to parse token response: {}", e)))?;

        let state = self.install(token).await?;
        Ok(state.session())
    }

    /// Store a fresh token set, persist it, and broadcast the new session.
    async fn install(&self, token: TokenResponse) -> Result<TokenState, RemoteError> {
        // Shave two minutes off the advertised lifetime so a token is never
        // used right at its expiry boundary.
        let expires_at = Utc::now() + Duration::seconds(token.expires_in as i64 - 120);
        let state = TokenState {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at,
            user_id: UserId::new(token.user.id),
            email: token.user.email,
        };

        self.persist(&state)?;
        *self.state.write().await = Some(state.clone());
        self.sessions.send_replace(Some(state.session()));
        Ok(state)
    }

    fn persist(&self, state: &TokenState) -> Result<(), RemoteError> {
        let mut store = CredentialStore::new(self.credentials_path.clone());
        if let Err(e) = store.load() {
            warn!(error = %e, "Failed to load credentials file, rewriting it");
        }
        store.set_access_token(state.access_token.clone());
        store.set_refresh_token(state.refresh_token.clone());
        store.set_token_expires(state.expires_at);
        store.set_user_id(state.user_id.as_str().to_string());
        if let Some(ref email) = state.email {
            store.set_user_email(email.clone());
        }
        store
            .save()
            .map_err(|e| RemoteError::Parse(format!("Failed to save credentials: {}", e)))?;
        Ok(())
    }

    fn clear_persisted(&self) -> Result<(), RemoteError> {
        let mut store = CredentialStore::new(self.credentials_path.clone());
        if store.load().is_ok() {
            store.clear();
            store
                .save()
                .map_err(|e| RemoteError::Parse(format!("Failed to save credentials: {}", e)))?;
        }
        Ok(())
    }
}

#[async_trait]
impl SessionProvider for SupabaseAuth {
    async fn current_session(&self) -> Result<Option<Session>, RemoteError> {
        self.resolve_session().await
    }

    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.sessions.subscribe()
    }
}

fn load_persisted(credentials_path: &PathBuf) -> Option<TokenState> {
    let mut store = CredentialStore::new(credentials_path.clone());
    store.load().ok()?;

    let access_token = store.get_access_token()?.clone();
    let refresh_token = store.get_refresh_token()?.clone();
    let expires_at = store.get_token_expires()?;
    let user_id = UserId::new(store.get_user_id()?.clone());
    let email = store.get_user_email().cloned();

    Some(TokenState {
        access_token,
        refresh_token,
        expires_at,
        user_id,
        email,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn backend_config() -> BackendConfig {
        BackendConfig {
            url: "https://example.supabase.co".to_string(),
            anon_key: "anon-key".to_string(),
        }
    }

    #[tokio::test]
    async fn test_no_persisted_session_resolves_none() {
        let dir = TempDir::new().unwrap();
        let auth =
            SupabaseAuth::new(&backend_config(), dir.path().join("credentials.toml")).unwrap();
        assert!(auth.resolve_session().await.unwrap().is_none());
        assert!(matches!(
            auth.access_token().await,
            Err(RemoteError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn test_persisted_session_is_loaded_when_fresh() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.toml");

        let mut store = CredentialStore::new(path.clone());
        store.set_access_token("access".to_string());
        store.set_refresh_token("refresh".to_string());
        store.set_token_expires(Utc::now() + Duration::hours(1));
        store.set_user_id("user-1".to_string());
        store.set_user_email("user@example.com".to_string());
        store.save().unwrap();

        let auth = SupabaseAuth::new(&backend_config(), path).unwrap();
        let session = auth.resolve_session().await.unwrap().unwrap();
        assert_eq!(session.user_id.as_str(), "user-1");
        assert_eq!(session.email.as_deref(), Some("user@example.com"));
        assert_eq!(auth.access_token().await.unwrap(), "access");
    }

    #[test]
    fn test_rejects_unconfigured_backend() {
        let config = BackendConfig {
            url: String::new(),
            anon_key: String::new(),
        };
        assert!(SupabaseAuth::new(&config, PathBuf::from("/tmp/creds.toml")).is_err());
    }
}
