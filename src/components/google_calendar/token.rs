use super::auth::{authorize, TOKEN_URL};
use crate::config::Config;
use crate::error::{google_calendar_error, SyncResult};
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Seconds before expiry at which a token is already treated as expired
const EXPIRY_MARGIN_SECS: i64 = 60;

/// OAuth token as cached on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Unix timestamp
    pub expires_at: i64,
}

impl StoredToken {
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at - EXPIRY_MARGIN_SECS <= now
    }
}

/// Token endpoint response
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
}

impl TokenResponse {
    /// Convert to a cached token, keeping `previous_refresh` when Google omits one
    pub fn into_stored(self, previous_refresh: Option<String>) -> StoredToken {
        StoredToken {
            access_token: self.access_token,
            refresh_token: self.refresh_token.or(previous_refresh),
            expires_at: Utc::now().timestamp() + self.expires_in.unwrap_or(3600),
        }
    }
}

/// Read a cached token, `None` if the file does not exist yet
pub fn load_token(path: &Path) -> SyncResult<Option<StoredToken>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&content)?))
}

pub fn save_token(path: &Path, token: &StoredToken) -> SyncResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, serde_json::to_string_pretty(token)?)?;
    Ok(())
}

/// Hands out valid access tokens, refreshing or re-authorizing as needed
pub struct TokenManager {
    config: Arc<Config>,
    client: Client,
    cached: Mutex<Option<StoredToken>>,
}

impl TokenManager {
    pub fn new(config: Arc<Config>, client: Client) -> Self {
        Self {
            config,
            client,
            cached: Mutex::new(None),
        }
    }

    /// Get a usable access token
    pub async fn get_token(&self) -> SyncResult<String> {
        let mut cached = self.cached.lock().await;

        if cached.is_none() {
            *cached = load_token(&self.config.token_path)?;
        }

        let now = Utc::now().timestamp();
        let token = match cached.take() {
            Some(token) if !token.is_expired(now) => token,
            Some(StoredToken {
                refresh_token: Some(refresh_token),
                ..
            }) => {
                let token = self.refresh_token(&refresh_token).await?;
                save_token(&self.config.token_path, &token)?;
                token
            }
            _ => {
                let token = authorize(&self.config, &self.client).await?;
                save_token(&self.config.token_path, &token)?;
                token
            }
        };

        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    /// Refresh an expired token
    async fn refresh_token(&self, refresh_token: &str) -> SyncResult<StoredToken> {
        info!("Refreshing Google Calendar token");

        let params = [
            ("client_id", self.config.google_client_id.as_str()),
            ("client_secret", self.config.google_client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .client
            .post(TOKEN_URL)
            .form(&params)
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to refresh token: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&format!(
                "Failed to refresh token: HTTP {} - {}",
                status, error_body
            )));
        }

        let new_token: TokenResponse = response.json().await.map_err(|e| {
            google_calendar_error(&format!("Failed to parse token response: {}", e))
        })?;

        Ok(new_token.into_stored(Some(refresh_token.to_string())))
    }
}
