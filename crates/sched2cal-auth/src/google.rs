//! Google OAuth2 provider for Calendar access.

use serde::{Deserialize, Serialize};

use sched2cal_core::AuthError;

use crate::oauth::{self, OAuth2Config};
use crate::secrets::ClientSecrets;
use crate::storage::{TokenSet, TokenStore};

pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleTokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: u64,
    pub token_type: String,
    #[serde(default)]
    pub scope: String,
}

impl GoogleTokenResponse {
    /// Convert to a stored token. Google omits the refresh token on refresh,
    /// so the previous one is carried over.
    pub fn into_token_set(self, previous_refresh: Option<String>) -> TokenSet {
        TokenSet {
            access_token: self.access_token,
            refresh_token: self.refresh_token.or(previous_refresh),
            expires_at: chrono::Utc::now().timestamp() + self.expires_in as i64,
            scopes: self
                .scope
                .split_whitespace()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

pub struct GoogleOAuth2Provider {
    secrets: ClientSecrets,
    client: reqwest::Client,
}

impl GoogleOAuth2Provider {
    pub fn new(secrets: ClientSecrets) -> Self {
        Self {
            secrets,
            client: reqwest::Client::new(),
        }
    }

    pub fn oauth_config(&self) -> OAuth2Config {
        OAuth2Config {
            client_id: self.secrets.client_id.clone(),
            client_secret: self.secrets.client_secret.clone(),
            auth_url: self.secrets.auth_uri.clone(),
            token_url: self.secrets.token_uri.clone(),
            scopes: vec![CALENDAR_SCOPE.to_string()],
            extra_params: vec![
                ("access_type".to_string(), "offline".to_string()),
                ("prompt".to_string(), "consent".to_string()),
            ],
        }
    }

    /// Run the browser consent flow.
    pub async fn authenticate(&self, port: u16) -> Result<TokenSet, AuthError> {
        oauth::run_installed_flow(&self.oauth_config(), port).await
    }

    /// Refresh an expired access token.
    #[tracing::instrument(skip_all, level = "info")]
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<GoogleTokenResponse, AuthError> {
        let response = self
            .client
            .post(&self.secrets.token_uri)
            .form(&[
                ("client_id", self.secrets.client_id.as_str()),
                ("client_secret", self.secrets.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| AuthError::RefreshFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AuthError::RefreshFailed(format!("{}: {}", status, error_text)));
        }

        response
            .json::<GoogleTokenResponse>()
            .await
            .map_err(|e| AuthError::RefreshFailed(format!("invalid token response: {}", e)))
    }
}

/// Hands out a usable access token, persisting whatever it obtains.
pub struct GoogleAuth {
    provider: GoogleOAuth2Provider,
    store: TokenStore,
    callback_port: u16,
}

impl GoogleAuth {
    pub fn new(secrets: ClientSecrets, store: TokenStore, callback_port: u16) -> Self {
        Self {
            provider: GoogleOAuth2Provider::new(secrets),
            store,
            callback_port,
        }
    }

    /// Stored token if still fresh, else a refreshed one, else a new browser login.
    ///
    /// A rejected refresh deletes the stored token before falling back to login.
    pub async fn access_token(&self) -> Result<String, AuthError> {
        if let Some(token) = self.cached_or_refreshed().await? {
            return Ok(token.access_token);
        }

        let token = self.provider.authenticate(self.callback_port).await?;
        self.store.save(&token)?;
        Ok(token.access_token)
    }

    /// Like `access_token` but never opens a browser.
    pub async fn cached_or_refreshed(&self) -> Result<Option<TokenSet>, AuthError> {
        let Some(token) = self.store.load()? else {
            tracing::info!("No stored Google token");
            return Ok(None);
        };

        if !token.needs_refresh() {
            return Ok(Some(token));
        }

        let Some(refresh) = token.refresh_token.clone() else {
            tracing::info!("Google token expired and has no refresh token");
            self.store.delete()?;
            return Ok(None);
        };

        match self.provider.refresh_token(&refresh).await {
            Ok(response) => {
                let renewed = response.into_token_set(Some(refresh));
                self.store.save(&renewed)?;
                tracing::info!("Refreshed Google access token");
                Ok(Some(renewed))
            }
            Err(e) => {
                tracing::warn!("Token refresh rejected, signing in again: {}", e);
                self.store.delete()?;
                Ok(None)
            }
        }
    }
}
