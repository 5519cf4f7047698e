//! Installed-app OAuth2 flow: PKCE authorization URL, loopback callback, code exchange.

use oauth2::basic::BasicClient;
use oauth2::reqwest::async_http_client;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, PkceCodeChallenge,
    PkceCodeVerifier, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Mutex};
use warp::Filter;

use sched2cal_core::AuthError;

use crate::storage::TokenSet;

/// How long to wait for the user to finish consenting in the browser.
const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

const SUCCESS_PAGE: &str = "<html><body><h1>Authorization complete</h1><p>You can close this window and return to the terminal.</p></body></html>";

/// OAuth2 configuration
#[derive(Debug, Clone)]
pub struct OAuth2Config {
    pub client_id: String,
    pub client_secret: String,

    /// Authorization endpoint URL
    pub auth_url: String,

    /// Token endpoint URL
    pub token_url: String,

    pub scopes: Vec<String>,

    /// Provider-specific query parameters (e.g. `access_type=offline`)
    pub extra_params: Vec<(String, String)>,
}

/// Authorization URL plus the secrets needed to finish the flow.
pub struct AuthorizationRequest {
    pub url: String,
    pub csrf_token: CsrfToken,
    pub pkce_verifier: PkceCodeVerifier,
}

/// Query parameters Google sends to the redirect URI.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

impl CallbackParams {
    pub fn from_query(params: &HashMap<String, String>) -> Self {
        Self {
            code: params.get("code").cloned(),
            state: params.get("state").cloned(),
            error: params.get("error").cloned(),
        }
    }

    /// Validate the callback and return the authorization code.
    pub fn into_code(self, expected_state: &str) -> Result<String, AuthError> {
        if let Some(error) = self.error {
            return if error == "access_denied" {
                Err(AuthError::OAuthCancelled)
            } else {
                Err(AuthError::OAuthFailed(error))
            };
        }

        if self.state.as_deref() != Some(expected_state) {
            return Err(AuthError::CsrfMismatch);
        }

        self.code
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AuthError::OAuthFailed("callback did not include a code".into()))
    }
}

type CallbackSlot = Arc<Mutex<Option<oneshot::Sender<CallbackParams>>>>;

fn client(config: &OAuth2Config, redirect_uri: &str) -> Result<BasicClient, AuthError> {
    let auth_url = AuthUrl::new(config.auth_url.clone())
        .map_err(|e| AuthError::OAuthFailed(format!("invalid auth URL: {}", e)))?;
    let token_url = TokenUrl::new(config.token_url.clone())
        .map_err(|e| AuthError::OAuthFailed(format!("invalid token URL: {}", e)))?;
    let redirect_url = RedirectUrl::new(redirect_uri.to_string())
        .map_err(|e| AuthError::OAuthFailed(format!("invalid redirect URI: {}", e)))?;

    Ok(BasicClient::new(
        ClientId::new(config.client_id.clone()),
        Some(ClientSecret::new(config.client_secret.clone())),
        auth_url,
        Some(token_url),
    )
    .set_redirect_uri(redirect_url))
}

/// Build the consent URL with a fresh CSRF state and PKCE challenge.
pub fn authorization_request(
    config: &OAuth2Config,
    redirect_uri: &str,
) -> Result<AuthorizationRequest, AuthError> {
    let client = client(config, redirect_uri)?;
    let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

    let mut request = client.authorize_url(CsrfToken::new_random);
    for scope in &config.scopes {
        request = request.add_scope(Scope::new(scope.clone()));
    }
    for (key, value) in &config.extra_params {
        request = request.add_extra_param(key.as_str(), value.as_str());
    }

    let (url, csrf_token) = request.set_pkce_challenge(pkce_challenge).url();

    Ok(AuthorizationRequest {
        url: url.to_string(),
        csrf_token,
        pkce_verifier,
    })
}

/// Exchange an authorization code for tokens.
#[tracing::instrument(skip_all, level = "info")]
pub async fn exchange_code(
    config: &OAuth2Config,
    redirect_uri: &str,
    code: String,
    pkce_verifier: PkceCodeVerifier,
) -> Result<TokenSet, AuthError> {
    let client = client(config, redirect_uri)?;

    let token = client
        .exchange_code(AuthorizationCode::new(code))
        .set_pkce_verifier(pkce_verifier)
        .request_async(async_http_client)
        .await
        .map_err(|e| AuthError::OAuthFailed(format!("code exchange failed: {}", e)))?;

    let expires_in = token
        .expires_in()
        .map(|d| d.as_secs() as i64)
        .unwrap_or(3600);

    let scopes = token
        .scopes()
        .map(|s| s.iter().map(|scope| scope.to_string()).collect())
        .unwrap_or_else(|| config.scopes.clone());

    Ok(TokenSet {
        access_token: token.access_token().secret().clone(),
        refresh_token: token.refresh_token().map(|t| t.secret().clone()),
        expires_at: chrono::Utc::now().timestamp() + expires_in,
        scopes,
    })
}

/// Full desktop flow: loopback server, browser consent, code exchange.
///
/// `port` 0 binds an ephemeral port.
pub async fn run_installed_flow(config: &OAuth2Config, port: u16) -> Result<TokenSet, AuthError> {
    let (tx, rx) = oneshot::channel::<CallbackParams>();
    let slot: CallbackSlot = Arc::new(Mutex::new(Some(tx)));

    let routes = warp::get()
        .and(warp::path("callback"))
        .and(warp::query::<HashMap<String, String>>())
        .and(warp::any().map(move || slot.clone()))
        .and_then(|params: HashMap<String, String>, slot: CallbackSlot| async move {
            if let Some(sender) = slot.lock().await.take() {
                let _ = sender.send(CallbackParams::from_query(&params));
            }
            Ok::<_, warp::Rejection>(warp::reply::html(SUCCESS_PAGE))
        });

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let (addr, server) = warp::serve(routes)
        .try_bind_with_graceful_shutdown(([127, 0, 0, 1], port), async move {
            let _ = shutdown_rx.await;
        })
        .map_err(|_| AuthError::PortInUse(port))?;
    tokio::spawn(server);

    let redirect_uri = format!("http://127.0.0.1:{}/callback", addr.port());
    let request = authorization_request(config, &redirect_uri)?;

    tracing::info!("Opening browser for Google authorization...");
    if let Err(e) = webbrowser::open(&request.url) {
        tracing::warn!("Could not open a browser: {}", e);
    }
    println!("If the browser did not open, visit:\n{}", request.url);

    let callback = tokio::time::timeout(CALLBACK_TIMEOUT, rx).await;
    let _ = shutdown_tx.send(());

    let params = match callback {
        Ok(Ok(params)) => params,
        Ok(Err(_)) => return Err(AuthError::OAuthFailed("callback server stopped".into())),
        Err(_) => return Err(AuthError::OAuthCancelled),
    };

    let code = params.into_code(request.csrf_token.secret())?;
    let token = exchange_code(config, &redirect_uri, code, request.pkce_verifier).await?;

    tracing::info!("Google authorization completed");
    Ok(token)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    fn config() -> OAuth2Config {
        OAuth2Config {
            client_id: "test_client_id".to_string(),
            client_secret: "test_client_secret".to_string(),
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            scopes: vec!["https://www.googleapis.com/auth/calendar".to_string()],
            extra_params: vec![("access_type".to_string(), "offline".to_string())],
        }
    }

    #[test]
    fn test_authorization_url_contents() {
        let request =
            authorization_request(&config(), "http://127.0.0.1:8080/callback").unwrap();

        assert!(request.url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(request.url.contains("client_id=test_client_id"));
        assert!(request.url.contains("code_challenge="));
        assert!(request.url.contains("access_type=offline"));
        assert!(request.url.contains("auth%2Fcalendar"));
        assert!(request.url.contains(request.csrf_token.secret().as_str()));
    }

    #[test]
    fn test_state_is_unique() {
        let a = authorization_request(&config(), "http://127.0.0.1:1/callback").unwrap();
        let b = authorization_request(&config(), "http://127.0.0.1:1/callback").unwrap();
        assert_ne!(a.csrf_token.secret(), b.csrf_token.secret());
    }

    #[test]
    fn test_callback_returns_code() {
        let mut query = HashMap::new();
        query.insert("code".to_string(), "abc".to_string());
        query.insert("state".to_string(), "xyz".to_string());

        let code = CallbackParams::from_query(&query).into_code("xyz").unwrap();
        assert_eq!(code, "abc");
    }

    #[test]
    fn test_callback_state_mismatch() {
        let params = CallbackParams {
            code: Some("abc".into()),
            state: Some("other".into()),
            error: None,
        };
        assert!(matches!(params.into_code("xyz"), Err(AuthError::CsrfMismatch)));
    }

    #[test]
    fn test_callback_access_denied() {
        let params = CallbackParams {
            error: Some("access_denied".into()),
            ..CallbackParams::default()
        };
        assert!(matches!(params.into_code("xyz"), Err(AuthError::OAuthCancelled)));
    }

    #[test]
    fn test_callback_without_code() {
        let params = CallbackParams {
            state: Some("xyz".into()),
            ..CallbackParams::default()
        };
        assert!(matches!(params.into_code("xyz"), Err(AuthError::OAuthFailed(_))));
    }
}
