//! Google client secrets (`credentials.json`) for a desktop OAuth client.

use serde::Deserialize;
use std::path::Path;

use sched2cal_core::AuthError;

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Client id and secret plus the endpoints they belong to.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: String,
    pub token_uri: String,
}

#[derive(Debug, Deserialize)]
struct SecretsFile {
    installed: Option<SecretsEntry>,
    web: Option<SecretsEntry>,
}

#[derive(Debug, Deserialize)]
struct SecretsEntry {
    client_id: String,
    client_secret: String,
    auth_uri: Option<String>,
    token_uri: Option<String>,
}

impl ClientSecrets {
    /// Secrets for Google's public endpoints.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            auth_uri: GOOGLE_AUTH_URL.to_string(),
            token_uri: GOOGLE_TOKEN_URL.to_string(),
        }
    }

    /// Parse the JSON downloaded from the Google Cloud console.
    ///
    /// Accepts both the `installed` and `web` layouts.
    pub fn from_json(json: &str) -> Result<Self, AuthError> {
        let file: SecretsFile = serde_json::from_str(json)
            .map_err(|e| AuthError::CredentialsMissing(format!("invalid JSON: {}", e)))?;

        let entry = file.installed.or(file.web).ok_or_else(|| {
            AuthError::CredentialsMissing("expected an 'installed' or 'web' section".into())
        })?;

        Ok(Self {
            client_id: entry.client_id,
            client_secret: entry.client_secret,
            auth_uri: entry.auth_uri.unwrap_or_else(|| GOOGLE_AUTH_URL.to_string()),
            token_uri: entry.token_uri.unwrap_or_else(|| GOOGLE_TOKEN_URL.to_string()),
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, AuthError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| AuthError::CredentialsMissing(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Resolve secrets from config overrides, falling back to the file.
    pub fn resolve(
        path: &Path,
        client_id: Option<&str>,
        client_secret: Option<&str>,
    ) -> Result<Self, AuthError> {
        match (client_id, client_secret) {
            (Some(id), Some(secret)) => Ok(Self::new(id, secret)),
            _ => Self::from_file(path),
        }
    }
}
