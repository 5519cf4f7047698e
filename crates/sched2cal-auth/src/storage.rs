use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use sched2cal_core::AuthError;

/// Token set for OAuth2 authentication
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenSet {
    /// Access token for API requests
    pub access_token: String,

    /// Optional refresh token for token renewal
    pub refresh_token: Option<String>,

    /// Token expiration timestamp (Unix timestamp)
    pub expires_at: i64,

    /// Scopes granted to this token
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl TokenSet {
    /// Check if the token needs refresh (within 5 minutes of expiry)
    pub fn needs_refresh(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        now >= self.expires_at - 300
    }

    pub fn is_expired(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        now >= self.expires_at
    }
}

/// File-backed token storage.
///
/// One JSON document at a fixed path; readable by the owner only on unix.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored token, or `None` when nothing has been saved yet.
    ///
    /// A file that cannot be parsed is treated as absent so the caller re-authenticates.
    pub fn load(&self) -> Result<Option<TokenSet>, AuthError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.path)
            .map_err(|e| AuthError::StorageError(format!("read {}: {}", self.path.display(), e)))?;

        match serde_json::from_str::<TokenSet>(&json) {
            Ok(token) => {
                tracing::debug!("Loaded token from {}", self.path.display());
                Ok(Some(token))
            }
            Err(e) => {
                tracing::warn!("Ignoring unreadable token file {}: {}", self.path.display(), e);
                Ok(None)
            }
        }
    }

    pub fn save(&self, token: &TokenSet) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| AuthError::StorageError(format!("create {}: {}", parent.display(), e)))?;
        }

        let json = serde_json::to_string_pretty(token)
            .map_err(|e| AuthError::StorageError(e.to_string()))?;

        fs::write(&self.path, json)
            .map_err(|e| AuthError::StorageError(format!("write {}: {}", self.path.display(), e)))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            if let Err(e) = fs::set_permissions(&self.path, perms) {
                tracing::warn!("Could not restrict token file permissions: {}", e);
            }
        }

        tracing::info!("Stored Google token at {}", self.path.display());
        Ok(())
    }

    /// Remove the stored token. Missing files are not an error.
    pub fn delete(&self) -> Result<(), AuthError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!("Deleted Google token at {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AuthError::StorageError(format!(
                "delete {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    fn token(expires_at: i64) -> TokenSet {
        TokenSet {
            access_token: "test".to_string(),
            refresh_token: None,
            expires_at,
            scopes: vec![],
        }
    }

    #[test]
    fn test_token_expiry() {
        let now = chrono::Utc::now().timestamp();

        let expired = token(now - 3600);
        assert!(expired.is_expired());
        assert!(expired.needs_refresh());

        let valid = token(now + 3600);
        assert!(!valid.is_expired());
        assert!(!valid.needs_refresh());

        let soon = token(now + 200);
        assert!(!soon.is_expired());
        assert!(soon.needs_refresh());
    }

    #[test]
    fn test_store_round_trip_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("nested").join("token.json"));

        assert_eq!(store.load().unwrap(), None);

        let saved = TokenSet {
            refresh_token: Some("refresh".into()),
            scopes: vec!["https://www.googleapis.com/auth/calendar".into()],
            ..token(42)
        };
        store.save(&saved).unwrap();
        assert_eq!(store.load().unwrap(), Some(saved));

        store.delete().unwrap();
        assert!(!store.path().exists());
        // Deleting twice is fine
        store.delete().unwrap();
    }

    #[test]
    fn test_corrupt_file_is_treated_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = TokenStore::new(&path);
        assert_eq!(store.load().unwrap(), None);
    }
}
