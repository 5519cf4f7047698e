//! Google OAuth2 for the installed-app (desktop) flow.
//!
//! Provides client secrets loading, token persistence and refresh.

pub mod google;
pub mod oauth;
pub mod secrets;
pub mod storage;

pub use google::{GoogleAuth, GoogleOAuth2Provider, GoogleTokenResponse, CALENDAR_SCOPE};
pub use secrets::ClientSecrets;
pub use storage::{TokenSet, TokenStore};
