//! Centralized error types for sched2cal.
//!
//! Every leaf error carries a `user_message()` suitable for printing in the
//! terminal, while `Display` keeps the full technical context for logs.

use thiserror::Error;

/// Top-level application error type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("School portal error: {0}")]
    Portal(#[from] PortalError),

    /// Google Calendar errors mapped from the calendar crate.
    #[error("Calendar error: {0}")]
    Calendar(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Auth(e) => e.user_message(),
            AppError::Portal(e) => e.user_message(),
            AppError::Calendar(_) => "Google Calendar request failed. Please try again.",
            AppError::Io(_) => "A file operation failed. Please try again.",
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to connect. Check your internet connection."
            }
            NetworkError::Timeout => "The request timed out. Please try again.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "The server is experiencing issues. Please try again later."
            }
            NetworkError::ServerError { .. } => "The request failed. Please try again.",
            NetworkError::InvalidResponse(_) => {
                "Received an unexpected response. Please try again."
            }
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
        }
    }
}

/// Google OAuth errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Client secrets not found or unreadable: {0}")]
    CredentialsMissing(String),

    #[error("OAuth flow failed: {0}")]
    OAuthFailed(String),

    #[error("OAuth flow cancelled by user")]
    OAuthCancelled,

    #[error("OAuth state mismatch")]
    CsrfMismatch,

    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    #[error("Token storage error: {0}")]
    StorageError(String),

    #[error("Port {0} already in use for OAuth callback")]
    PortInUse(u16),
}

impl AuthError {
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::TokenExpired => "Your Google session has expired. Please sign in again.",
            AuthError::CredentialsMissing(_) => {
                "Google client secrets are missing. Download credentials.json from the Cloud console."
            }
            AuthError::OAuthFailed(_) => "Google sign-in failed. Please try again.",
            AuthError::OAuthCancelled => "Google sign-in was cancelled.",
            AuthError::CsrfMismatch => "Google sign-in response was not recognised. Please retry.",
            AuthError::RefreshFailed(_) => "Could not renew the Google session. Please sign in again.",
            AuthError::StorageError(_) => "Failed to save Google credentials. Please try again.",
            AuthError::PortInUse(_) => "Sign-in port is busy. Close other apps and try again.",
        }
    }
}

/// School portal errors (login, scraping).
#[derive(Debug, Error)]
pub enum PortalError {
    #[error("Username is blank")]
    BlankUsername,

    #[error("Login failed: {0}")]
    AuthenticationFailed(String),

    #[error("Logout failed: {0}")]
    LogoutFailed(String),

    #[error("User is not logged in")]
    NotLoggedIn,

    #[error("Invalid {field} '{value}'. It must be one of {valid:?}")]
    InvalidSelection {
        field: &'static str,
        value: String,
        valid: Vec<String>,
    },

    #[error("No start date configured for semester {0}")]
    UnknownSemesterStart(String),

    #[error("Unexpected page layout: {0}")]
    UnexpectedPage(String),

    #[error("Malformed schedule row: {0}")]
    MalformedRow(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl PortalError {
    pub fn user_message(&self) -> &'static str {
        match self {
            PortalError::BlankUsername => "Please enter your student username.",
            PortalError::AuthenticationFailed(_) => {
                "School login failed. Check your username and password."
            }
            PortalError::LogoutFailed(_) => "Could not log out of the school portal.",
            PortalError::NotLoggedIn => "Not logged in to the school portal.",
            PortalError::InvalidSelection { .. } => "That semester is not available.",
            PortalError::UnknownSemesterStart(_) => {
                "The start date of this semester is unknown. Add it to the config file."
            }
            PortalError::UnexpectedPage(_) | PortalError::MalformedRow(_) => {
                "The school portal returned a page this tool cannot read."
            }
            PortalError::Http(_) => "Unable to reach the school portal. Check your connection.",
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}
