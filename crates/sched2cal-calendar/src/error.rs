//! Calendar-specific error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Authentication required")]
    AuthRequired,

    #[error("Token expired")]
    TokenExpired,

    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Calendar not found: {0}")]
    CalendarNotFound(String),

    #[error("Conflict: resource was modified")]
    Conflict,

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

impl CalendarError {
    /// User-friendly error message for terminal display.
    pub fn user_message(&self) -> String {
        match self {
            Self::AuthRequired => "Google refused access. Check the calendar permission.".to_string(),
            Self::TokenExpired => "Your Google session has expired. Please sign in again.".to_string(),
            Self::RateLimited(secs) => format!("Too many requests. Please wait {} seconds.", secs),
            Self::NotFound(_) => "The calendar item no longer exists.".to_string(),
            Self::CalendarNotFound(name) => {
                format!("Cannot find calendar '{}'. You might need to create it first.", name)
            }
            Self::Conflict => "The calendar was modified elsewhere. Please retry.".to_string(),
            Self::ApiError(msg) => format!("Calendar error: {}", msg),
            Self::NetworkError(_) => "Network error. Check your connection.".to_string(),
        }
    }
}
