//! Google Calendar v3 client.
//!
//! Provides calendar and event CRUD over REST with retry on transient failures.

pub mod client;
pub mod error;
pub mod retry;
pub mod types;

pub use client::CalendarClient;
pub use error::CalendarError;
pub use retry::RetryConfig;
pub use types::{
    AccessRole, Calendar, Event, EventDateTime, EventResource, EventStatus, EventTime,
    ReminderOverride, Reminders,
};
