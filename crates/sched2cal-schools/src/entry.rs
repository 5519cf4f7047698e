//! Schedule data shared by every school.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One class as published by a school portal.
///
/// `from_date` is the first session's start; `to_date` bounds the whole series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub code: Option<String>,
    pub name: String,
    pub credits: Option<String>,
    pub class: Option<String>,
    pub weekday: String,
    pub start_period: u32,
    pub end_period: u32,
    pub room: String,
    pub lecturer: Option<String>,
    pub from_date: NaiveDateTime,
    pub to_date: NaiveDateTime,
}

/// Choices offered by a portal's schedule page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SemesterOptions {
    pub semesters: Vec<String>,
    /// Only some portals split terms by academic year
    pub years: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SemesterSelection {
    /// Empty means "the portal's first listed semester"
    pub semester: String,
    pub year: Option<String>,
}

impl SemesterSelection {
    pub fn new(semester: impl Into<String>, year: Option<String>) -> Self {
        Self {
            semester: semester.into(),
            year,
        }
    }
}

/// Portal login. The password is never printed by `Debug`.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Blank strings become `None`.
pub(crate) fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
