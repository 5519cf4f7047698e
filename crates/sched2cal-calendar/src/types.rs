//! Calendar API types and data structures.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// Calendar event as returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub calendar_id: String,
    pub summary: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: Option<EventTime>,
    pub end: Option<EventTime>,
    pub all_day: bool,
    pub status: EventStatus,
    pub color_id: Option<String>,
    pub recurrence: Vec<String>,
    pub html_link: Option<String>,
}

/// Event time - a datetime with its offset, or an all-day date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum EventTime {
    DateTime(DateTime<FixedOffset>),
    Date(NaiveDate),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub enum EventStatus {
    #[default]
    Confirmed,
    Tentative,
    Cancelled,
}

/// Calendar metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Calendar {
    pub id: String,
    pub summary: String,
    pub description: Option<String>,
    pub time_zone: Option<String>,
    pub is_primary: bool,
    pub access_role: AccessRole,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub enum AccessRole {
    Owner,
    Writer,
    #[default]
    Reader,
    FreeBusyReader,
}

// Request payloads

/// Body of `events.insert`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventResource {
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start: EventDateTime,
    pub end: EventDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminders: Option<Reminders>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recurrence: Vec<String>,
}

/// Local wall-clock time interpreted in `time_zone`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    pub date_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reminders {
    pub use_default: bool,
    pub overrides: Vec<ReminderOverride>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReminderOverride {
    pub method: String,
    pub minutes: u32,
}

impl Reminders {
    /// A single popup `minutes` before start, ignoring calendar defaults.
    pub fn popup(minutes: u32) -> Self {
        Self {
            use_default: false,
            overrides: vec![ReminderOverride {
                method: "popup".to_string(),
                minutes,
            }],
        }
    }
}

/// Body of `calendars.insert` / `calendars.update`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarResource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

/// Body of `PATCH /calendars/{id}`; fields left out keep their value.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CalendarPatch<'a> {
    pub summary: &'a str,
}

// API Response Types

/// Google Calendar API event response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEvent {
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: Option<ApiEventTime>,
    pub end: Option<ApiEventTime>,
    pub status: Option<String>,
    pub color_id: Option<String>,
    #[serde(default)]
    pub recurrence: Vec<String>,
    pub html_link: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEventTime {
    pub date_time: Option<String>,
    pub date: Option<String>,
    pub time_zone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListResponse {
    #[serde(default)]
    pub items: Vec<ApiEvent>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarListResponse {
    #[serde(default)]
    pub items: Vec<ApiCalendar>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCalendar {
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub time_zone: Option<String>,
    #[serde(default)]
    pub primary: bool,
    pub access_role: Option<String>,
}

impl Event {
    /// Convert API response to local Event.
    pub fn from_api(api: ApiEvent, calendar_id: &str) -> Self {
        let start = api.start.as_ref().and_then(parse_event_time);
        let end = api.end.as_ref().and_then(parse_event_time);
        let all_day = matches!(start, Some(EventTime::Date(_)));

        let status = match api.status.as_deref() {
            Some("tentative") => EventStatus::Tentative,
            Some("cancelled") => EventStatus::Cancelled,
            _ => EventStatus::Confirmed,
        };

        Self {
            id: api.id,
            calendar_id: calendar_id.to_string(),
            summary: api.summary.unwrap_or_default(),
            description: api.description,
            location: api.location,
            start,
            end,
            all_day,
            status,
            color_id: api.color_id,
            recurrence: api.recurrence,
            html_link: api.html_link,
        }
    }
}

impl From<ApiCalendar> for Calendar {
    fn from(api: ApiCalendar) -> Self {
        let access_role = match api.access_role.as_deref() {
            Some("owner") => AccessRole::Owner,
            Some("writer") => AccessRole::Writer,
            Some("freeBusyReader") => AccessRole::FreeBusyReader,
            _ => AccessRole::Reader,
        };

        Self {
            id: api.id,
            summary: api.summary.unwrap_or_default(),
            description: api.description,
            time_zone: api.time_zone,
            is_primary: api.primary,
            access_role,
        }
    }
}

impl From<CalendarResource> for Calendar {
    fn from(resource: CalendarResource) -> Self {
        Self {
            id: resource.id.unwrap_or_default(),
            summary: resource.summary,
            description: resource.description,
            time_zone: resource.time_zone,
            is_primary: false,
            access_role: AccessRole::Owner,
        }
    }
}

fn parse_event_time(api: &ApiEventTime) -> Option<EventTime> {
    if let Some(dt) = api
        .date_time
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
    {
        return Some(EventTime::DateTime(dt));
    }
    api.date
        .as_deref()
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        .map(EventTime::Date)
}
