//! Turns scraped schedule entries into calendar event payloads.

use std::collections::HashMap;

use chrono::{NaiveDateTime, NaiveTime};
use serde::Serialize;
use thiserror::Error;

use sched2cal_calendar::{EventDateTime, EventResource, Reminders};
use sched2cal_schools::ScheduleEntry;

/// Google accepts event colour ids 1 through 11.
const COLOR_COUNT: usize = 11;

const ISO_LOCAL: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Error, PartialEq)]
pub enum PlanError {
    #[error("Class #{index} has no {field}")]
    MissingField { index: usize, field: &'static str },
}

/// One recurring class, ready to be sent to the calendar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedEvent {
    pub code: String,
    pub name: String,
    pub class: String,
    pub lecturer: String,
    pub room: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Number of weekly occurrences; 0 means a single event
    pub repeat: i64,
    pub color: String,
}

impl PlannedEvent {
    pub fn summary(&self) -> String {
        format!("{} {}", self.code, self.name).trim().to_string()
    }

    pub fn to_resource(&self, time_zone: &str, reminder_minutes: u32) -> EventResource {
        let at = |t: NaiveDateTime| EventDateTime {
            date_time: t.format(ISO_LOCAL).to_string(),
            time_zone: Some(time_zone.to_string()),
        };

        let recurrence = if self.repeat > 0 {
            vec![format!("RRULE:FREQ=WEEKLY;COUNT={}", self.repeat)]
        } else {
            Vec::new()
        };

        EventResource {
            summary: self.summary(),
            location: Some(self.room.clone()),
            description: Some(format!(
                "Class: {}\nLecturer: {}",
                self.class, self.lecturer
            )),
            start: at(self.start),
            end: at(self.end),
            color_id: Some(self.color.clone()),
            reminders: Some(Reminders::popup(reminder_minutes)),
            recurrence,
        }
    }
}

/// Hands out colour ids per course name in first-seen order.
#[derive(Default)]
struct Palette {
    assigned: HashMap<String, String>,
}

impl Palette {
    fn color_for(&mut self, name: &str) -> String {
        let next = self.assigned.len() % COLOR_COUNT + 1;
        self.assigned
            .entry(name.to_string())
            .or_insert_with(|| next.to_string())
            .clone()
    }
}

fn optional(value: &Option<String>, index: usize, field: &str) -> String {
    match value {
        Some(v) => v.clone(),
        None => {
            tracing::warn!("Class #{} has no {}", index, field);
            String::new()
        }
    }
}

/// Plan every entry, failing on the first one missing a name or room.
pub fn plan(entries: &[ScheduleEntry]) -> Result<Vec<PlannedEvent>, PlanError> {
    let mut palette = Palette::default();

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            if entry.name.trim().is_empty() {
                return Err(PlanError::MissingField { index, field: "name" });
            }
            if entry.room.trim().is_empty() {
                return Err(PlanError::MissingField { index, field: "room" });
            }

            let end_time: NaiveTime = entry.to_date.time();

            Ok(PlannedEvent {
                code: optional(&entry.code, index, "code"),
                name: entry.name.clone(),
                class: optional(&entry.class, index, "class"),
                lecturer: optional(&entry.lecturer, index, "lecturer"),
                room: entry.room.clone(),
                start: entry.from_date,
                end: entry.from_date.date().and_time(end_time),
                repeat: (entry.to_date - entry.from_date).num_days() / 7,
                color: palette.color_for(&entry.name),
            })
        })
        .collect()
}
