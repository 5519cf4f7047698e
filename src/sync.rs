//! Import and update flows: school portal in, Google Calendar out.

use sched2cal_calendar::{CalendarClient, EventResource};
use sched2cal_core::{AppError, CalendarConfig};
use sched2cal_schools::{ScheduleEntry, SchoolPortal, SemesterOptions, SemesterSelection};

use crate::error_mapping;
use crate::planner;

/// How the term to fetch is decided once logged in.
pub enum SemesterChoice<'a> {
    /// Use this selection; an empty semester means the portal's first one
    Given(SemesterSelection),
    /// Ask with the options the portal offers
    Ask(&'a dyn Fn(&SemesterOptions) -> anyhow::Result<SemesterSelection>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Import,
    Update,
}

#[derive(Debug)]
pub enum SyncOutcome {
    Imported(usize),
    Updated(usize),
    /// Import refused because the calendar is already there
    AlreadyExists,
    /// Update refused because there is no calendar to replace
    Missing,
    /// The portal has nothing published for the chosen term
    NoSchedule,
    DryRun(Vec<EventResource>),
}

/// Log in, fetch the chosen term and log out again.
///
/// Logout is attempted even when fetching fails; a logout failure is only
/// logged.
pub async fn fetch_schedule<P: SchoolPortal>(
    portal: &mut P,
    choice: &SemesterChoice<'_>,
) -> Result<Option<Vec<ScheduleEntry>>, AppError> {
    portal.login().await?;

    let result = fetch_logged_in(portal, choice).await;

    if let Err(e) = portal.logout().await {
        tracing::warn!("Could not log out of {}: {}", portal.school(), e);
    }

    result
}

async fn fetch_logged_in<P: SchoolPortal>(
    portal: &P,
    choice: &SemesterChoice<'_>,
) -> Result<Option<Vec<ScheduleEntry>>, AppError> {
    let selection = match choice {
        SemesterChoice::Given(selection) => selection.clone(),
        SemesterChoice::Ask(ask) => ask(&portal.semesters().await?)?,
    };
    Ok(portal.fetch(&selection).await?)
}

fn build_events(
    entries: &[ScheduleEntry],
    settings: &CalendarConfig,
) -> Result<Vec<EventResource>, AppError> {
    Ok(planner::plan(entries)
        .map_err(error_mapping::plan)?
        .iter()
        .map(|p| p.to_resource(&settings.time_zone, settings.reminder_minutes))
        .collect())
}

async fn create_and_fill(
    calendar: &CalendarClient,
    settings: &CalendarConfig,
    calendar_name: &str,
    events: &[EventResource],
) -> Result<usize, AppError> {
    tracing::info!("Creating calendar {}", calendar_name);
    let created = calendar
        .create_calendar(calendar_name, &settings.time_zone)
        .await
        .map_err(error_mapping::calendar)?;

    let inserted = calendar
        .insert_events_into(&created.id, events)
        .await
        .map_err(error_mapping::calendar)?;
    Ok(inserted.len())
}

/// Outcome that ends `action` before the portal is contacted: import needs
/// `calendar_name` to be absent, update needs it to exist.
pub async fn precheck(
    calendar: &CalendarClient,
    action: Action,
    calendar_name: &str,
) -> Result<Option<SyncOutcome>, AppError> {
    let exists = calendar
        .calendar_exists(calendar_name)
        .await
        .map_err(error_mapping::calendar)?;

    Ok(match (action, exists) {
        (Action::Import, true) => Some(SyncOutcome::AlreadyExists),
        (Action::Update, false) => Some(SyncOutcome::Missing),
        _ => None,
    })
}

/// Fetch and plan without touching any calendar.
pub async fn preview<P: SchoolPortal>(
    portal: &mut P,
    choice: &SemesterChoice<'_>,
    settings: &CalendarConfig,
) -> Result<SyncOutcome, AppError> {
    match fetch_schedule(portal, choice).await? {
        Some(entries) => Ok(SyncOutcome::DryRun(build_events(&entries, settings)?)),
        None => Ok(SyncOutcome::NoSchedule),
    }
}

/// Create `calendar_name` and fill it with the term's classes.
#[tracing::instrument(skip_all, fields(school = %portal.school(), calendar = calendar_name))]
pub async fn import<P: SchoolPortal>(
    portal: &mut P,
    choice: &SemesterChoice<'_>,
    calendar: &CalendarClient,
    settings: &CalendarConfig,
    calendar_name: &str,
) -> Result<SyncOutcome, AppError> {
    if let Some(outcome) = precheck(calendar, Action::Import, calendar_name).await? {
        return Ok(outcome);
    }

    let Some(entries) = fetch_schedule(portal, choice).await? else {
        return Ok(SyncOutcome::NoSchedule);
    };
    let events = build_events(&entries, settings)?;

    let count = create_and_fill(calendar, settings, calendar_name, &events).await?;
    Ok(SyncOutcome::Imported(count))
}

/// Replace the contents of an existing `calendar_name`.
///
/// The calendar is only deleted once a schedule has been fetched and planned.
#[tracing::instrument(skip_all, fields(school = %portal.school(), calendar = calendar_name))]
pub async fn update<P: SchoolPortal>(
    portal: &mut P,
    choice: &SemesterChoice<'_>,
    calendar: &CalendarClient,
    settings: &CalendarConfig,
    calendar_name: &str,
) -> Result<SyncOutcome, AppError> {
    if let Some(outcome) = precheck(calendar, Action::Update, calendar_name).await? {
        return Ok(outcome);
    }

    let Some(entries) = fetch_schedule(portal, choice).await? else {
        return Ok(SyncOutcome::NoSchedule);
    };
    let events = build_events(&entries, settings)?;

    tracing::info!("Removing old calendar {}", calendar_name);
    calendar
        .delete_calendar(calendar_name)
        .await
        .map_err(error_mapping::calendar)?;

    let count = create_and_fill(calendar, settings, calendar_name, &events).await?;
    Ok(SyncOutcome::Updated(count))
}
