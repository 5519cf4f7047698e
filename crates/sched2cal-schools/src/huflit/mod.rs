//! HUFLIT student portal (portal.huflit.edu.vn).
//!
//! Session-cookie login; a successful login or logout is recognised by the
//! portal redirecting away from the requested page.

pub mod constants;
pub mod parse;

use std::time::Duration;

use sched2cal_core::{HttpConfig, HuflitConfig, PortalError};

use crate::entry::{Credentials, ScheduleEntry, SemesterOptions, SemesterSelection};
use crate::html;
use crate::portal::{check_choice, School, SchoolPortal, Session};
use constants::*;

/// Leading rows of the timetable that are layout, not classes.
const LEADING_ROWS: usize = 2;
/// Column header rows that follow when a schedule exists.
const HEADER_ROWS: usize = 2;

pub struct HuflitPortal {
    session: Session,
    credentials: Credentials,
    logged_in: bool,
}

impl HuflitPortal {
    pub fn new(
        config: &HuflitConfig,
        http: &HttpConfig,
        credentials: Credentials,
    ) -> Result<Self, PortalError> {
        Ok(Self {
            session: Session::new(&config.base_url, Duration::from_secs(http.timeout_secs))?,
            credentials,
            logged_in: false,
        })
    }

    fn require_login(&self) -> Result<(), PortalError> {
        if self.logged_in {
            Ok(())
        } else {
            Err(PortalError::NotLoggedIn)
        }
    }

    fn pick(
        field: &'static str,
        wanted: Option<&str>,
        available: &[String],
    ) -> Result<String, PortalError> {
        match wanted.filter(|w| !w.is_empty()) {
            Some(value) => {
                check_choice(field, value, available)?;
                Ok(value.to_string())
            }
            None => {
                let first = available.first().cloned().ok_or_else(|| {
                    PortalError::UnexpectedPage(format!("no {} offered", field))
                })?;
                tracing::info!(
                    "{} not given. Class schedule will be taken from: {}",
                    field,
                    first
                );
                Ok(first)
            }
        }
    }
}

impl SchoolPortal for HuflitPortal {
    fn school(&self) -> School {
        School::Huflit
    }

    fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    #[tracing::instrument(skip(self), fields(user = %self.credentials.username), level = "info")]
    async fn login(&mut self) -> Result<(), PortalError> {
        if self.credentials.username.trim().is_empty() {
            return Err(PortalError::BlankUsername);
        }

        tracing::info!("Logging in ...");

        let response = self
            .session
            .post_form(
                LOGIN_ENDPOINT,
                &[
                    (FIELD_USERNAME, self.credentials.username.as_str()),
                    (FIELD_PASSWORD, self.credentials.password.as_str()),
                ],
            )
            .await?;

        if !self.session.was_redirected(&response, LOGIN_ENDPOINT) {
            return Err(PortalError::AuthenticationFailed(
                "wrong username or password".to_string(),
            ));
        }

        self.logged_in = true;
        Ok(())
    }

    async fn logout(&mut self) -> Result<(), PortalError> {
        self.require_login()?;

        tracing::info!("Logging out ...");

        self.session.get(LOGOUT_ENDPOINT, &[]).await?;
        let home = self.session.get(HOME_ENDPOINT, &[]).await?;

        // A logged-out session can no longer see /Home and is bounced to login
        if !self.session.was_redirected(&home, HOME_ENDPOINT) {
            return Err(PortalError::LogoutFailed(
                "portal still serves the home page".to_string(),
            ));
        }

        self.logged_in = false;
        Ok(())
    }

    async fn semesters(&self) -> Result<SemesterOptions, PortalError> {
        self.require_login()?;

        let page = self.session.get_text(SCHEDULE_ENDPOINT, &[]).await?;
        Ok(SemesterOptions {
            semesters: html::option_values(&page, TERM_SELECT_ID)?,
            years: Some(html::option_values(&page, YEAR_SELECT_ID)?),
        })
    }

    #[tracing::instrument(skip(self), level = "info")]
    async fn fetch(
        &self,
        selection: &SemesterSelection,
    ) -> Result<Option<Vec<ScheduleEntry>>, PortalError> {
        let options = self.semesters().await?;
        let years = options.years.unwrap_or_default();

        let semester = Self::pick("semester", Some(selection.semester.as_str()), &options.semesters)?;
        let year = Self::pick("year", selection.year.as_deref(), &years)?;

        let page = self
            .session
            .get_text(
                SCHEDULE_API,
                &[(YEAR_SELECT_ID, year.as_str()), (TERM_SELECT_ID, semester.as_str())],
            )
            .await?;

        let rows = html::table_rows(&page, "tr")?;
        let rows: Vec<_> = rows.into_iter().skip(LEADING_ROWS).collect();

        if rows.len() == 1 {
            tracing::info!("{}", rows[0].join(" "));
            return Ok(None);
        }

        let mut entries = Vec::new();
        for cells in rows.iter().skip(HEADER_ROWS) {
            if cells.len() < parse::MIN_CELLS {
                tracing::debug!("Skipping row with {} cells", cells.len());
                continue;
            }
            entries.push(parse::parse_row(cells)?);
        }

        if entries.is_empty() {
            tracing::info!("No schedule published for {} {}", year, semester);
            return Ok(None);
        }

        tracing::info!("Fetched {} classes for {} {}", entries.len(), year, semester);
        Ok(Some(entries))
    }
}
