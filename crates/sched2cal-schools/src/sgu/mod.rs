//! Saigon University (thongtindaotao.sgu.edu.vn).
//!
//! Login is a JSON token API; the timetable is an ASP.NET WebForms page that
//! has to be posted back with its `__VIEWSTATE`.

pub mod constants;
pub mod parse;

use std::time::Duration;

use serde::Deserialize;

use sched2cal_core::{HttpConfig, PortalError, SguConfig};

use crate::entry::{Credentials, ScheduleEntry, SemesterOptions, SemesterSelection};
use crate::html;
use crate::portal::{check_choice, School, SchoolPortal, Session};
use constants::*;

/// The portal reports `code` as either a number or a numeric string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiCode {
    Number(i64),
    Text(String),
}

impl ApiCode {
    fn is_ok(&self) -> bool {
        match self {
            ApiCode::Number(n) => *n == 200,
            ApiCode::Text(s) => s.trim() == "200",
        }
    }
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    code: ApiCode,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

pub struct SguPortal {
    session: Session,
    credentials: Credentials,
    config: SguConfig,
    logged_in: bool,
    student_name: Option<String>,
}

impl SguPortal {
    pub fn new(
        config: &SguConfig,
        http: &HttpConfig,
        credentials: Credentials,
    ) -> Result<Self, PortalError> {
        Ok(Self {
            session: Session::new(&config.base_url, Duration::from_secs(http.timeout_secs))?,
            credentials,
            config: config.clone(),
            logged_in: false,
            student_name: None,
        })
    }

    /// Display name returned by the login API.
    pub fn student_name(&self) -> Option<&str> {
        self.student_name.as_deref()
    }

    fn require_login(&self) -> Result<(), PortalError> {
        if self.logged_in {
            Ok(())
        } else {
            Err(PortalError::NotLoggedIn)
        }
    }

    async fn schedule_page(&self) -> Result<String, PortalError> {
        self.session.get_text(SCHEDULE_ENDPOINT, &[]).await
    }
}

impl SchoolPortal for SguPortal {
    fn school(&self) -> School {
        School::Sgu
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

        let response: AuthResponse = self
            .session
            .post_form(
                LOGIN_ENDPOINT,
                &[
                    ("username", self.credentials.username.as_str()),
                    ("password", self.credentials.password.as_str()),
                    ("grant_type", "password"),
                ],
            )
            .await?
            .json()
            .await?;

        if !response.code.is_ok() {
            return Err(PortalError::AuthenticationFailed(
                response.message.unwrap_or_else(|| "login rejected".to_string()),
            ));
        }

        let (Some(token_type), Some(access_token)) = (response.token_type, response.access_token)
        else {
            return Err(PortalError::AuthenticationFailed(
                "login response did not include a token".to_string(),
            ));
        };

        self.session
            .set_authorization(Some(format!("{} {}", token_type, access_token)));
        self.student_name = response.name;
        self.logged_in = true;
        Ok(())
    }

    async fn logout(&mut self) -> Result<(), PortalError> {
        self.require_login()?;

        tracing::info!("Logging out ...");

        let response: AuthResponse = self
            .session
            .post_form(LOGOUT_ENDPOINT, &[])
            .await?
            .json()
            .await?;

        if !response.code.is_ok() {
            return Err(PortalError::LogoutFailed(
                response.message.unwrap_or_else(|| "logout rejected".to_string()),
            ));
        }

        self.session.set_authorization(None);
        self.logged_in = false;
        Ok(())
    }

    async fn semesters(&self) -> Result<SemesterOptions, PortalError> {
        self.require_login()?;

        let page = self.schedule_page().await?;
        Ok(SemesterOptions {
            semesters: html::option_values(&page, SEMESTER_SELECT_ID)?,
            years: None,
        })
    }

    #[tracing::instrument(skip(self), level = "info")]
    async fn fetch(
        &self,
        selection: &SemesterSelection,
    ) -> Result<Option<Vec<ScheduleEntry>>, PortalError> {
        self.require_login()?;

        let page = self.schedule_page().await?;
        let available = html::option_values(&page, SEMESTER_SELECT_ID)?;

        let semester = if selection.semester.is_empty() {
            let first = available.first().cloned().ok_or_else(|| {
                PortalError::UnexpectedPage("no semesters offered".to_string())
            })?;
            tracing::info!(
                "Semester not given. Class schedule will be taken from this semester: {}",
                first
            );
            first
        } else {
            check_choice("semester", &selection.semester, &available)?;
            selection.semester.clone()
        };

        let semester_start = self
            .config
            .semester_start(&semester)
            .ok_or_else(|| PortalError::UnknownSemesterStart(semester.clone()))?;

        let viewstate = html::input_value(&page, VIEWSTATE_INPUT_ID)?.unwrap_or_default();

        let form = [
            (FIELD_EVENT_TARGET, FIELD_BY_PERIOD),
            ("__EVENTARGUMENT", ""),
            ("__LASTFOCUS", ""),
            (VIEWSTATE_INPUT_ID, viewstate.as_str()),
            (FIELD_SEMESTER, semester.as_str()),
            (FIELD_KIND, "1"),
            (FIELD_BY_PERIOD, "rad_ThuTiet"),
            (FIELD_BY_SUBJECT, "rad_MonHoc"),
        ];

        let result = self.session.post_form_text(SCHEDULE_ENDPOINT, &form).await?;
        let rows = html::table_rows(&result, SCHEDULE_ROW_CSS)?;

        if rows.is_empty() {
            tracing::info!("No schedule published for semester {}", semester);
            return Ok(None);
        }

        let entries = rows
            .iter()
            .map(|cells| parse::parse_row(cells, semester_start))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!("Fetched {} classes for semester {}", entries.len(), semester);
        Ok(Some(entries))
    }
}
