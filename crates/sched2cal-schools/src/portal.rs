//! The portal abstraction and the HTTP session shared by implementations.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::{Response, Url};

use sched2cal_core::PortalError;

use crate::entry::{ScheduleEntry, SemesterOptions, SemesterSelection};

/// Schools with a supported portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum School {
    Sgu,
    Huflit,
}

impl School {
    pub const ALL: [School; 2] = [School::Huflit, School::Sgu];

    /// Short name shown to users.
    pub fn name(self) -> &'static str {
        match self {
            School::Sgu => "SGU",
            School::Huflit => "HUFLIT",
        }
    }
}

impl fmt::Display for School {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for School {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sgu" => Ok(School::Sgu),
            "huflit" => Ok(School::Huflit),
            other => Err(format!("unknown school '{}'", other)),
        }
    }
}

/// A logged-in view of a school's timetable.
///
/// Callers must `login` before `semesters`/`fetch` and should `logout` when done.
#[allow(async_fn_in_trait)]
pub trait SchoolPortal {
    fn school(&self) -> School;

    fn is_logged_in(&self) -> bool;

    async fn login(&mut self) -> Result<(), PortalError>;

    async fn logout(&mut self) -> Result<(), PortalError>;

    /// Semesters (and years, where the portal has them) the user can pick.
    async fn semesters(&self) -> Result<SemesterOptions, PortalError>;

    /// Schedule for a term, or `None` when the portal has nothing published.
    async fn fetch(
        &self,
        selection: &SemesterSelection,
    ) -> Result<Option<Vec<ScheduleEntry>>, PortalError>;
}

/// Cookie-keeping HTTP session rooted at a portal's base URL.
pub(crate) struct Session {
    client: reqwest::Client,
    base_url: String,
    authorization: Option<String>,
}

impl Session {
    pub(crate) fn new(base_url: &str, timeout: Duration) -> Result<Self, PortalError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .user_agent(concat!("sched2cal/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            authorization: None,
        })
    }

    pub(crate) fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Value sent as the `Authorization` header on every later request.
    pub(crate) fn set_authorization(&mut self, value: Option<String>) {
        self.authorization = value;
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.authorization {
            Some(value) => request.header(AUTHORIZATION, value),
            None => request,
        }
    }

    pub(crate) async fn get(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<Response, PortalError> {
        let request = self.client.get(self.url(endpoint)).query(query);
        Ok(self.authorize(request).send().await?)
    }

    pub(crate) async fn post_form(
        &self,
        endpoint: &str,
        form: &[(&str, &str)],
    ) -> Result<Response, PortalError> {
        let request = self.client.post(self.url(endpoint)).form(form);
        Ok(self.authorize(request).send().await?)
    }

    /// GET a page and return its body, failing on non-success statuses.
    pub(crate) async fn get_text(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<String, PortalError> {
        Ok(self.get(endpoint, query).await?.error_for_status()?.text().await?)
    }

    pub(crate) async fn post_form_text(
        &self,
        endpoint: &str,
        form: &[(&str, &str)],
    ) -> Result<String, PortalError> {
        Ok(self
            .post_form(endpoint, form)
            .await?
            .error_for_status()?
            .text()
            .await?)
    }

    /// True when the portal answered from a different page than `endpoint`.
    ///
    /// Host and path are compared against the full requested URL, so a base
    /// URL with a path prefix still counts; the query string is ignored.
    pub(crate) fn was_redirected(&self, response: &Response, endpoint: &str) -> bool {
        let Ok(requested) = Url::parse(&self.url(endpoint)) else {
            return false;
        };
        let answered = response.url();
        answered.host_str() != requested.host_str()
            || answered.port_or_known_default() != requested.port_or_known_default()
            || answered.path() != requested.path()
    }
}


/// Ensure `value` is one of `valid`, reporting the choices otherwise.
pub(crate) fn check_choice(
    field: &'static str,
    value: &str,
    valid: &[String],
) -> Result<(), PortalError> {
    if valid.iter().any(|v| v == value) {
        Ok(())
    } else {
        Err(PortalError::InvalidSelection {
            field,
            value: value.to_string(),
            valid: valid.to_vec(),
        })
    }
}
