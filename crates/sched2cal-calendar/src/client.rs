//! Google Calendar API client.

use std::time::Duration;

use tracing::instrument;

use crate::error::CalendarError;
use crate::retry::{with_retry, RetryConfig};
use crate::types::*;

const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

pub struct CalendarClient {
    client: reqwest::Client,
    access_token: String,
    base_url: String,
    retry: RetryConfig,
}

impl CalendarClient {
    pub fn new(access_token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            access_token: access_token.to_string(),
            base_url: CALENDAR_API_BASE.to_string(),
            retry: RetryConfig::default(),
        }
    }

    /// Point the client at another API root (mock servers, proxies).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, CalendarError> {
        self.client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    /// List every calendar on the user's calendar list, following pagination.
    #[instrument(skip(self), level = "info")]
    pub async fn list_calendars(&self) -> Result<Vec<Calendar>, CalendarError> {
        let url = format!("{}/users/me/calendarList", self.base_url);
        let mut calendars = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let response = self
                .send(|| {
                    let request = self.client.get(&url).bearer_auth(&self.access_token);
                    match &page_token {
                        Some(pt) => request.query(&[("pageToken", pt.as_str())]),
                        None => request,
                    }
                })
                .await?;

            let page: CalendarListResponse = Self::handle_response(response).await?;
            calendars.extend(page.items.into_iter().map(Calendar::from));

            match page.next_page_token {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        Ok(calendars)
    }

    /// Id of the first calendar whose summary equals `name`.
    pub async fn find_calendar_id(&self, name: &str) -> Result<String, CalendarError> {
        self.list_calendars()
            .await?
            .into_iter()
            .find(|c| c.summary == name)
            .map(|c| c.id)
            .ok_or_else(|| CalendarError::CalendarNotFound(name.to_string()))
    }

    pub async fn calendar_exists(&self, name: &str) -> Result<bool, CalendarError> {
        match self.find_calendar_id(name).await {
            Ok(_) => Ok(true),
            Err(CalendarError::CalendarNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Create a secondary calendar.
    #[instrument(skip(self), level = "info")]
    pub async fn create_calendar(
        &self,
        name: &str,
        time_zone: &str,
    ) -> Result<Calendar, CalendarError> {
        let url = format!("{}/calendars", self.base_url);
        let body = CalendarResource {
            id: None,
            summary: name.to_string(),
            description: None,
            time_zone: Some(time_zone.to_string()),
        };

        let response = self
            .send(|| self.client.post(&url).bearer_auth(&self.access_token).json(&body))
            .await?;

        let created: CalendarResource = Self::handle_response(response).await?;
        tracing::info!("Created calendar {}", created.summary);
        Ok(Calendar::from(created))
    }

    /// Rename the calendar called `name`.
    ///
    /// Only the summary is sent, so every other calendar property is kept.
    #[instrument(skip(self), level = "info")]
    pub async fn rename_calendar(
        &self,
        name: &str,
        new_name: &str,
    ) -> Result<Calendar, CalendarError> {
        let calendar_id = self.find_calendar_id(name).await?;
        let url = format!(
            "{}/calendars/{}",
            self.base_url,
            urlencoding::encode(&calendar_id)
        );
        let body = CalendarPatch { summary: new_name };

        let response = self
            .send(|| self.client.patch(&url).bearer_auth(&self.access_token).json(&body))
            .await?;
        let updated: CalendarResource = Self::handle_response(response).await?;

        tracing::info!("Renamed calendar {} to {}", name, updated.summary);
        Ok(Calendar::from(updated))
    }

    /// Delete the calendar called `name` along with its events.
    #[instrument(skip(self), level = "info")]
    pub async fn delete_calendar(&self, name: &str) -> Result<(), CalendarError> {
        let calendar_id = self.find_calendar_id(name).await?;
        let url = format!(
            "{}/calendars/{}",
            self.base_url,
            urlencoding::encode(&calendar_id)
        );

        let response = self
            .send(|| self.client.delete(&url).bearer_auth(&self.access_token))
            .await?;

        // 204 No Content on success
        Self::check_status(response).await?;
        tracing::info!("Deleted calendar {}", name);
        Ok(())
    }

    #[instrument(skip(self, event), fields(summary = %event.summary), level = "debug")]
    pub async fn insert_event(
        &self,
        calendar_id: &str,
        event: &EventResource,
    ) -> Result<Event, CalendarError> {
        let url = format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(calendar_id),
        );

        let response = self
            .send(|| self.client.post(&url).bearer_auth(&self.access_token).json(event))
            .await?;

        let api_event: ApiEvent = Self::handle_response(response).await?;
        Ok(Event::from_api(api_event, calendar_id))
    }

    /// Insert events one by one into the calendar called `calendar_name`.
    #[instrument(skip(self, events), fields(count = events.len()), level = "info")]
    pub async fn insert_events(
        &self,
        calendar_name: &str,
        events: &[EventResource],
    ) -> Result<Vec<Event>, CalendarError> {
        let calendar_id = self.find_calendar_id(calendar_name).await?;
        self.insert_events_into(&calendar_id, events).await
    }

    /// Insert events one by one into the calendar with id `calendar_id`.
    ///
    /// Stops at the first failure; events inserted before it are kept.
    #[instrument(skip(self, events), fields(count = events.len()), level = "info")]
    pub async fn insert_events_into(
        &self,
        calendar_id: &str,
        events: &[EventResource],
    ) -> Result<Vec<Event>, CalendarError> {
        let mut inserted = Vec::with_capacity(events.len());

        for event in events {
            let created = self.insert_event(calendar_id, event).await?;
            tracing::info!("Inserted {}", created.summary);
            inserted.push(created);
        }

        Ok(inserted)
    }

    /// List every event of a calendar, following pagination.
    #[instrument(skip(self), level = "info")]
    pub async fn list_events(&self, calendar_id: &str) -> Result<Vec<Event>, CalendarError> {
        let url = format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(calendar_id),
        );
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let response = self
                .send(|| {
                    let request = self
                        .client
                        .get(&url)
                        .bearer_auth(&self.access_token)
                        .query(&[("maxResults", "250")]);
                    match &page_token {
                        Some(pt) => request.query(&[("pageToken", pt.as_str())]),
                        None => request,
                    }
                })
                .await?;

            let page: EventListResponse = Self::handle_response(response).await?;
            events.extend(
                page.items
                    .into_iter()
                    .map(|e| Event::from_api(e, calendar_id)),
            );

            match page.next_page_token {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        Ok(events)
    }

    async fn send<F>(&self, build: F) -> Result<reqwest::Response, CalendarError>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        Ok(with_retry(self.retry.clone(), || build().send()).await?)
    }

    /// Map non-success statuses to errors, passing successful responses through.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, CalendarError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        match status.as_u16() {
            401 => Err(CalendarError::TokenExpired),
            403 => Err(CalendarError::AuthRequired),
            404 => {
                let text = response.text().await.unwrap_or_default();
                Err(CalendarError::NotFound(text))
            }
            409 => Err(CalendarError::Conflict),
            429 => {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60);
                Err(CalendarError::RateLimited(retry_after))
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                Err(CalendarError::ApiError(format!("{}: {}", status, text)))
            }
        }
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, CalendarError> {
        Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| CalendarError::ApiError(format!("JSON parse error: {}", e)))
    }
}
