//! Google Calendar v3 provider.

use super::oauth::TokenManager;
use super::{CalendarEvent, CalendarProvider, EventStart, NewEvent};
use crate::config::Settings;
use crate::error::{GymError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

const API_BASE: &str = "https://www.googleapis.com/calendar/v3/";

/// Default timeout for Calendar API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Calendar v3 client authenticated with a stored OAuth token.
pub struct GoogleCalendar {
    http: reqwest::Client,
    events_url: Url,
    tokens: TokenManager,
}

impl GoogleCalendar {
    /// Create a client for `calendar_id` using the token file at `token_path`.
    pub fn new(calendar_id: &str, token_path: std::path::PathBuf) -> Result<Self> {
        Self::with_base_url(API_BASE, calendar_id, token_path)
    }

    /// Create a client against a custom API root.
    pub fn with_base_url(
        base_url: &str,
        calendar_id: &str,
        token_path: std::path::PathBuf,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        let mut events_url = Url::parse(base_url)
            .map_err(|e| GymError::Config(format!("Invalid calendar API URL: {}", e)))?;
        events_url
            .path_segments_mut()
            .map_err(|_| GymError::Config(format!("Calendar API URL cannot be a base: {}", base_url)))?
            .pop_if_empty()
            .extend(["calendars", calendar_id, "events"]);

        Ok(Self {
            tokens: TokenManager::new(token_path, http.clone()),
            http,
            events_url,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(&settings.calendar.calendar_id, settings.token_path())
    }

    /// URL of the events collection.
    pub fn events_url(&self) -> &Url {
        &self.events_url
    }

    fn event_url(&self, event_id: &str) -> Result<Url> {
        let mut url = self.events_url.clone();
        url.path_segments_mut()
            .map_err(|_| GymError::Config("Calendar API URL cannot be a base".to_string()))?
            .push(event_id);
        Ok(url)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .map(|b| b.error.message)
        .unwrap_or(body);
    Err(GymError::Calendar(format!("{}: {}", status, message)))
}

#[async_trait]
impl CalendarProvider for GoogleCalendar {
    async fn upcoming_events(&self, max_results: u32) -> Result<Vec<CalendarEvent>> {
        let token = self.tokens.access_token().await?;
        let time_min = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let max_results = max_results.to_string();

        let response = self
            .http
            .get(self.events_url.clone())
            .bearer_auth(token)
            .query(&[
                ("timeMin", time_min.as_str()),
                ("maxResults", max_results.as_str()),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
            ])
            .send()
            .await?;

        let list: EventList = check_status(response).await?.json().await?;
        debug!("Fetched {} calendar events", list.items.len());
        Ok(list.items.into_iter().map(ApiEvent::into_event).collect())
    }

    async fn insert_event(&self, event: &NewEvent) -> Result<CalendarEvent> {
        let token = self.tokens.access_token().await?;
        let body = InsertBody::from(event);

        let response = self
            .http
            .post(self.events_url.clone())
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let created: ApiEvent = check_status(response).await?.json().await?;
        Ok(created.into_event())
    }

    async fn delete_event(&self, event_id: &str) -> Result<()> {
        let token = self.tokens.access_token().await?;
        let response = self
            .http
            .delete(self.event_url(event_id)?)
            .bearer_auth(token)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "google"
    }
}

// === Wire types ===

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[derive(Debug, Deserialize)]
struct EventList {
    #[serde(default)]
    items: Vec<ApiEvent>,
}

#[derive(Debug, Deserialize)]
struct ApiEvent {
    id: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    start: Option<ApiEventTime>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEventTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_zone: Option<String>,
}

impl ApiEvent {
    fn into_event(self) -> CalendarEvent {
        let start = match self.start {
            Some(ApiEventTime {
                date_time: Some(dt),
                ..
            }) => DateTime::parse_from_rfc3339(&dt)
                .map(EventStart::DateTime)
                .unwrap_or(EventStart::Raw(dt)),
            Some(ApiEventTime { date: Some(d), .. }) => NaiveDate::parse_from_str(&d, "%Y-%m-%d")
                .map(EventStart::Date)
                .unwrap_or(EventStart::Raw(d)),
            _ => EventStart::Raw(String::new()),
        };

        CalendarEvent {
            id: self.id,
            summary: self.summary.unwrap_or_else(|| "(no title)".to_string()),
            start,
        }
    }
}

#[derive(Debug, Serialize)]
struct InsertBody {
    summary: String,
    description: String,
    start: ApiEventTime,
    end: ApiEventTime,
}

impl From<&NewEvent> for InsertBody {
    fn from(event: &NewEvent) -> Self {
        let time = |dt: &chrono::NaiveDateTime| ApiEventTime {
            date_time: Some(dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
            date: None,
            time_zone: Some(event.timezone.clone()),
        };
        Self {
            summary: event.summary.clone(),
            description: event.description.clone(),
            start: time(&event.start),
            end: time(&event.end),
        }
    }
}
