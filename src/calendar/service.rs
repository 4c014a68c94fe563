//! Calendar operations exposed to the agent.
//!
//! Every method returns the text shown to the user; provider failures
//! are folded into the message instead of being propagated.

use super::weekday::{next_occurrence, parse_time_of_day, resolve_weekday};
use super::{CalendarProvider, GoogleCalendar, NewEvent};
use crate::config::{CalendarProviderKind, CalendarSettings, Settings};
use crate::error::Result;
use chrono::{Duration, Local, NaiveDate};
use std::sync::Arc;
use tracing::{info, warn};

/// Upper bound the Calendar API accepts for `maxResults`.
const MAX_LIST_RESULTS: u32 = 250;

/// Longest event we agree to create, in hours.
const MAX_DURATION_HOURS: f64 = 24.0 * 365.0;

/// Arguments for creating an event from a weekday name.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRequest {
    pub title: String,
    /// Day name, English or Spanish.
    pub day: String,
    /// `HH:MM`.
    pub time: String,
    pub duration_hours: f64,
    pub description: String,
}

impl EventRequest {
    pub fn new(title: &str, day: &str, time: &str) -> Self {
        Self {
            title: title.to_string(),
            day: day.to_string(),
            time: time.to_string(),
            duration_hours: 1.0,
            description: String::new(),
        }
    }
}

/// Calendar front-end shared by the tools, CLI and servers.
pub struct CalendarService {
    provider: Arc<dyn CalendarProvider>,
    timezone: String,
    max_results: u32,
    delete_search_window: u32,
}

impl CalendarService {
    pub fn new(provider: Arc<dyn CalendarProvider>, settings: &CalendarSettings) -> Self {
        Self {
            provider,
            timezone: settings.timezone.clone(),
            max_results: settings.max_results,
            delete_search_window: settings.delete_search_window,
        }
    }

    /// Build the configured provider.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let provider: Arc<dyn CalendarProvider> = match settings.calendar.provider {
            CalendarProviderKind::Google => Arc::new(GoogleCalendar::from_settings(settings)?),
        };
        Ok(Self::new(provider, &settings.calendar))
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// List upcoming events, `max_results` defaulting to the configured count.
    pub async fn list_upcoming(&self, max_results: Option<u32>) -> String {
        let limit = max_results
            .unwrap_or(self.max_results)
            .clamp(1, MAX_LIST_RESULTS);

        match self.provider.upcoming_events(limit).await {
            Ok(events) if events.is_empty() => "No upcoming events found.".to_string(),
            Ok(events) => {
                let mut output = String::from("Upcoming events:\n");
                for event in &events {
                    output.push_str(&format!("- {} ({})\n", event.summary, event.start.display()));
                }
                output
            }
            Err(e) => {
                warn!("Calendar list failed: {}", e);
                format!("Error accessing calendar: {}", e)
            }
        }
    }

    /// Create an event on the next occurrence of the requested weekday.
    pub async fn create_event(&self, request: &EventRequest) -> String {
        self.create_event_from(Local::now().date_naive(), request).await
    }

    /// Same as [`create_event`](Self::create_event) with an explicit "today".
    pub async fn create_event_from(&self, today: NaiveDate, request: &EventRequest) -> String {
        let Some(time_of_day) = parse_time_of_day(&request.time) else {
            return format!("Error: invalid time '{}', expected HH:MM", request.time);
        };
        if !request.duration_hours.is_finite()
            || !(0.0..=MAX_DURATION_HOURS).contains(&request.duration_hours)
        {
            return "Error: invalid duration".to_string();
        }

        let date = next_occurrence(today, resolve_weekday(&request.day));
        let start = date.and_time(time_of_day);
        let minutes = (request.duration_hours * 60.0).round() as i64;
        let Some(end) = Duration::try_minutes(minutes).and_then(|d| start.checked_add_signed(d))
        else {
            return "Error: invalid duration".to_string();
        };

        let event = NewEvent {
            summary: request.title.clone(),
            description: request.description.clone(),
            start,
            end,
            timezone: self.timezone.clone(),
        };

        match self.provider.insert_event(&event).await {
            Ok(created) => {
                info!("Created calendar event {} ({})", created.summary, created.id);
                format!(
                    "Event created: {} on {} at {}",
                    request.title,
                    date.format("%A %d/%m"),
                    request.time
                )
            }
            Err(e) => {
                warn!("Calendar insert failed: {}", e);
                format!("Error creating event: {}", e)
            }
        }
    }

    /// Delete the first upcoming event whose title contains `title_contains`.
    pub async fn delete_by_title(&self, title_contains: &str) -> String {
        let needle = title_contains.trim();
        if needle.is_empty() {
            return "Error: search text cannot be empty.".to_string();
        }
        let needle_lower = needle.to_lowercase();

        let events = match self.provider.upcoming_events(self.delete_search_window).await {
            Ok(events) => events,
            Err(e) => {
                warn!("Calendar list failed: {}", e);
                return format!("Error deleting event: {}", e);
            }
        };

        let Some(event) = events
            .iter()
            .find(|e| e.summary.to_lowercase().contains(&needle_lower))
        else {
            return format!("No event found containing '{}'", needle);
        };

        match self.provider.delete_event(&event.id).await {
            Ok(()) => {
                info!("Deleted calendar event {} ({})", event.summary, event.id);
                format!("Deleted event: {}", event.summary)
            }
            Err(e) => {
                warn!("Calendar delete failed: {}", e);
                format!("Error deleting event: {}", e)
            }
        }
    }
}
