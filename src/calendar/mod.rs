//! Calendar integration.
//!
//! A [`CalendarProvider`] does the raw event calls; [`CalendarService`]
//! turns them into the plain-text replies the agent sees. The only
//! provider shipped is Google Calendar v3.

mod google;
pub mod oauth;
pub(crate) mod service;
mod weekday;

pub use google::GoogleCalendar;
pub use service::{CalendarService, EventRequest};
pub use weekday::{next_occurrence, parse_time_of_day, parse_weekday, resolve_weekday};

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

/// An event as returned by the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub id: String,
    pub summary: String,
    pub start: EventStart,
}

/// When an event starts.
#[derive(Debug, Clone, PartialEq)]
pub enum EventStart {
    /// Timed event, in the offset the provider reported.
    DateTime(DateTime<FixedOffset>),
    /// All-day event.
    Date(NaiveDate),
    /// Anything the provider sent that didn't parse.
    Raw(String),
}

impl EventStart {
    /// Short human form, e.g. `Monday 14/10 10:00`.
    pub fn display(&self) -> String {
        match self {
            EventStart::DateTime(dt) => dt.format("%A %d/%m %H:%M").to_string(),
            EventStart::Date(d) => d.format("%Y-%m-%d").to_string(),
            EventStart::Raw(s) => s.clone(),
        }
    }
}

/// An event to be created.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub summary: String,
    pub description: String,
    /// Local wall-clock start in `timezone`.
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// IANA timezone name.
    pub timezone: String,
}

/// Raw calendar operations.
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// Upcoming events from now, ordered by start time.
    async fn upcoming_events(&self, max_results: u32) -> Result<Vec<CalendarEvent>>;

    /// Insert an event.
    async fn insert_event(&self, event: &NewEvent) -> Result<CalendarEvent>;

    /// Delete an event by id.
    async fn delete_event(&self, event_id: &str) -> Result<()>;

    /// Provider name for display.
    fn name(&self) -> &str;
}
