//! CLI command implementations.

mod ask;
mod bookings;
mod calendar;
mod chat;
mod config;
mod doctor;
mod init;
mod mcp;
mod serve;

pub use ask::run_ask;
pub use bookings::{run_book, run_bookings, run_cancel, run_classes};
pub use calendar::run_calendar;
pub use chat::run_chat;
pub use config::run_config;
pub use doctor::run_doctor;
pub use init::run_init;
pub use mcp::run_mcp;
pub use serve::run_serve;

use crate::booking::BookingStore;
use crate::calendar::CalendarService;
use crate::cli::preflight::{self, Operation};
use crate::config::Settings;
use crate::tools::ToolContext;
use std::sync::Arc;
use tracing::{info, warn};

/// Build the tools shared by the agent, MCP and HTTP surfaces.
///
/// Calendar tools are offered only when the calendar is enabled and
/// authorized; anything else leaves the booking tools on their own.
pub(crate) fn tool_context(settings: &Settings) -> ToolContext {
    let store = Arc::new(BookingStore::from_settings(settings));
    info!("Using bookings file {}", settings.bookings_path().display());
    let context = ToolContext::new(store);

    if !settings.calendar.enabled {
        return context;
    }

    if let Err(e) = preflight::check(Operation::Calendar, settings) {
        warn!("Calendar disabled: {}", e);
        return context;
    }

    match CalendarService::from_settings(settings) {
        Ok(service) => {
            info!("Calendar tools enabled ({})", service.provider_name());
            context.with_calendar(Arc::new(service))
        }
        Err(e) => {
            warn!("Calendar disabled: {}", e);
            context
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calendar_stays_off_without_token() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.bookings.path = dir.path().join("bookings.json").display().to_string();
        settings.calendar.enabled = true;
        settings.calendar.token_path = dir.path().join("token.json").display().to_string();

        let context = tool_context(&settings);
        assert!(!context.calendar_enabled());
        assert_eq!(context.store.path(), Some(settings.bookings_path().as_path()));
    }
}
