//! Tool calls and their execution.

use crate::booking::BookingStore;
use crate::calendar::{CalendarService, EventRequest};
use crate::error::{GymError, Result};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// A parsed request to run one tool.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    /// List every class with remaining capacity.
    ListClasses,

    BookClass { class_name: String, user_name: String },

    CancelBooking { class_name: String, user_name: String },

    GetMyBookings { user_name: String },

    ListCalendarEvents { max_results: Option<u32> },

    CreateCalendarEvent {
        title: String,
        day: String,
        time: String,
        duration_hours: f64,
        description: String,
    },

    DeleteCalendarEvent { title_contains: String },
}

fn default_duration_hours() -> f64 {
    1.0
}

impl ToolCall {
    /// The tool's registered name.
    pub fn name(&self) -> &'static str {
        match self {
            ToolCall::ListClasses => "list_classes",
            ToolCall::BookClass { .. } => "book_class",
            ToolCall::CancelBooking { .. } => "cancel_booking",
            ToolCall::GetMyBookings { .. } => "get_my_bookings",
            ToolCall::ListCalendarEvents { .. } => "list_calendar_events",
            ToolCall::CreateCalendarEvent { .. } => "create_calendar_event",
            ToolCall::DeleteCalendarEvent { .. } => "delete_calendar_event",
        }
    }
}

/// Parse a tool call from a name and a JSON arguments string.
pub fn parse_tool_call(name: &str, arguments: &str) -> Result<ToolCall> {
    let args: Value = if arguments.trim().is_empty() {
        Value::Object(Default::default())
    } else {
        serde_json::from_str(arguments)
            .map_err(|e| GymError::InvalidInput(format!("tool arguments are not valid JSON: {}", e)))?
    };
    tool_call_from_value(name, &args)
}

/// Build a tool call from already-decoded arguments.
///
/// Missing string arguments become empty strings, so the booking layer
/// reports them the same way as blank input.
pub fn tool_call_from_value(name: &str, args: &Value) -> Result<ToolCall> {
    if !args.is_object() && !args.is_null() {
        return Err(GymError::InvalidInput(format!(
            "arguments for {} must be a JSON object",
            name
        )));
    }

    let text = |key: &str| -> String {
        args.get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    match name {
        "list_classes" => Ok(ToolCall::ListClasses),
        "book_class" => Ok(ToolCall::BookClass {
            class_name: text("class_name"),
            user_name: text("user_name"),
        }),
        "cancel_booking" => Ok(ToolCall::CancelBooking {
            class_name: text("class_name"),
            user_name: text("user_name"),
        }),
        "get_my_bookings" => Ok(ToolCall::GetMyBookings {
            user_name: text("user_name"),
        }),
        "list_calendar_events" => {
            let max_results = match args.get("max_results") {
                None | Some(Value::Null) => None,
                Some(v) => Some(
                    v.as_u64()
                        .and_then(|n| u32::try_from(n).ok())
                        .ok_or_else(|| {
                            GymError::InvalidInput("'max_results' must be a positive integer".to_string())
                        })?,
                ),
            };
            Ok(ToolCall::ListCalendarEvents { max_results })
        }
        "create_calendar_event" => {
            let duration_hours = match args.get("duration_hours") {
                None | Some(Value::Null) => default_duration_hours(),
                Some(v) => v.as_f64().ok_or_else(|| {
                    GymError::InvalidInput("'duration_hours' must be a number".to_string())
                })?,
            };
            Ok(ToolCall::CreateCalendarEvent {
                title: text("title"),
                day: text("day"),
                time: text("time"),
                duration_hours,
                description: text("description"),
            })
        }
        "delete_calendar_event" => Ok(ToolCall::DeleteCalendarEvent {
            title_contains: text("title_contains"),
        }),
        _ => Err(GymError::Agent(format!("Unknown tool: {}", name))),
    }
}

/// Everything a tool needs to run.
#[derive(Clone)]
pub struct ToolContext {
    pub store: Arc<BookingStore>,
    pub calendar: Option<Arc<CalendarService>>,
}

impl ToolContext {
    pub fn new(store: Arc<BookingStore>) -> Self {
        Self {
            store,
            calendar: None,
        }
    }

    pub fn with_calendar(mut self, calendar: Arc<CalendarService>) -> Self {
        self.calendar = Some(calendar);
        self
    }

    pub fn calendar_enabled(&self) -> bool {
        self.calendar.is_some()
    }

    /// Run a tool; every outcome, including failure, is a message.
    pub async fn execute(&self, tool: &ToolCall) -> String {
        debug!("Executing tool {}", tool.name());

        match tool {
            ToolCall::ListClasses => self.store.list_classes(),
            ToolCall::BookClass {
                class_name,
                user_name,
            } => self.store.book_class(class_name, user_name).to_string(),
            ToolCall::CancelBooking {
                class_name,
                user_name,
            } => self.store.cancel_booking(class_name, user_name).to_string(),
            ToolCall::GetMyBookings { user_name } => {
                self.store.get_my_bookings(user_name).to_string()
            }
            ToolCall::ListCalendarEvents { max_results } => match &self.calendar {
                Some(calendar) => calendar.list_upcoming(*max_results).await,
                None => calendar_not_configured(),
            },
            ToolCall::CreateCalendarEvent {
                title,
                day,
                time,
                duration_hours,
                description,
            } => match &self.calendar {
                Some(calendar) => {
                    let request = EventRequest {
                        title: title.clone(),
                        day: day.clone(),
                        time: time.clone(),
                        duration_hours: *duration_hours,
                        description: description.clone(),
                    };
                    calendar.create_event(&request).await
                }
                None => calendar_not_configured(),
            },
            ToolCall::DeleteCalendarEvent { title_contains } => match &self.calendar {
                Some(calendar) => calendar.delete_by_title(title_contains).await,
                None => calendar_not_configured(),
            },
        }
    }

    /// Parse and run a tool by name.
    pub async fn execute_named(&self, name: &str, arguments: &str) -> String {
        match parse_tool_call(name, arguments) {
            Ok(tool) => self.execute(&tool).await,
            Err(e) => unknown_or_invalid(name, e),
        }
    }

    /// Same as [`execute_named`](Self::execute_named) with decoded arguments.
    pub async fn execute_value(&self, name: &str, arguments: &Value) -> String {
        match tool_call_from_value(name, arguments) {
            Ok(tool) => self.execute(&tool).await,
            Err(e) => unknown_or_invalid(name, e),
        }
    }
}

fn calendar_not_configured() -> String {
    "Error: calendar integration is not configured.".to_string()
}

fn unknown_or_invalid(name: &str, error: GymError) -> String {
    if is_known_tool(name) {
        format!("Error: {}", error)
    } else {
        format!("Error: Tool {} not found.", name)
    }
}

/// Whether `name` is one of the declared tools.
pub fn is_known_tool(name: &str) -> bool {
    super::tool_specs(true).iter().any(|s| s.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::ClassRecord;
    use crate::calendar::service::tests::FakeProvider;
    use crate::config::CalendarSettings;

    fn context() -> ToolContext {
        ToolContext::new(Arc::new(BookingStore::in_memory(vec![
            ClassRecord::new("Yoga", "Monday", "10:00", 2),
            ClassRecord::new("Pilates", "Tuesday", "11:00", 1).with_bookings(["Alice"]),
        ])))
    }

    #[test]
    fn test_parse_book_class() {
        let tool = parse_tool_call(
            "book_class",
            r#"{"class_name": "Yoga", "user_name": "Bob"}"#,
        )
        .unwrap();
        assert_eq!(
            tool,
            ToolCall::BookClass {
                class_name: "Yoga".to_string(),
                user_name: "Bob".to_string()
            }
        );
        assert_eq!(tool.name(), "book_class");
    }

    #[test]
    fn test_parse_missing_arguments_become_empty() {
        let tool = parse_tool_call("get_my_bookings", "{}").unwrap();
        assert_eq!(
            tool,
            ToolCall::GetMyBookings {
                user_name: String::new()
            }
        );
        assert_eq!(parse_tool_call("list_classes", "").unwrap(), ToolCall::ListClasses);
    }

    #[test]
    fn test_parse_create_event_defaults() {
        let tool = parse_tool_call(
            "create_calendar_event",
            r#"{"title": "Yoga", "day": "lunes", "time": "10:00"}"#,
        )
        .unwrap();
        match tool {
            ToolCall::CreateCalendarEvent {
                duration_hours,
                description,
                ..
            } => {
                assert_eq!(duration_hours, 1.0);
                assert!(description.is_empty());
            }
            _ => panic!("Expected CreateCalendarEvent tool"),
        }
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(parse_tool_call("book_class", "not json").is_err());
        assert!(parse_tool_call("launch_rocket", "{}").is_err());
        assert!(parse_tool_call("list_calendar_events", r#"{"max_results": -3}"#).is_err());
        assert!(parse_tool_call("book_class", "[1, 2]").is_err());
    }

    #[test]
    fn test_bad_arguments_are_invalid_input() {
        for (name, arguments) in [
            ("book_class", "not json"),
            ("book_class", "[1, 2]"),
            ("list_calendar_events", r#"{"max_results": -3}"#),
            ("create_calendar_event", r#"{"duration_hours": "two"}"#),
        ] {
            match parse_tool_call(name, arguments) {
                Err(GymError::InvalidInput(_)) => {}
                other => panic!("{} {}: expected InvalidInput, got {:?}", name, arguments, other),
            }
        }

        // Unknown tools are not an argument problem
        assert!(matches!(
            parse_tool_call("launch_rocket", "{}"),
            Err(GymError::Agent(_))
        ));
    }

    #[tokio::test]
    async fn test_execute_booking_tools() {
        let ctx = context();
        assert!(ctx
            .execute(&ToolCall::ListClasses)
            .await
            .contains("Pilates (Tuesday 11:00): 1 slots left"));

        let booked = ctx
            .execute_named("book_class", r#"{"class_name": "yoga", "user_name": "Bob"}"#)
            .await;
        assert_eq!(booked, "Successfully booked Yoga for Bob.");

        let full = ctx
            .execute_named("book_class", r#"{"class_name": "Pilates", "user_name": "Bob"}"#)
            .await;
        assert!(full.to_lowercase().contains("full"));

        let mine = ctx
            .execute_named("get_my_bookings", r#"{"user_name": "Bob"}"#)
            .await;
        assert_eq!(mine, "Bookings for Bob:\n- Yoga (Monday 10:00)");

        let cancelled = ctx
            .execute_named("cancel_booking", r#"{"class_name": "Yoga", "user_name": "Bob"}"#)
            .await;
        assert_eq!(cancelled, "Booking cancelled for Bob in Yoga.");
    }

    #[test]
    fn test_execute_blank_arguments() {
        let ctx = context();
        assert_eq!(
            tokio_test::block_on(ctx.execute_named("book_class", r#"{"user_name": "Bob"}"#)),
            "Error: Class name cannot be empty."
        );
    }

    #[tokio::test]
    async fn test_execute_unknown_tool() {
        let ctx = context();
        assert_eq!(
            ctx.execute_named("launch_rocket", "{}").await,
            "Error: Tool launch_rocket not found."
        );
        assert!(ctx
            .execute_named("book_class", "{oops")
            .await
            .starts_with("Error: Invalid input: tool arguments are not valid JSON"));
    }

    #[tokio::test]
    async fn test_calendar_tools_without_calendar() {
        let ctx = context();
        assert!(!ctx.calendar_enabled());
        assert_eq!(
            ctx.execute(&ToolCall::ListCalendarEvents { max_results: None })
                .await,
            "Error: calendar integration is not configured."
        );
    }

    #[tokio::test]
    async fn test_calendar_tools_with_calendar() {
        let provider = Arc::new(FakeProvider::with_events(&["Yoga class"]));
        let calendar = Arc::new(CalendarService::new(provider, &CalendarSettings::default()));
        let ctx = context().with_calendar(calendar);
        assert!(ctx.calendar_enabled());

        let listed = ctx
            .execute_value("list_calendar_events", &serde_json::json!({}))
            .await;
        assert!(listed.contains("Yoga class"));

        let deleted = ctx
            .execute_value(
                "delete_calendar_event",
                &serde_json::json!({"title_contains": "yoga"}),
            )
            .await;
        assert_eq!(deleted, "Deleted event: Yoga class");
    }

    #[tokio::test]
    async fn test_create_event_with_huge_duration_is_an_error() {
        let provider = Arc::new(FakeProvider::with_events(&[]));
        let calendar = Arc::new(CalendarService::new(provider, &CalendarSettings::default()));
        let ctx = context().with_calendar(calendar);

        let result = ctx
            .execute_value(
                "create_calendar_event",
                &serde_json::json!({
                    "title": "Marathon",
                    "day": "Monday",
                    "time": "10:00",
                    "duration_hours": 1e300,
                }),
            )
            .await;
        assert_eq!(result, "Error: invalid duration");
    }
}
