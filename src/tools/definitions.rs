//! Static tool declarations.

use serde::Serialize;
use serde_json::{json, Value};

/// Name, description and argument schema of a tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

/// Tools that need a configured calendar.
pub const CALENDAR_TOOLS: [&str; 3] = [
    "list_calendar_events",
    "create_calendar_event",
    "delete_calendar_event",
];

/// Every tool on offer; calendar tools only when a calendar is configured.
pub fn tool_specs(calendar_enabled: bool) -> Vec<ToolSpec> {
    let mut specs = booking_specs();
    if calendar_enabled {
        specs.extend(calendar_specs());
    }
    specs
}

fn booking_specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: "list_classes",
            description: "Lists all available gym classes with their day, time and remaining slots.",
            parameters: json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        },
        ToolSpec {
            name: "book_class",
            description: "Books a class for a user. Returns a success or error message.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "class_name": {
                        "type": "string",
                        "description": "Name of the class to book (e.g., Yoga, Pilates)"
                    },
                    "user_name": {
                        "type": "string",
                        "description": "Name of the user making the booking"
                    }
                },
                "required": ["class_name", "user_name"]
            }),
        },
        ToolSpec {
            name: "cancel_booking",
            description: "Cancels a booking for a user. Returns a success or error message.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "class_name": {
                        "type": "string",
                        "description": "Name of the class to cancel"
                    },
                    "user_name": {
                        "type": "string",
                        "description": "Name of the user cancelling the booking"
                    }
                },
                "required": ["class_name", "user_name"]
            }),
        },
        ToolSpec {
            name: "get_my_bookings",
            description: "Gets all bookings for a specific user.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "user_name": {
                        "type": "string",
                        "description": "Name of the user to check bookings for"
                    }
                },
                "required": ["user_name"]
            }),
        },
    ]
}

fn calendar_specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: "list_calendar_events",
            description: "Lists the next upcoming events in the user's calendar.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "max_results": {
                        "type": "integer",
                        "description": "Maximum number of events to list (default: 10)",
                        "default": 10
                    }
                },
                "required": []
            }),
        },
        ToolSpec {
            name: "create_calendar_event",
            description: "Creates a calendar event on the next occurrence of a weekday. \
                Use it to add a booked class to the user's calendar.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "title": {
                        "type": "string",
                        "description": "Event title"
                    },
                    "day": {
                        "type": "string",
                        "description": "Day of the week in English or Spanish (e.g., Monday, lunes)"
                    },
                    "time": {
                        "type": "string",
                        "description": "Start time in HH:MM format (e.g., 10:00)"
                    },
                    "duration_hours": {
                        "type": "number",
                        "description": "Duration in hours (default: 1)",
                        "default": 1
                    },
                    "description": {
                        "type": "string",
                        "description": "Optional event description"
                    }
                },
                "required": ["title", "day", "time"]
            }),
        },
        ToolSpec {
            name: "delete_calendar_event",
            description: "Deletes the first upcoming event whose title contains the given text.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "title_contains": {
                        "type": "string",
                        "description": "Text to search for in event titles"
                    }
                },
                "required": ["title_contains"]
            }),
        },
    ]
}

/// OpenAI function/tool definitions for the agent.
pub fn openai_tools(calendar_enabled: bool) -> Vec<async_openai::types::ChatCompletionTool> {
    use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};

    tool_specs(calendar_enabled)
        .into_iter()
        .map(|spec| ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: spec.name.to_string(),
                description: Some(spec.description.to_string()),
                parameters: Some(spec.parameters),
                strict: None,
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_tools_always_present() {
        let names: Vec<_> = tool_specs(false).iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec!["list_classes", "book_class", "cancel_booking", "get_my_bookings"]
        );
    }

    #[test]
    fn test_calendar_tools_when_enabled() {
        let specs = tool_specs(true);
        assert_eq!(specs.len(), 7);
        for name in CALENDAR_TOOLS {
            assert!(specs.iter().any(|s| s.name == name));
        }
    }

    #[test]
    fn test_schemas_are_objects_with_required_lists() {
        for spec in tool_specs(true) {
            assert_eq!(spec.parameters["type"], "object", "{}", spec.name);
            assert!(spec.parameters["required"].is_array(), "{}", spec.name);
            for required in spec.parameters["required"].as_array().unwrap() {
                let key = required.as_str().unwrap();
                assert!(
                    spec.parameters["properties"].get(key).is_some(),
                    "{} requires undeclared {}",
                    spec.name,
                    key
                );
            }
        }
    }

    #[test]
    fn test_openai_tools_conversion() {
        let tools = openai_tools(false);
        assert_eq!(tools.len(), 4);
        assert_eq!(tools[1].function.name, "book_class");
        assert!(tools[1].function.parameters.is_some());
    }
}
