//! Named tools shared by the chat agent, the MCP server and the HTTP API.
//!
//! Each tool has a statically declared schema and returns a single
//! string. Tools never fail: errors come back as messages the model
//! can relay to the user.

mod definitions;
mod dispatch;

pub use definitions::{openai_tools, tool_specs, ToolSpec, CALENDAR_TOOLS};
pub use dispatch::{is_known_tool, parse_tool_call, tool_call_from_value, ToolCall, ToolContext};
