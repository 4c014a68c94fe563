//! MCP tool definitions for gymbot.

use super::protocol::Tool;
use crate::tools::tool_specs;

/// Get all available tools.
pub fn get_tools(calendar_enabled: bool) -> Vec<Tool> {
    tool_specs(calendar_enabled)
        .into_iter()
        .map(|spec| Tool {
            name: spec.name.to_string(),
            description: spec.description.to_string(),
            input_schema: spec.parameters,
        })
        .collect()
}
