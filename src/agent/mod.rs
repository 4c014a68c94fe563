//! Chat agent with tool calling.
//!
//! Sends user messages and tool results to a chat completion model and
//! runs the booking and calendar tools the model asks for.

mod runner;

pub use runner::{Agent, AgentResponse, ToolCallRecord};
