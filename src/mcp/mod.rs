//! MCP (Model Context Protocol) server for gymbot.
//!
//! Allows AI assistants to book gym classes through gymbot's tools.
//! Implements JSON-RPC 2.0 over stdio.

mod protocol;
mod server;
mod tools;

pub use server::McpServer;
