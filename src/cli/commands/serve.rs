//! HTTP API server for integration with other systems.
//!
//! Exposes the same tools as the agent and the MCP server as REST endpoints.

use super::tool_context;
use crate::cli::Output;
use crate::config::Settings;
use crate::tools::{is_known_tool, tool_specs, ToolContext, CALENDAR_TOOLS};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Shared application state.
struct AppState {
    tools: ToolContext,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let tools = tool_context(&settings);
    let specs = tool_specs(tools.calendar_enabled());
    let app = router(tools);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("gymbot API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("List tools", "GET  /tools");
    Output::kv("Call tool", "POST /tools/{name}");
    println!();
    println!("Tools:");
    for spec in &specs {
        Output::tool_info(spec);
    }
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(tools: ToolContext) -> Router {
    let state = Arc::new(AppState { tools });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/tools", get(list_tools))
        .route("/tools/{name}", post(call_tool))
        .layer(cors)
        .with_state(state)
}

// === Response Types ===

#[derive(Debug, Serialize)]
struct ToolResponse {
    tool: String,
    result: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: String) -> ApiError {
    (status, Json(ErrorResponse { error }))
}

// === Handlers ===

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn list_tools(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({ "tools": tool_specs(state.tools.calendar_enabled()) }))
}

/// Run a tool; an empty body means no arguments.
async fn call_tool(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<ToolResponse>, ApiError> {
    let offered = is_known_tool(&name)
        && (state.tools.calendar_enabled() || !CALENDAR_TOOLS.contains(&name.as_str()));
    if !offered {
        return Err(api_error(
            StatusCode::NOT_FOUND,
            format!("Error: Tool {} not found.", name),
        ));
    }

    let arguments: Value = if body.iter().all(u8::is_ascii_whitespace) {
        json!({})
    } else {
        serde_json::from_slice(&body).map_err(|e| {
            api_error(StatusCode::BAD_REQUEST, format!("Invalid JSON body: {}", e))
        })?
    };

    info!("HTTP calling tool: {} with args: {}", name, arguments);
    let result = state.tools.execute_value(&name, &arguments).await;

    Ok(Json(ToolResponse { tool: name, result }))
}
