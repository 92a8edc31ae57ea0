use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Instant;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::error;

use tether_core::{CommandSource, InjectError, now_ms};

use crate::relay::HubHandle;
use crate::signaling::{Gateway, ws_handler};

/// Default number of records for `GET /robot/commands`.
const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Records included in the health summary.
const HEALTH_RECENT_COMMANDS: usize = 5;

/// Shared state for the axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub hub: HubHandle,
    pub gateway: Gateway,
    pub started: Instant,
}

pub fn build_router(state: AppState, static_dir: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .route("/robot/status", get(robot_status))
        .route("/robot/commands", get(command_history))
        .route("/stats", get(stats))
        .route("/robot/command", post(send_command))
        .route("/robot/emergency-stop", post(emergency_stop))
        .fallback_service(ServeDir::new(static_dir))
        .layer(cors)
        .with_state(state)
}

fn rfc3339_now() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

fn internal(err: anyhow::Error) -> StatusCode {
    error!("Relay hub query failed: {}", err);
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn health(State(app): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let status = app.hub.status().await.map_err(internal)?;
    let summary = app.hub.summary().await.map_err(internal)?;
    let recent = app
        .hub
        .recent(HEALTH_RECENT_COMMANDS)
        .await
        .map_err(internal)?;

    let connected = |occupied: bool| if occupied { "connected" } else { "disconnected" };

    Ok(Json(json!({
        "status": "ok",
        "timestamp": rfc3339_now(),
        "connections": {
            "viewer": connected(summary.viewer_connected),
            "streamer": connected(summary.streamer_connected),
        },
        "robotStatus": status,
        "recentCommands": recent,
        "uptime": app.started.elapsed().as_secs(),
    })))
}

async fn robot_status(State(app): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let status = app.hub.status().await.map_err(internal)?;

    Ok(Json(json!({
        "status": status,
        "lastUpdate": rfc3339_now(),
    })))
}

#[derive(Debug, Deserialize)]
struct HistoryParams {
    limit: Option<usize>,
}

async fn command_history(
    State(app): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Value>, StatusCode> {
    let limit = params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let (commands, total) = app.hub.history(limit).await.map_err(internal)?;

    Ok(Json(json!({
        "commands": commands,
        "total": total,
    })))
}

async fn stats(State(app): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let hour_ago = now_ms() - 60 * 60 * 1000;
    let (breakdown, total) = app.hub.stats(hour_ago).await.map_err(internal)?;
    let status = app.hub.status().await.map_err(internal)?;
    let summary = app.hub.summary().await.map_err(internal)?;
    let last_hour: u64 = breakdown.values().sum();

    Ok(Json(json!({
        "totalCommands": total,
        "commandsLastHour": last_hour,
        "commandBreakdown": breakdown,
        "currentStatus": status,
        "serverUptime": app.started.elapsed().as_secs(),
        "connections": {
            "viewer": summary.viewer_connected,
            "streamer": summary.streamer_connected,
        },
    })))
}

fn empty_params() -> Value {
    json!({})
}

#[derive(Debug, Deserialize)]
struct CommandBody {
    command: Option<String>,
    #[serde(default = "empty_params")]
    params: Value,
}

async fn send_command(
    State(app): State<AppState>,
    Json(body): Json<CommandBody>,
) -> (StatusCode, Json<Value>) {
    let Some(command) = body.command.filter(|c| !c.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "error": "Command is required" })),
        );
    };

    match app
        .hub
        .inject(command.clone(), body.params, CommandSource::Api)
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": format!("Command \"{command}\" sent to robot"),
            })),
        ),
        Err(err) => inject_failure(err),
    }
}

async fn emergency_stop(State(app): State<AppState>) -> (StatusCode, Json<Value>) {
    match app
        .hub
        .inject(
            "emergency_stop".to_owned(),
            empty_params(),
            CommandSource::ApiEmergency,
        )
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "Emergency stop command sent to robot",
            })),
        ),
        Err(err) => inject_failure(err),
    }
}

fn inject_failure(err: anyhow::Error) -> (StatusCode, Json<Value>) {
    if let Some(inject) = err.downcast_ref::<InjectError>() {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "success": false, "error": inject.to_string() })),
        )
    } else {
        error!("Command injection failed: {}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "success": false, "error": "Internal server error" })),
        )
    }
}
