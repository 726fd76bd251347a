use crate::server::AppState;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{error, info};
use vt_core::{ResourceReport, RoomName, RoomSummary};

#[derive(Debug, Serialize, Deserialize)]
pub struct MetricsListing {
    pub metrics: Vec<ResourceReport>,
    pub rooms: Vec<RoomSummary>,
}

pub async fn hello() -> Json<Value> {
    Json(json!({ "message": "Hello, World!" }))
}

pub async fn post_report(
    State(state): State<AppState>,
    Json(report): Json<ResourceReport>,
) -> Json<ResourceReport> {
    info!("Resource report for room '{}'", report.room_name);
    Json(state.metrics.record(report))
}

pub async fn list_reports(
    State(state): State<AppState>,
) -> Result<Json<MetricsListing>, StatusCode> {
    let rooms = state.broker.list_rooms().await.map_err(|e| {
        error!("Failed to list rooms: {}", e);
        StatusCode::SERVICE_UNAVAILABLE
    })?;

    Ok(Json(MetricsListing {
        metrics: state.metrics.list(),
        rooms,
    }))
}

/// Donor heartbeat probe: 200 with the latest report, 404 if none.
pub async fn get_report(
    State(state): State<AppState>,
    Path(room): Path<String>,
) -> Result<Json<ResourceReport>, StatusCode> {
    state
        .metrics
        .get(&RoomName::from(room))
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}
