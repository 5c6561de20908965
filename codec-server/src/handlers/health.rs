//! GET /health and GET /api/codec-status.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::AppState;

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodecStatus {
    pub status: &'static str,
    pub frequency: String,
    pub last_communication: String,
}

/// Most recent transmission across all sessions.
pub async fn codec_status(State(state): State<AppState>) -> Json<CodecStatus> {
    let beacon = state.beacon.read().await;
    Json(CodecStatus {
        status: "online",
        frequency: beacon.frequency.clone(),
        last_communication: beacon.last_communication.to_rfc3339(),
    })
}
