//! Codec session API.
//!
//! Each session owns one `NavigationController`. Every mutating call returns
//! the result of the transition plus a fresh render snapshot.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

use codec_core::{
    AccessibilityFlag, AccessibilityFlags, Direction, KeyEffect, KeyInput, RenderSnapshot,
    TuneOutcome,
};

use crate::error::AppError;
use crate::state::AppState;

// ─── Request bodies ───────────────────────────────────────────

/// Optional initial flags, e.g. from `prefers-reduced-motion`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub reduced_motion: bool,
    #[serde(default)]
    pub high_contrast: bool,
    #[serde(default)]
    pub disable_scanlines: bool,
}

impl From<CreateSessionRequest> for AccessibilityFlags {
    fn from(req: CreateSessionRequest) -> Self {
        AccessibilityFlags {
            reduced_motion: req.reduced_motion,
            high_contrast: req.high_contrast,
            disable_scanlines: req.disable_scanlines,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub frequency: String,
}

#[derive(Debug, Deserialize)]
pub struct TuneRequest {
    pub direction: Direction,
}

#[derive(Debug, Deserialize)]
pub struct KeyRequest {
    pub key: String,
}

// ─── Responses ────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub snapshot: RenderSnapshot,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TuneResponse {
    pub session_id: Uuid,
    pub outcome: TuneOutcome,
    pub snapshot: RenderSnapshot,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyResponse {
    pub session_id: Uuid,
    pub result: KeyEffect,
    pub snapshot: RenderSnapshot,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleResponse {
    pub session_id: Uuid,
    pub enabled: bool,
    pub snapshot: RenderSnapshot,
}

/// Decode a JSON body. Failures surface as `InvalidInput` (400).
fn parse_body<T: DeserializeOwned>(body: &[u8], what: &str) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| AppError::InvalidInput(format!("{}: {}", what, e)))
}

// ─── Handlers ─────────────────────────────────────────────────

/// POST /api/sessions. An empty body opens a session with default flags.
pub async fn create_session(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let req: CreateSessionRequest = if body.is_empty() {
        CreateSessionRequest::default()
    } else {
        parse_body(&body, "session request")?
    };

    let session_id = state.open_session(req.into()).await;
    let snapshot = state.with_session(session_id, |nav| nav.render()).await?;
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            session_id,
            snapshot,
        }),
    ))
}

/// GET /api/sessions/:id. Advances the reveal to now.
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let snapshot = state.with_session(session_id, |nav| nav.render()).await?;
    Ok(Json(SessionResponse {
        session_id,
        snapshot,
    }))
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.close_session(session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn select_frequency(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<TuneResponse>, AppError> {
    let req: SelectRequest = parse_body(&body, "select request")?;
    let (outcome, snapshot) = state
        .with_session(session_id, |nav| {
            let outcome = nav.select_frequency(req.frequency.trim());
            (outcome, nav.render())
        })
        .await?;
    state
        .record_transmission(&outcome.tuning, outcome.easter_egg.as_ref())
        .await;
    Ok(Json(TuneResponse {
        session_id,
        outcome,
        snapshot,
    }))
}

pub async fn tune(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<TuneResponse>, AppError> {
    let req: TuneRequest = parse_body(&body, "tune request")?;
    let (outcome, snapshot) = state
        .with_session(session_id, |nav| {
            let outcome = nav.tune(req.direction);
            (outcome, nav.render())
        })
        .await?;
    state
        .record_transmission(&outcome.tuning, outcome.easter_egg.as_ref())
        .await;
    Ok(Json(TuneResponse {
        session_id,
        outcome,
        snapshot,
    }))
}

/// POST /api/sessions/:id/key with a DOM key name.
pub async fn key(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<KeyResponse>, AppError> {
    let req: KeyRequest = parse_body(&body, "key request")?;
    let input = KeyInput::from_key_name(&req.key);
    let (result, snapshot) = state
        .with_session(session_id, |nav| {
            let effect = nav.handle_key(input);
            (effect, nav.render())
        })
        .await?;
    if let KeyEffect::Tuned(outcome) = &result {
        state
            .record_transmission(&outcome.tuning, outcome.easter_egg.as_ref())
            .await;
    }
    Ok(Json(KeyResponse {
        session_id,
        result,
        snapshot,
    }))
}

pub async fn toggle_projects(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<ToggleResponse>, AppError> {
    let (enabled, snapshot) = state
        .with_session(session_id, |nav| {
            let visible = nav.toggle_projects_panel();
            (visible, nav.render())
        })
        .await?;
    Ok(Json(ToggleResponse {
        session_id,
        enabled,
        snapshot,
    }))
}

/// POST /api/sessions/:id/accessibility/:flag
pub async fn toggle_accessibility(
    State(state): State<AppState>,
    Path((session_id, flag)): Path<(Uuid, String)>,
) -> Result<Json<ToggleResponse>, AppError> {
    let flag = AccessibilityFlag::parse(&flag).ok_or_else(|| {
        AppError::InvalidInput(format!(
            "unknown accessibility flag '{}' (expected reduced-motion, high-contrast or disable-scanlines)",
            flag
        ))
    })?;
    let (enabled, snapshot) = state
        .with_session(session_id, |nav| {
            let enabled = nav.toggle_accessibility(flag);
            (enabled, nav.render())
        })
        .await?;
    tracing::debug!(session_id = %session_id, ?flag, enabled, "accessibility toggled");
    Ok(Json(ToggleResponse {
        session_id,
        enabled,
        snapshot,
    }))
}

/// POST /api/sessions/:id/skip: finish the current reveal.
pub async fn skip_reveal(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let snapshot = state
        .with_session(session_id, |nav| {
            nav.skip_reveal();
            nav.render()
        })
        .await?;
    Ok(Json(SessionResponse {
        session_id,
        snapshot,
    }))
}

/// POST /api/sessions/:id/replay: restart the current dialogue.
pub async fn replay_dialogue(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let snapshot = state
        .with_session(session_id, |nav| {
            nav.replay_dialogue();
            nav.render()
        })
        .await?;
    Ok(Json(SessionResponse {
        session_id,
        snapshot,
    }))
}
