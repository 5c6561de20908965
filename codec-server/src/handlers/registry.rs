//! Read-only registry listings.

use axum::{
    extract::{Path, State},
    Json,
};

use codec_core::{Character, EasterEggHint, Frequency, Project, SequenceMatcher};

use crate::error::AppError;
use crate::state::AppState;

pub async fn list_frequencies(State(state): State<AppState>) -> Json<Vec<Frequency>> {
    Json(state.registry.frequencies().to_vec())
}

pub async fn list_characters(State(state): State<AppState>) -> Json<Vec<Character>> {
    Json(state.registry.characters().to_vec())
}

pub async fn list_projects(State(state): State<AppState>) -> Json<Vec<Project>> {
    Json(state.registry.projects().to_vec())
}

/// Every secret pattern with its hint. Sequences are never listed.
pub async fn list_easter_eggs(State(state): State<AppState>) -> Json<Vec<EasterEggHint>> {
    Json(SequenceMatcher::new(state.registry.patterns()).catalog())
}

pub async fn easter_egg_hint(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EasterEggHint>, AppError> {
    let pattern = state
        .registry
        .pattern(&id)
        .ok_or_else(|| AppError::NotFound(format!("easter egg '{}'", id)))?;
    let hint = SequenceMatcher::new(state.registry.patterns()).hint(&id);
    Ok(Json(EasterEggHint {
        id: pattern.id.clone(),
        name: pattern.name.clone(),
        hint,
    }))
}
