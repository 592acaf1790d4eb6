//! Settings endpoints

use axum::{extract::State, Json};

use crate::error::Result;
use crate::models::*;
use crate::AppState;

/// GET /api/settings
pub async fn get(State(state): State<AppState>) -> Result<Json<UserSettings>> {
    let vocab = state.vocab()?;
    Ok(Json(vocab.settings().clone()))
}

/// PUT /api/settings
pub async fn update(
    State(state): State<AppState>,
    Json(settings): Json<UserSettings>,
) -> Result<Json<ApiResponse<UserSettings>>> {
    let mut vocab = state.vocab()?;
    let committed = vocab.update_settings(settings)?;
    Ok(Json(committed.into()))
}
