//! Statistics endpoint

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use vocab_core::DEFAULT_HISTORY_DAYS;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::AppState;

const MAX_HISTORY_DAYS: u32 = 366;

/// GET /api/stats?days=N
pub async fn get(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<StatisticsSnapshot>> {
    let days = query.days.unwrap_or(DEFAULT_HISTORY_DAYS);
    if days == 0 || days > MAX_HISTORY_DAYS {
        return Err(ApiError::BadRequest(format!(
            "days must be between 1 and {MAX_HISTORY_DAYS}"
        )));
    }
    let vocab = state.vocab()?;
    Ok(Json(vocab.statistics(Utc::now(), days)))
}
