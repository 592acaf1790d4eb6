//! Import and export endpoints

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::AppState;

/// POST /api/import
pub async fn import(
    State(state): State<AppState>,
    Json(request): Json<ImportRequest>,
) -> Result<Json<ApiResponse<ImportSummary>>> {
    let mut vocab = state.vocab()?;
    let committed = vocab.import(&request.content, request.format, request.mode, Utc::now())?;
    tracing::info!(
        imported = committed.value.imported,
        mode = ?committed.value.mode,
        "vocabulary imported"
    );
    Ok(Json(committed.into()))
}

/// GET /api/export?format=json|csv
pub async fn export(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<Response> {
    let format = match query.format.as_deref() {
        None => TransferFormat::Json,
        Some(raw) => TransferFormat::parse(raw)
            .ok_or_else(|| ApiError::BadRequest(format!("unknown export format: {raw}")))?,
    };
    let body = state.vocab()?.export(format)?;
    Ok(([(header::CONTENT_TYPE, format.content_type())], body).into_response())
}
