//! Item endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use crate::error::Result;
use crate::models::*;
use crate::AppState;

/// GET /api/items
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<VocabularyItem>>> {
    let vocab = state.vocab()?;
    Ok(Json(vocab.items().to_vec()))
}

/// GET /api/items/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
) -> Result<Json<VocabularyItem>> {
    let vocab = state.vocab()?;
    Ok(Json(vocab.item(id)?.clone()))
}

/// POST /api/items
pub async fn create(
    State(state): State<AppState>,
    Json(draft): Json<ItemDraft>,
) -> Result<(StatusCode, Json<ApiResponse<VocabularyItem>>)> {
    let mut vocab = state.vocab()?;
    let committed = vocab.add_item(&draft, Utc::now())?;
    Ok((StatusCode::CREATED, Json(committed.into())))
}

/// PUT /api/items/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
    Json(draft): Json<ItemDraft>,
) -> Result<Json<ApiResponse<VocabularyItem>>> {
    let mut vocab = state.vocab()?;
    let committed = vocab.edit_item(id, &draft, Utc::now())?;
    Ok(Json(committed.into()))
}

/// DELETE /api/items/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
) -> Result<Json<ApiResponse<VocabularyItem>>> {
    let mut vocab = state.vocab()?;
    let committed = vocab.delete_item(id, Utc::now())?;
    Ok(Json(committed.into()))
}

/// POST /api/items/bulk-edit
pub async fn bulk_edit(
    State(state): State<AppState>,
    Json(request): Json<BulkEditRequest>,
) -> Result<Json<ApiResponse<BulkResponse>>> {
    let mut vocab = state.vocab()?;
    let committed = vocab.bulk_edit(&request.ids, &request.edit, Utc::now());
    Ok(Json(committed.map(|affected| BulkResponse { affected }).into()))
}

/// POST /api/items/bulk-delete
pub async fn bulk_delete(
    State(state): State<AppState>,
    Json(request): Json<BulkDeleteRequest>,
) -> Result<Json<ApiResponse<BulkResponse>>> {
    let mut vocab = state.vocab()?;
    let committed = vocab.bulk_delete(&request.ids, Utc::now());
    Ok(Json(committed.map(|affected| BulkResponse { affected }).into()))
}
