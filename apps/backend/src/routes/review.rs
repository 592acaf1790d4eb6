//! Review session endpoints

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use vocab_core::Vocabulary;

use crate::error::Result;
use crate::models::*;
use crate::AppState;

fn review_view(vocab: &mut Vocabulary, now: DateTime<Utc>, message: Option<String>) -> ReviewView {
    let daily_goal = vocab.daily_goal(now).clone();
    let review = vocab.review();
    let current_item = review
        .current_item()
        .and_then(|id| vocab.item(id).ok())
        .cloned();

    ReviewView {
        state: review.state(),
        current_item,
        revealed: review.is_revealed(),
        remaining: review.remaining(),
        stats: review.stats().cloned(),
        points: review.points(),
        accuracy_percent: review.accuracy_percent(),
        daily_goal,
        message,
    }
}

/// GET /api/review
pub async fn current(State(state): State<AppState>) -> Result<Json<ReviewView>> {
    let mut vocab = state.vocab()?;
    Ok(Json(review_view(&mut vocab, Utc::now(), None)))
}

/// GET /api/review/due
pub async fn due(State(state): State<AppState>) -> Result<Json<DueItemsResponse>> {
    let vocab = state.vocab()?;
    let items: Vec<VocabularyItem> = vocab.due_items(Utc::now()).into_iter().cloned().collect();
    Ok(Json(DueItemsResponse {
        count: items.len(),
        items,
    }))
}

/// POST /api/review/start
///
/// Nothing due is not a failure: the unchanged state comes back with a message.
pub async fn start(State(state): State<AppState>) -> Result<Json<ApiResponse<ReviewView>>> {
    let mut vocab = state.vocab()?;
    let now = Utc::now();
    let message = match vocab.start_review(now) {
        Ok(_) => None,
        Err(err) if err.is_informational() => Some(err.to_string()),
        Err(err) => return Err(err.into()),
    };
    Ok(Json(ApiResponse::ok(review_view(&mut vocab, now, message))))
}

/// POST /api/review/reveal
pub async fn reveal(State(state): State<AppState>) -> Result<Json<ApiResponse<ReviewView>>> {
    let mut vocab = state.vocab()?;
    vocab.reveal()?;
    Ok(Json(ApiResponse::ok(review_view(&mut vocab, Utc::now(), None))))
}

/// POST /api/review/answer
pub async fn answer(
    State(state): State<AppState>,
    Json(request): Json<ReviewAnswerRequest>,
) -> Result<Json<ApiResponse<ReviewAnswerResponse>>> {
    let mut vocab = state.vocab()?;
    let now = Utc::now();
    let committed = vocab.answer_review(request.item_id, request.was_correct, now)?;
    let review = review_view(&mut vocab, now, None);
    Ok(Json(
        committed
            .map(|card| ReviewAnswerResponse { card, review })
            .into(),
    ))
}

/// POST /api/review/skip
pub async fn skip(State(state): State<AppState>) -> Result<Json<ApiResponse<ReviewView>>> {
    let mut vocab = state.vocab()?;
    let now = Utc::now();
    vocab.skip_review(now)?;
    Ok(Json(ApiResponse::ok(review_view(&mut vocab, now, None))))
}

/// POST /api/review/reset
pub async fn reset(State(state): State<AppState>) -> Result<Json<ApiResponse<ReviewView>>> {
    let mut vocab = state.vocab()?;
    vocab.reset_review();
    Ok(Json(ApiResponse::ok(review_view(&mut vocab, Utc::now(), None))))
}
