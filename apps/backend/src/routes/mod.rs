//! HTTP routes

pub mod items;
pub mod review;
pub mod settings;
pub mod stats;
pub mod test_session;
pub mod transfer;

use axum::{
    extract::State,
    routing::{get, post, put},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::models::HealthResponse;
use crate::AppState;

/// Build the full application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Item routes
        .route("/api/items", get(items::list).post(items::create))
        .route("/api/items/bulk-edit", post(items::bulk_edit))
        .route("/api/items/bulk-delete", post(items::bulk_delete))
        .route(
            "/api/items/:id",
            get(items::get).put(items::update).delete(items::delete),
        )
        // Review routes
        .route("/api/review", get(review::current))
        .route("/api/review/due", get(review::due))
        .route("/api/review/start", post(review::start))
        .route("/api/review/reveal", post(review::reveal))
        .route("/api/review/answer", post(review::answer))
        .route("/api/review/skip", post(review::skip))
        .route("/api/review/reset", post(review::reset))
        // Test routes
        .route("/api/test", get(test_session::current))
        .route("/api/test/settings", put(test_session::update_settings))
        .route("/api/test/prepare", post(test_session::prepare))
        .route("/api/test/answer", post(test_session::answer))
        .route("/api/test/skip", post(test_session::skip))
        .route("/api/test/cancel", post(test_session::cancel))
        .route("/api/test/history", get(test_session::history))
        // Progress routes
        .route("/api/stats", get(stats::get))
        .route("/api/settings", get(settings::get).put(settings::update))
        // Import/export routes
        .route("/api/import", post(transfer::import))
        .route("/api/export", get(transfer::export))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        persistence: state.persistence.health(),
    })
}
