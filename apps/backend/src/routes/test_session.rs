//! Test session endpoints

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use vocab_core::Vocabulary;

use crate::error::Result;
use crate::models::*;
use crate::AppState;

fn test_view(vocab: &Vocabulary, now: DateTime<Utc>) -> TestView {
    let test = vocab.test();
    TestView {
        state: test.state(),
        settings: test.settings().clone(),
        current_question: test.current_question().cloned(),
        answered: test.answers().len(),
        total_questions: test.questions().len(),
        remaining_secs: test.remaining_secs(now),
        result: test.result().cloned(),
    }
}

/// GET /api/test
pub async fn current(State(state): State<AppState>) -> Result<Json<TestView>> {
    let vocab = state.vocab()?;
    Ok(Json(test_view(&vocab, Utc::now())))
}

/// PUT /api/test/settings
pub async fn update_settings(
    State(state): State<AppState>,
    Json(settings): Json<TestSettings>,
) -> Result<Json<ApiResponse<TestView>>> {
    let mut vocab = state.vocab()?;
    vocab.configure_test(settings)?;
    Ok(Json(ApiResponse::ok(test_view(&vocab, Utc::now()))))
}

/// POST /api/test/prepare
pub async fn prepare(State(state): State<AppState>) -> Result<Json<ApiResponse<TestView>>> {
    let view = {
        let mut vocab = state.vocab()?;
        let now = Utc::now();
        vocab.prepare_test(now)?;
        // Timer changes happen under the lock so they stay ordered with test state.
        if vocab.test().settings().time_limit_secs > 0 {
            state.timer.start(state.vocab.clone());
        } else {
            state.timer.stop();
        }
        test_view(&vocab, now)
    };
    Ok(Json(ApiResponse::ok(view)))
}

/// POST /api/test/answer
pub async fn answer(
    State(state): State<AppState>,
    Json(request): Json<TestAnswerRequest>,
) -> Result<Json<ApiResponse<TestAnswerResponse>>> {
    let committed = {
        let mut vocab = state.vocab()?;
        let now = Utc::now();
        let committed = vocab.answer_test(&request.answer, now)?;
        if committed.value.completed {
            state.timer.stop();
        }
        let test = test_view(&vocab, now);
        committed.map(|feedback| TestAnswerResponse { feedback, test })
    };
    Ok(Json(committed.into()))
}

/// POST /api/test/skip
pub async fn skip(State(state): State<AppState>) -> Result<Json<ApiResponse<TestAnswerResponse>>> {
    let committed = {
        let mut vocab = state.vocab()?;
        let now = Utc::now();
        let committed = vocab.skip_test(now)?;
        if committed.value.completed {
            state.timer.stop();
        }
        let test = test_view(&vocab, now);
        committed.map(|feedback| TestAnswerResponse { feedback, test })
    };
    Ok(Json(committed.into()))
}

/// POST /api/test/cancel
pub async fn cancel(State(state): State<AppState>) -> Result<Json<ApiResponse<TestView>>> {
    let mut vocab = state.vocab()?;
    state.timer.stop();
    vocab.cancel_test();
    Ok(Json(ApiResponse::ok(test_view(&vocab, Utc::now()))))
}

/// GET /api/test/history
pub async fn history(State(state): State<AppState>) -> Result<Json<Vec<TestResult>>> {
    let vocab = state.vocab()?;
    Ok(Json(vocab.test_history().to_vec()))
}
