//! Database models and API types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

// Re-export shared types from vocab-core
pub use vocab_core::{
    AnswerFeedback, BulkEdit, Committed, DailyGoal, DailyProgressStat, Difficulty, ImportMode,
    ImportSummary, ItemDraft, ItemId, Question, ReviewState, ReviewedCard, SessionStats,
    StatisticsSnapshot, TestAnswer, TestResult, TestSettings, TestState, TransferFormat,
    UserSettings, VocabularyItem,
};

// === Database Entity Types ===

/// Vocabulary item stored in PostgreSQL
#[derive(Debug, Clone, FromRow)]
pub struct DbItem {
    pub id: Uuid,
    pub position: i32,
    pub word: String,
    pub translation: String,
    pub example: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub repetition_level: i32,
    pub correct_count: i32,
    pub incorrect_count: i32,
    pub last_reviewed: Option<DateTime<Utc>>,
    pub next_review_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl DbItem {
    pub fn from_core(position: usize, item: &VocabularyItem) -> Self {
        Self {
            id: item.id,
            position: to_i32(position),
            word: item.word.clone(),
            translation: item.translation.clone(),
            example: item.example.clone(),
            category: item.category.clone(),
            difficulty: item.difficulty.map(|d| d.as_str().to_string()),
            repetition_level: to_i32(item.repetition_level),
            correct_count: to_i32(item.correct_count),
            incorrect_count: to_i32(item.incorrect_count),
            last_reviewed: item.last_reviewed,
            next_review_date: item.next_review_date,
            created_at: item.created_at,
        }
    }

    pub fn to_core(&self) -> VocabularyItem {
        VocabularyItem {
            id: self.id,
            word: self.word.clone(),
            translation: self.translation.clone(),
            example: self.example.clone(),
            category: self.category.clone(),
            difficulty: self.difficulty.as_deref().and_then(Difficulty::parse),
            repetition_level: self.repetition_level.max(0) as u32,
            correct_count: self.correct_count.max(0) as u32,
            incorrect_count: self.incorrect_count.max(0) as u32,
            last_reviewed: self.last_reviewed,
            next_review_date: self.next_review_date,
            created_at: self.created_at,
        }
    }
}

/// One study day in PostgreSQL
#[derive(Debug, Clone, FromRow)]
pub struct DbDailyProgress {
    pub date: NaiveDate,
    pub words_reviewed: i32,
    pub correct: i32,
    pub incorrect: i32,
}

impl DbDailyProgress {
    pub fn to_core(&self) -> DailyProgressStat {
        DailyProgressStat {
            date: self.date,
            words_reviewed: self.words_reviewed.max(0) as u32,
            correct: self.correct.max(0) as u32,
            incorrect: self.incorrect.max(0) as u32,
        }
    }
}

/// Completed test in PostgreSQL. Answers and settings are stored as JSONB.
#[derive(Debug, Clone, FromRow)]
pub struct DbTestResult {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub total_questions: i32,
    pub correct_answers: i32,
    pub wrong_answers: i32,
    pub timed_out: bool,
    pub answers: Json<Vec<TestAnswer>>,
    pub settings: Json<TestSettings>,
}

impl DbTestResult {
    pub fn from_core(result: &TestResult) -> Self {
        Self {
            id: result.id,
            started_at: result.started_at,
            ended_at: result.ended_at,
            total_questions: to_i32(result.total_questions),
            correct_answers: to_i32(result.correct_answers),
            wrong_answers: to_i32(result.wrong_answers),
            timed_out: result.timed_out,
            answers: Json(result.answers.clone()),
            settings: Json(result.settings.clone()),
        }
    }

    pub fn into_core(self) -> TestResult {
        TestResult {
            id: self.id,
            started_at: self.started_at,
            ended_at: self.ended_at,
            total_questions: self.total_questions.max(0) as usize,
            correct_answers: self.correct_answers.max(0) as usize,
            wrong_answers: self.wrong_answers.max(0) as usize,
            answers: self.answers.0,
            timed_out: self.timed_out,
            settings: self.settings.0,
        }
    }
}

fn to_i32<T: TryInto<i32>>(value: T) -> i32 {
    value.try_into().unwrap_or(i32::MAX)
}

// === API Request/Response Types ===

/// Envelope of every mutating response.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data,
            warning: None,
        }
    }
}

impl<T: Serialize> From<Committed<T>> for ApiResponse<T> {
    fn from(committed: Committed<T>) -> Self {
        Self {
            data: committed.value,
            warning: committed.warning.map(|w| w.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub persistence: PersistenceHealth,
}

#[derive(Debug, Clone, Serialize)]
pub struct PersistenceHealth {
    pub backend: &'static str,
    pub failed_writes: u64,
    pub last_error: Option<String>,
    pub last_error_at: Option<DateTime<Utc>>,
}

/// Request body for bulk item edits
#[derive(Debug, Deserialize)]
pub struct BulkEditRequest {
    pub ids: Vec<ItemId>,
    #[serde(flatten)]
    pub edit: BulkEdit,
}

#[derive(Debug, Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Vec<ItemId>,
}

#[derive(Debug, Serialize)]
pub struct BulkResponse {
    pub affected: Vec<ItemId>,
}

#[derive(Debug, Serialize)]
pub struct DueItemsResponse {
    pub count: usize,
    pub items: Vec<VocabularyItem>,
}

/// Review session as seen by the client
#[derive(Debug, Serialize)]
pub struct ReviewView {
    pub state: ReviewState,
    pub current_item: Option<VocabularyItem>,
    pub revealed: bool,
    pub remaining: usize,
    pub stats: Option<SessionStats>,
    pub points: i64,
    pub accuracy_percent: f64,
    pub daily_goal: DailyGoal,
    /// Informational notice, e.g. when nothing is due.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewAnswerRequest {
    pub item_id: ItemId,
    pub was_correct: bool,
}

#[derive(Debug, Serialize)]
pub struct ReviewAnswerResponse {
    pub card: ReviewedCard,
    pub review: ReviewView,
}

/// Test session as seen by the client
#[derive(Debug, Serialize)]
pub struct TestView {
    pub state: TestState,
    pub settings: TestSettings,
    pub current_question: Option<Question>,
    pub answered: usize,
    pub total_questions: usize,
    pub remaining_secs: Option<u64>,
    pub result: Option<TestResult>,
}

#[derive(Debug, Deserialize)]
pub struct TestAnswerRequest {
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct TestAnswerResponse {
    pub feedback: AnswerFeedback,
    pub test: TestView,
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub days: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub format: TransferFormat,
    #[serde(default)]
    pub mode: ImportMode,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}
