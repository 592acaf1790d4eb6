//! Core vocabulary library: the spaced-repetition scheduler behind the app.
//!
//! Provides:
//! - Item store with change notifications
//! - Repetition engine (interval ladder) and the due queue
//! - Review and test session state machines
//! - Daily goal tracking and derived statistics
//! - JSON/CSV import and export
//!
//! Everything here is synchronous and I/O free. Time is passed in explicitly
//! and storage is reached through the [`Persistence`] trait.

pub mod algorithm;
pub mod dates;
pub mod defaults;
pub mod error;
pub mod matching;
pub mod persistence;
pub mod progress;
pub mod queue;
pub mod review;
pub mod stats;
pub mod store;
pub mod test_session;
pub mod transfer;
pub mod types;
pub mod workspace;

pub use algorithm::{IntervalLadder, RepetitionEngine, ReviewOutcome};
pub use dates::{is_new_day, StudyClock};
pub use error::{Error, ImportError, PersistenceError, Result};
pub use matching::{check_answer, AnswerCheck};
pub use persistence::{MemoryPersistence, PersistedState, Persistence};
pub use progress::{DailyGoal, DailyLog};
pub use queue::{due_items, DueQueue};
pub use review::{ReviewSession, ReviewState, ReviewedCard};
pub use stats::{statistics, MasteryBucket, StatisticsSnapshot, DEFAULT_HISTORY_DAYS, MASTERED_LEVEL};
pub use store::{ItemStore, StoreEvent, SubscriptionId};
pub use test_session::{AnswerFeedback, Question, TestSession, TestState, TestTick};
pub use transfer::{ImportMode, ImportSummary, TransferFormat};
pub use types::{
    BulkEdit, DailyProgressStat, Difficulty, ItemDraft, ItemId, QuestionDirection, SessionStats,
    TestAnswer, TestDirection, TestResult, TestSettings, UserAnswer, UserSettings, VocabularyItem,
    DEFAULT_CATEGORY,
};
pub use workspace::{Committed, Vocabulary, VocabularyOptions};
