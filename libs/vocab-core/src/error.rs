//! Error types for vocab-core.

use crate::types::ItemId;
use thiserror::Error;

/// Result type alias using the core [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the scheduler, the sessions and the item store.
#[derive(Debug, Error)]
pub enum Error {
    #[error("nothing is due for review right now")]
    EmptyDueQueue,

    #[error("no items match the test filters")]
    EmptyTestSet,

    #[error("answer submitted for {submitted}, but the current item is {current:?}")]
    InvalidAnswerTarget {
        submitted: ItemId,
        current: Option<ItemId>,
    },

    #[error("session is not active")]
    SessionNotActive,

    #[error("item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("invalid item: {0}")]
    InvalidItem(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("export failed: {0}")]
    Export(String),
}

impl Error {
    /// Informational outcomes are reported to the user but are not failures.
    pub fn is_informational(&self) -> bool {
        matches!(self, Self::EmptyDueQueue)
    }
}

/// Errors that abort an import batch. Record numbers are 1-based.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("record {record}: missing required field `{field}`")]
    MissingField { record: usize, field: &'static str },

    #[error("record {record}: invalid value for `{field}`: {value}")]
    InvalidValue {
        record: usize,
        field: &'static str,
        value: String,
    },

    #[error("duplicate ID {id} at record {record}")]
    DuplicateId { id: ItemId, record: usize },

    #[error("line {line}: {message}")]
    MalformedCsv { line: usize, message: String },

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("empty file")]
    EmptyFile,
}

/// Failure reported by a [`crate::persistence::Persistence`] implementation.
#[derive(Debug, Clone, Error)]
#[error("persistence failure during {operation}: {message}")]
pub struct PersistenceError {
    pub operation: &'static str,
    pub message: String,
}

impl PersistenceError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}
