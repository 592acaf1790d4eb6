//! Persistence adapters for the vocabulary workspace.
//!
//! The core saves synchronously while the request handler holds the workspace
//! lock. [`PgPersistence`] turns each save into a command for a single writer
//! task, so the lock is never held across database I/O. Failures on the writer
//! side are logged and recorded in [`PersistenceStatus`] for `/health`.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use vocab_core::{
    DailyProgressStat, MemoryPersistence, PersistedState, Persistence, PersistenceError,
    TestResult, UserSettings, VocabularyItem,
};

use crate::db::Database;
use crate::models::PersistenceHealth;

#[derive(Debug, Default)]
struct StatusInner {
    failed_writes: u64,
    last_error: Option<String>,
    last_error_at: Option<DateTime<Utc>>,
}

/// Shared record of write failures.
#[derive(Debug, Clone)]
pub struct PersistenceStatus {
    backend: &'static str,
    inner: Arc<Mutex<StatusInner>>,
}

impl PersistenceStatus {
    pub fn new(backend: &'static str) -> Self {
        Self {
            backend,
            inner: Arc::default(),
        }
    }

    pub fn record_failure(&self, err: &PersistenceError) {
        let mut inner = self.lock();
        inner.failed_writes += 1;
        inner.last_error = Some(err.to_string());
        inner.last_error_at = Some(Utc::now());
    }

    pub fn health(&self) -> PersistenceHealth {
        let inner = self.lock();
        PersistenceHealth {
            backend: self.backend,
            failed_writes: inner.failed_writes,
            last_error: inner.last_error.clone(),
            last_error_at: inner.last_error_at,
        }
    }

    fn lock(&self) -> MutexGuard<'_, StatusInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// In-memory storage that also reports synchronous failures to the status.
pub struct MemoryBackend {
    memory: MemoryPersistence,
    status: PersistenceStatus,
}

impl MemoryBackend {
    pub fn new(memory: MemoryPersistence, status: PersistenceStatus) -> Self {
        Self { memory, status }
    }

    fn track(&self, result: std::result::Result<(), PersistenceError>) -> std::result::Result<(), PersistenceError> {
        if let Err(err) = &result {
            self.status.record_failure(err);
        }
        result
    }
}

impl Persistence for MemoryBackend {
    fn load(&self) -> std::result::Result<PersistedState, PersistenceError> {
        self.memory.load()
    }

    fn save_items(&self, items: &[VocabularyItem]) -> std::result::Result<(), PersistenceError> {
        self.track(self.memory.save_items(items))
    }

    fn save_daily_stat(&self, stat: &DailyProgressStat) -> std::result::Result<(), PersistenceError> {
        self.track(self.memory.save_daily_stat(stat))
    }

    fn append_test_result(&self, result: &TestResult) -> std::result::Result<(), PersistenceError> {
        self.track(self.memory.append_test_result(result))
    }

    fn save_settings(&self, settings: &UserSettings) -> std::result::Result<(), PersistenceError> {
        self.track(self.memory.save_settings(settings))
    }
}

/// Write queued for the database writer task.
#[derive(Debug)]
pub enum WriteCommand {
    Items(Vec<VocabularyItem>),
    DailyStat(DailyProgressStat),
    TestResult(Box<TestResult>),
    Settings(UserSettings),
}

impl WriteCommand {
    fn operation(&self) -> &'static str {
        match self {
            Self::Items(_) => "save_items",
            Self::DailyStat(_) => "save_daily_stat",
            Self::TestResult(_) => "append_test_result",
            Self::Settings(_) => "save_settings",
        }
    }
}

/// PostgreSQL-backed persistence with a write-behind queue.
pub struct PgPersistence {
    loaded: std::result::Result<PersistedState, PersistenceError>,
    tx: mpsc::UnboundedSender<WriteCommand>,
}

impl PgPersistence {
    /// Load the stored state and start the writer task. A failed load is kept
    /// and handed to the workspace on open; the writer starts regardless.
    ///
    /// The writer finishes once every sender is dropped and the queue is empty.
    pub async fn start(db: Arc<Database>, status: PersistenceStatus) -> (Self, JoinHandle<()>) {
        let loaded = db.load_state().await.map_err(|err| {
            tracing::warn!(error = %err, "failed to load stored vocabulary");
            PersistenceError::new("load", err.to_string())
        });
        let (tx, rx) = mpsc::unbounded_channel();
        let writer = tokio::spawn(run_writer(db, rx, status));
        (Self { loaded, tx }, writer)
    }

    fn enqueue(&self, command: WriteCommand) -> std::result::Result<(), PersistenceError> {
        let operation = command.operation();
        self.tx
            .send(command)
            .map_err(|_| PersistenceError::new(operation, "database writer has stopped"))
    }
}

impl Persistence for PgPersistence {
    fn load(&self) -> std::result::Result<PersistedState, PersistenceError> {
        self.loaded.clone()
    }

    fn save_items(&self, items: &[VocabularyItem]) -> std::result::Result<(), PersistenceError> {
        self.enqueue(WriteCommand::Items(items.to_vec()))
    }

    fn save_daily_stat(&self, stat: &DailyProgressStat) -> std::result::Result<(), PersistenceError> {
        self.enqueue(WriteCommand::DailyStat(stat.clone()))
    }

    fn append_test_result(&self, result: &TestResult) -> std::result::Result<(), PersistenceError> {
        self.enqueue(WriteCommand::TestResult(Box::new(result.clone())))
    }

    fn save_settings(&self, settings: &UserSettings) -> std::result::Result<(), PersistenceError> {
        self.enqueue(WriteCommand::Settings(settings.clone()))
    }
}

/// Apply queued writes in order until every sender is gone.
async fn run_writer(
    db: Arc<Database>,
    mut rx: mpsc::UnboundedReceiver<WriteCommand>,
    status: PersistenceStatus,
) {
    while let Some(mut command) = rx.recv().await {
        // Consecutive item snapshots collapse into the newest one.
        while matches!(command, WriteCommand::Items(_)) {
            match rx.try_recv() {
                Ok(next @ WriteCommand::Items(_)) => command = next,
                Ok(other) => {
                    apply(&db, &status, command).await;
                    command = other;
                }
                Err(_) => break,
            }
        }
        apply(&db, &status, command).await;
    }
    tracing::info!("database writer stopped");
}

async fn apply(db: &Database, status: &PersistenceStatus, command: WriteCommand) {
    let operation = command.operation();
    let result = match &command {
        WriteCommand::Items(items) => db.replace_items(items).await,
        WriteCommand::DailyStat(stat) => db.upsert_daily_progress(stat).await,
        WriteCommand::TestResult(result) => db.insert_test_result(result).await,
        WriteCommand::Settings(settings) => db.upsert_settings(settings).await,
    };
    if let Err(err) = result {
        let err = PersistenceError::new(operation, err.to_string());
        tracing::warn!(operation, error = %err.message, "database write failed");
        status.record_failure(&err);
    }
}
