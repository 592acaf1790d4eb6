pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vocab_core::{MemoryPersistence, Persistence, Vocabulary};

use crate::config::Config;
use crate::db::Database;
use crate::error::{ApiError, Result};
use crate::services::persistence::{MemoryBackend, PersistenceStatus, PgPersistence};
use crate::services::timer::TestTimer;

const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// The single vocabulary workspace served by this process.
pub type SharedVocabulary = Arc<Mutex<Vocabulary>>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub vocab: SharedVocabulary,
    pub timer: Arc<TestTimer>,
    pub persistence: PersistenceStatus,
}

impl AppState {
    pub fn new(vocab: Vocabulary, persistence: PersistenceStatus) -> Self {
        Self {
            vocab: Arc::new(Mutex::new(vocab)),
            timer: Arc::new(TestTimer::new()),
            persistence,
        }
    }

    /// Open a workspace over in-memory storage.
    pub fn in_memory(memory: MemoryPersistence, config: &Config) -> anyhow::Result<Self> {
        let status = PersistenceStatus::new("memory");
        let backend = MemoryBackend::new(memory, status.clone());
        let vocab = open_vocabulary(Box::new(backend), config)?;
        Ok(Self::new(vocab, status))
    }

    /// Lock the workspace for one operation.
    pub fn vocab(&self) -> Result<MutexGuard<'_, Vocabulary>> {
        self.vocab
            .lock()
            .map_err(|_| ApiError::Internal("vocabulary lock poisoned".to_string()))
    }
}

fn open_vocabulary(persistence: Box<dyn Persistence>, config: &Config) -> anyhow::Result<Vocabulary> {
    let opened = Vocabulary::open(persistence, config.vocabulary_options()?, Utc::now())?;
    if let Some(warning) = opened.warning {
        tracing::warn!(%warning, "vocabulary opened with a storage warning");
    }
    Ok(opened.value)
}

pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env()?;
    tracing::debug!(?config, "loaded configuration");

    let (state, writer) = match &config.database_url {
        Some(database_url) => {
            tracing::info!("Connecting to database...");
            let db = Database::connect(database_url).await?;

            tracing::info!("Running migrations...");
            db.run_migrations().await?;

            let status = PersistenceStatus::new("postgres");
            let (persistence, writer) = PgPersistence::start(Arc::new(db), status.clone()).await;
            let vocab = open_vocabulary(Box::new(persistence), &config)?;
            (AppState::new(vocab, status), Some(writer))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, progress is kept in memory only");
            (AppState::in_memory(MemoryPersistence::new(), &config)?, None)
        }
    };

    let app = routes::build_router(state.clone());

    let addr = config.addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    finish_writes(state, writer).await;
    Ok(())
}

/// Stop the timer, close the workspace and wait for queued writes to land.
async fn finish_writes(state: AppState, writer: Option<JoinHandle<()>>) {
    state.timer.stop();
    // The vocabulary owns the write queue's sender.
    drop(state);
    let Some(writer) = writer else {
        return;
    };
    tracing::info!("Flushing pending writes...");
    match tokio::time::timeout(WRITER_DRAIN_TIMEOUT, writer).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => tracing::error!(error = %err, "database writer failed"),
        Err(_) => tracing::error!("pending writes not flushed before shutdown timeout"),
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}
