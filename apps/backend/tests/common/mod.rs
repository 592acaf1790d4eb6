//! Common test utilities for integration tests.
//!
//! Every context runs against in-memory storage, so no database is needed.
//! The [`MemoryPersistence`] handle shares state with the running app and can
//! be inspected after a request.

pub mod fixtures;

use axum::Router;
use axum_test::TestServer;

use vocab_backend::config::Config;
use vocab_backend::routes;
use vocab_backend::AppState;
use vocab_core::{MemoryPersistence, PersistedState, VocabularyItem};

/// Test context wrapping an app over in-memory storage.
pub struct TestContext {
    pub memory: MemoryPersistence,
    pub state: AppState,
    app: Router,
}

impl TestContext {
    /// Context with an empty item list.
    pub fn new() -> Self {
        Self::with_items(Vec::new())
    }

    /// Context whose store starts with the given items.
    pub fn with_items(items: Vec<VocabularyItem>) -> Self {
        Self::from_state(PersistedState {
            items: Some(items),
            ..Default::default()
        })
    }

    /// Context that has never saved items, so the starter set is loaded.
    pub fn first_run() -> Self {
        Self::from_state(PersistedState::default())
    }

    pub fn from_state(stored: PersistedState) -> Self {
        let memory = MemoryPersistence::with_state(stored);
        let state = AppState::in_memory(memory.clone(), &Config::default())
            .expect("Failed to open in-memory vocabulary");
        let app = routes::build_router(state.clone());
        Self { memory, state, app }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    pub fn server(&self) -> TestServer {
        TestServer::new(self.router()).expect("Failed to start test server")
    }
}
