//! One-second countdown driving the test time limit.

use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use vocab_core::TestTick;

use crate::SharedVocabulary;

/// Owns the countdown task of the running test, if any.
#[derive(Debug, Default)]
pub struct TestTimer {
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl TestTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start ticking for a freshly prepared test, replacing any earlier countdown.
    pub fn start(&self, vocab: SharedVocabulary) {
        let task = tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(1));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let committed = {
                    let mut vocab = match vocab.lock() {
                        Ok(guard) => guard,
                        Err(_) => {
                            tracing::error!("vocabulary lock poisoned, stopping test timer");
                            return;
                        }
                    };
                    vocab.tick_test(Utc::now())
                };
                match committed.value {
                    TestTick::Running { .. } => {}
                    TestTick::Expired => {
                        tracing::info!("test time limit reached");
                        return;
                    }
                    TestTick::Idle => return,
                }
            }
        });
        if let Some(previous) = self.lock().replace(task) {
            previous.abort();
        }
    }

    /// Stop the countdown, e.g. when the test completes or is cancelled.
    pub fn stop(&self) {
        if let Some(task) = self.lock().take() {
            task.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.lock().as_ref().is_some_and(|task| !task.is_finished())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.handle.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for TestTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
