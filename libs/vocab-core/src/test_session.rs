//! Assessment-only test session.
//!
//! A test reads items from the store but never changes their learning state:
//! [`TestSession::prepare`] only takes a shared borrow of the store and keeps
//! the prompt and expected answer of each question.

use crate::error::{Error, Result};
use crate::matching::check_answer;
use crate::store::ItemStore;
use crate::types::{
    ItemId, QuestionDirection, TestAnswer, TestDirection, TestResult, TestSettings, UserAnswer,
};
use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a test session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestState {
    #[default]
    Configuring,
    Active,
    Complete,
}

/// A prepared question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub item_id: ItemId,
    pub direction: QuestionDirection,
    pub prompt: String,
    pub expected: String,
}

/// Grading of one answered or skipped question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerFeedback {
    pub answer: TestAnswer,
    /// Input as it was compared, trimmed and lowercased. `None` for a skip.
    pub normalized_input: Option<String>,
    /// Set when this answer finished the test.
    pub completed: bool,
}

/// Outcome of a timer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TestTick {
    /// No active timed test.
    Idle,
    Running { remaining_secs: u64 },
    /// The time limit ran out on this tick and the test was completed.
    Expired,
}

/// Drives a single test.
#[derive(Debug, Clone, Default)]
pub struct TestSession {
    state: TestState,
    settings: TestSettings,
    questions: Vec<Question>,
    answers: Vec<TestAnswer>,
    started_at: Option<DateTime<Utc>>,
    result: Option<TestResult>,
}

impl TestSession {
    pub fn new(settings: TestSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    pub fn state(&self) -> TestState {
        self.state
    }

    pub fn settings(&self) -> &TestSettings {
        &self.settings
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &[TestAnswer] {
        &self.answers
    }

    /// Result of the completed test.
    pub fn result(&self) -> Option<&TestResult> {
        self.result.as_ref()
    }

    /// Replace the settings. Not allowed while a test is running.
    pub fn configure(&mut self, settings: TestSettings) -> Result<()> {
        if self.state == TestState::Active {
            return Err(Error::Config("test settings cannot change during a test".into()));
        }
        self.settings = settings;
        Ok(())
    }

    /// Pick the questions and start the test.
    ///
    /// Fails with [`Error::EmptyTestSet`] when the filters match nothing, leaving
    /// the session in `Configuring`.
    pub fn prepare<R: Rng + ?Sized>(
        &mut self,
        store: &ItemStore,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        if self.state == TestState::Active {
            return Err(Error::Config("a test is already running".into()));
        }
        self.state = TestState::Configuring;
        self.result = None;

        let mut picked: Vec<&_> = store
            .items()
            .iter()
            .filter(|item| self.settings.matches(item))
            .collect();
        if picked.is_empty() {
            tracing::debug!(settings = ?self.settings, "test filters matched nothing");
            return Err(Error::EmptyTestSet);
        }
        if self.settings.shuffle {
            picked.shuffle(rng);
        }
        if self.settings.max_questions > 0 {
            picked.truncate(self.settings.max_questions);
        }

        let fixed = self.settings.direction;
        self.questions = picked
            .into_iter()
            .map(|item| {
                let direction = match fixed {
                    TestDirection::ToForeign => QuestionDirection::ToForeign,
                    TestDirection::ToNative => QuestionDirection::ToNative,
                    TestDirection::Mixed => {
                        if rng.gen_bool(0.5) {
                            QuestionDirection::ToForeign
                        } else {
                            QuestionDirection::ToNative
                        }
                    }
                };
                let (prompt, expected) = match direction {
                    QuestionDirection::ToForeign => (&item.translation, &item.word),
                    QuestionDirection::ToNative => (&item.word, &item.translation),
                };
                Question {
                    item_id: item.id,
                    direction,
                    prompt: prompt.clone(),
                    expected: expected.clone(),
                }
            })
            .collect();
        self.answers = Vec::with_capacity(self.questions.len());
        self.started_at = Some(now);
        self.state = TestState::Active;
        tracing::debug!(questions = self.questions.len(), "test started");
        Ok(self.questions.len())
    }

    pub fn current_question(&self) -> Option<&Question> {
        match self.state {
            TestState::Active => self.questions.get(self.answers.len()),
            _ => None,
        }
    }

    /// Moment the time limit runs out, if there is one.
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        let limit = self.settings.time_limit_secs;
        match (self.state, self.started_at) {
            (TestState::Active, Some(started)) if limit > 0 => {
                Some(started + Duration::seconds(i64::from(limit)))
            }
            _ => None,
        }
    }

    /// Whole seconds left, rounded up.
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> Option<u64> {
        self.deadline().map(|deadline| {
            let ms = (deadline - now).num_milliseconds().max(0) as u64;
            ms.div_ceil(1000)
        })
    }

    /// Grade a typed answer for the current question.
    pub fn answer(&mut self, input: &str, now: DateTime<Utc>) -> Result<AnswerFeedback> {
        let question = self.expect_current(now)?;
        let check = check_answer(input, &question.expected);
        let answer = TestAnswer {
            item_id: question.item_id,
            direction: question.direction,
            prompt: question.prompt.clone(),
            expected: question.expected.clone(),
            user_answer: UserAnswer::Answered(input.trim().to_string()),
            was_correct: check.is_correct,
        };
        Ok(self.record(answer, Some(check.typed_normalized), now))
    }

    /// Record the current question as wrong without an answer.
    pub fn skip(&mut self, now: DateTime<Utc>) -> Result<AnswerFeedback> {
        let question = self.expect_current(now)?;
        let answer = skipped(&question);
        Ok(self.record(answer, None, now))
    }

    /// Advance the countdown. Expiry completes the test as if every remaining
    /// question were skipped. Ticks after completion do nothing.
    pub fn tick(&mut self, now: DateTime<Utc>) -> TestTick {
        let Some(deadline) = self.deadline() else {
            return TestTick::Idle;
        };
        if now >= deadline {
            self.expire(deadline);
            TestTick::Expired
        } else {
            TestTick::Running {
                remaining_secs: self.remaining_secs(now).unwrap_or(0),
            }
        }
    }

    /// Abandon the running test. Nothing is recorded.
    pub fn cancel(&mut self) {
        if self.state == TestState::Active {
            tracing::debug!(answered = self.answers.len(), "test cancelled");
        }
        self.state = TestState::Configuring;
        self.questions.clear();
        self.answers.clear();
        self.started_at = None;
        self.result = None;
    }

    fn expect_current(&mut self, now: DateTime<Utc>) -> Result<Question> {
        if let Some(deadline) = self.deadline() {
            if now >= deadline {
                self.expire(deadline);
            }
        }
        self.current_question().cloned().ok_or(Error::SessionNotActive)
    }

    fn record(
        &mut self,
        answer: TestAnswer,
        normalized_input: Option<String>,
        now: DateTime<Utc>,
    ) -> AnswerFeedback {
        self.answers.push(answer.clone());
        let completed = self.answers.len() == self.questions.len();
        if completed {
            self.complete(now, false);
        }
        AnswerFeedback {
            answer,
            normalized_input,
            completed,
        }
    }

    fn expire(&mut self, deadline: DateTime<Utc>) {
        let rest: Vec<TestAnswer> = self.questions[self.answers.len()..]
            .iter()
            .map(skipped)
            .collect();
        self.answers.extend(rest);
        self.complete(deadline, true);
    }

    fn complete(&mut self, ended_at: DateTime<Utc>, timed_out: bool) {
        let correct_answers = self.answers.iter().filter(|a| a.was_correct).count();
        let result = TestResult {
            id: Uuid::new_v4(),
            started_at: self.started_at.unwrap_or(ended_at),
            ended_at,
            total_questions: self.questions.len(),
            correct_answers,
            wrong_answers: self.answers.len() - correct_answers,
            answers: self.answers.clone(),
            timed_out,
            settings: self.settings.clone(),
        };
        tracing::debug!(score = result.score(), timed_out, "test complete");
        self.result = Some(result);
        self.state = TestState::Complete;
    }
}

fn skipped(question: &Question) -> TestAnswer {
    TestAnswer {
        item_id: question.item_id,
        direction: question.direction,
        prompt: question.prompt.clone(),
        expected: question.expected.clone(),
        user_answer: UserAnswer::Skipped,
        was_correct: false,
    }
}
