//! Core types for the vocabulary scheduler.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Stable identifier of a vocabulary item.
pub type ItemId = Uuid;

/// Category assigned to imported records that do not name one.
pub const DEFAULT_CATEGORY: &str = "Obecné";

/// Difficulty tag of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    /// Parse from string, ignoring case and surrounding whitespace.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }
}

/// A single learnable fact: a foreign word and its native translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyItem {
    pub id: ItemId,
    pub word: String,
    pub translation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    pub repetition_level: u32,
    pub correct_count: u32,
    pub incorrect_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reviewed: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_review_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl VocabularyItem {
    /// Create a never-reviewed item.
    pub fn new(word: impl Into<String>, translation: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            word: word.into(),
            translation: translation.into(),
            example: None,
            category: None,
            difficulty: None,
            repetition_level: 0,
            correct_count: 0,
            incorrect_count: 0,
            last_reviewed: None,
            next_review_date: None,
            created_at: now,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }

    /// Never-scheduled items are always due.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.next_review_date {
            None => true,
            Some(due) => due <= now,
        }
    }

    /// Level 0 and never reviewed.
    pub fn is_new(&self) -> bool {
        self.repetition_level == 0 && self.last_reviewed.is_none()
    }

    pub fn total_answers(&self) -> u32 {
        self.correct_count + self.incorrect_count
    }

    /// Apply content fields from a draft, leaving learning state untouched.
    pub fn apply_draft(&mut self, draft: &ItemDraft) {
        self.word = draft.word.trim().to_string();
        self.translation = draft.translation.trim().to_string();
        self.example = draft.example.clone();
        self.category = draft.category.clone();
        self.difficulty = draft.difficulty;
    }

    /// Clear all learning state, making the item new again.
    pub fn reset_progress(&mut self) {
        self.repetition_level = 0;
        self.correct_count = 0;
        self.incorrect_count = 0;
        self.last_reviewed = None;
        self.next_review_date = None;
    }
}

/// Content fields used to add or edit an item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub word: String,
    pub translation: String,
    #[serde(default)]
    pub example: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
}

impl ItemDraft {
    pub fn new(word: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            translation: translation.into(),
            ..Default::default()
        }
    }

    /// Returns a description of the first problem, if any.
    pub fn validate(&self) -> Option<String> {
        if self.word.trim().is_empty() {
            Some("word must not be empty".to_string())
        } else if self.translation.trim().is_empty() {
            Some("translation must not be empty".to_string())
        } else {
            None
        }
    }
}

/// Changes applied to several items at once. `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkEdit {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub reset_progress: bool,
}

/// Review activity of one study day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyProgressStat {
    pub date: NaiveDate,
    pub words_reviewed: u32,
    pub correct: u32,
    pub incorrect: u32,
}

impl DailyProgressStat {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            words_reviewed: 0,
            correct: 0,
            incorrect: 0,
        }
    }
}

/// Statistics of a single interactive review session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub started_at: DateTime<Utc>,
    pub correct: u32,
    pub incorrect: u32,
    pub reviewed_words: Vec<ItemId>,
    /// Longest run of consecutive correct answers.
    pub streak: u32,
}

impl SessionStats {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            correct: 0,
            incorrect: 0,
            reviewed_words: Vec::new(),
            streak: 0,
        }
    }

    /// `correct*10 - incorrect*3 + streak*5`.
    pub fn points(&self) -> i64 {
        i64::from(self.correct) * 10 - i64::from(self.incorrect) * 3 + i64::from(self.streak) * 5
    }

    /// Share of correct answers in percent, 0 when nothing was answered.
    pub fn accuracy_percent(&self) -> f64 {
        let total = self.correct + self.incorrect;
        if total == 0 {
            0.0
        } else {
            f64::from(self.correct) / f64::from(total) * 100.0
        }
    }
}

/// Which side of an item a test asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestDirection {
    /// Show the translation, expect the word.
    ToForeign,
    /// Show the word, expect the translation.
    ToNative,
    /// Pick one of the above per question.
    #[default]
    Mixed,
}

/// Direction resolved for a single question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionDirection {
    ToForeign,
    ToNative,
}

/// Test configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSettings {
    /// 0 means every filtered item.
    pub max_questions: usize,
    pub direction: TestDirection,
    pub shuffle: bool,
    /// Empty means every category.
    #[serde(default)]
    pub categories: BTreeSet<String>,
    /// Empty means every difficulty.
    #[serde(default)]
    pub difficulties: BTreeSet<Difficulty>,
    /// 0 means no time limit.
    pub time_limit_secs: u32,
}

impl Default for TestSettings {
    fn default() -> Self {
        Self {
            max_questions: 10,
            direction: TestDirection::default(),
            shuffle: true,
            categories: BTreeSet::new(),
            difficulties: BTreeSet::new(),
            time_limit_secs: 0,
        }
    }
}

impl TestSettings {
    /// Whether an item passes the category and difficulty filters.
    pub fn matches(&self, item: &VocabularyItem) -> bool {
        let category_ok = self.categories.is_empty()
            || item
                .category
                .as_ref()
                .is_some_and(|c| self.categories.contains(c));
        let difficulty_ok = self.difficulties.is_empty()
            || item
                .difficulty
                .is_some_and(|d| self.difficulties.contains(&d));
        category_ok && difficulty_ok
    }
}

/// What the user gave for a test question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum UserAnswer {
    Answered(String),
    Skipped,
}

/// One graded test question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestAnswer {
    pub item_id: ItemId,
    pub direction: QuestionDirection,
    pub prompt: String,
    pub expected: String,
    pub user_answer: UserAnswer,
    pub was_correct: bool,
}

/// Immutable record of a completed test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub total_questions: usize,
    pub correct_answers: usize,
    pub wrong_answers: usize,
    pub answers: Vec<TestAnswer>,
    pub timed_out: bool,
    pub settings: TestSettings,
}

impl TestResult {
    /// `round(correct / total * 100)`.
    pub fn score(&self) -> u32 {
        if self.total_questions == 0 {
            return 0;
        }
        (self.correct_answers as f64 / self.total_questions as f64 * 100.0).round() as u32
    }
}

/// User-level settings persisted outside the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    pub daily_goal: u32,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self { daily_goal: 20 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn new_item_is_due_and_new() {
        let item = VocabularyItem::new("dog", "pes", now());
        assert!(item.is_due(now()));
        assert!(item.is_new());
    }

    #[test]
    fn scheduled_item_is_not_due_before_date() {
        let t = now();
        let mut item = VocabularyItem::new("dog", "pes", t);
        item.next_review_date = Some(t + chrono::Duration::days(1));
        assert!(!item.is_due(t));
        assert!(item.is_due(t + chrono::Duration::days(1)));
    }

    #[test]
    fn points_follow_formula() {
        let mut stats = SessionStats::new(now());
        stats.correct = 10;
        stats.incorrect = 2;
        assert_eq!(stats.points(), 94);
        stats.streak = 4;
        assert_eq!(stats.points(), 114);
        assert_eq!(stats.accuracy_percent().round(), 83.0);
    }

    #[test]
    fn score_rounds_percentage() {
        let result = TestResult {
            id: Uuid::new_v4(),
            started_at: now(),
            ended_at: now(),
            total_questions: 3,
            correct_answers: 2,
            wrong_answers: 1,
            answers: vec![],
            timed_out: false,
            settings: TestSettings::default(),
        };
        assert_eq!(result.score(), 67);
    }

    #[test]
    fn settings_filter_by_category_and_difficulty() {
        let item = VocabularyItem::new("dog", "pes", now())
            .with_category("animals")
            .with_difficulty(Difficulty::Easy);
        let mut settings = TestSettings::default();
        assert!(settings.matches(&item));

        settings.categories.insert("food".to_string());
        assert!(!settings.matches(&item));

        settings.categories.insert("animals".to_string());
        settings.difficulties.insert(Difficulty::Hard);
        assert!(!settings.matches(&item));

        settings.difficulties.insert(Difficulty::Easy);
        assert!(settings.matches(&item));
    }

    #[test]
    fn uncategorized_item_fails_category_filter() {
        let item = VocabularyItem::new("dog", "pes", now());
        let mut settings = TestSettings::default();
        settings.categories.insert("animals".to_string());
        assert!(!settings.matches(&item));
    }

    #[test]
    fn difficulty_parse_ignores_case() {
        assert_eq!(Difficulty::parse(" Hard "), Some(Difficulty::Hard));
        assert_eq!(Difficulty::parse("impossible"), None);
    }

    #[test]
    fn draft_validation_rejects_blank_fields() {
        assert!(ItemDraft::new("  ", "pes").validate().is_some());
        assert!(ItemDraft::new("dog", "").validate().is_some());
        assert!(ItemDraft::new("dog", "pes").validate().is_none());
    }
}
