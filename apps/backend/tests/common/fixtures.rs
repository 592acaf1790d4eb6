//! Test fixtures and factory functions for creating test data.

use chrono::Utc;
use serde_json::json;

use vocab_core::{Difficulty, VocabularyItem};

/// A never-reviewed item, due immediately.
pub fn item(word: &str, translation: &str) -> VocabularyItem {
    VocabularyItem::new(word, translation, Utc::now())
}

/// A small categorised set: two animals and one food word.
pub fn sample_items() -> Vec<VocabularyItem> {
    vec![
        item("dog", "pes")
            .with_category("animals")
            .with_difficulty(Difficulty::Easy),
        item("cat", "kočka")
            .with_category("animals")
            .with_difficulty(Difficulty::Easy),
        item("bread", "chléb")
            .with_category("food")
            .with_difficulty(Difficulty::Medium),
    ]
}

/// Request body for item create/update.
pub fn draft(word: &str, translation: &str) -> serde_json::Value {
    json!({ "word": word, "translation": translation })
}

/// Test settings that ask every question in store order.
pub fn test_settings(direction: &str, time_limit_secs: u32) -> serde_json::Value {
    json!({
        "max_questions": 0,
        "direction": direction,
        "shuffle": false,
        "categories": [],
        "difficulties": [],
        "time_limit_secs": time_limit_secs,
    })
}

/// Two-row CSV import file.
pub fn csv_file() -> String {
    "word,translation,example,category,difficulty\n\
     house,dům,,home,easy\n\
     \"table, big\",stůl,A big table.,home,hard\n"
        .to_string()
}
