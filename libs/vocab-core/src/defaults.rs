//! Built-in starter vocabulary, used when nothing has been stored yet.

use crate::types::{Difficulty, VocabularyItem, DEFAULT_CATEGORY};
use chrono::{DateTime, Utc};

const STARTER_WORDS: &[(&str, &str, &str, Difficulty)] = &[
    ("hello", "ahoj", "Hello, how are you?", Difficulty::Easy),
    ("thank you", "děkuji", "Thank you for your help.", Difficulty::Easy),
    ("water", "voda", "Can I have a glass of water?", Difficulty::Easy),
    ("house", "dům", "Their house is near the river.", Difficulty::Easy),
    ("friend", "přítel", "She is my best friend.", Difficulty::Easy),
    ("book", "kniha", "I am reading a good book.", Difficulty::Easy),
    ("to learn", "učit se", "I want to learn English.", Difficulty::Medium),
    ("weather", "počasí", "The weather is nice today.", Difficulty::Medium),
    ("journey", "cesta", "The journey took three hours.", Difficulty::Medium),
    ("to remember", "pamatovat si", "I can't remember his name.", Difficulty::Medium),
    ("neighbour", "soused", "Our neighbour has a dog.", Difficulty::Medium),
    ("reliable", "spolehlivý", "He is a reliable worker.", Difficulty::Hard),
    ("to achieve", "dosáhnout", "You can achieve anything.", Difficulty::Hard),
    ("opportunity", "příležitost", "This is a great opportunity.", Difficulty::Hard),
    ("thorough", "důkladný", "The doctor was very thorough.", Difficulty::Hard),
];

/// Fresh, never-reviewed copies of the starter words.
pub fn starter_items(now: DateTime<Utc>) -> Vec<VocabularyItem> {
    STARTER_WORDS
        .iter()
        .map(|(word, translation, example, difficulty)| {
            VocabularyItem::new(*word, *translation, now)
                .with_example(*example)
                .with_category(DEFAULT_CATEGORY)
                .with_difficulty(*difficulty)
        })
        .collect()
}
