//! Answer matching for test questions.

use serde::{Deserialize, Serialize};

/// Result of comparing a typed answer to the expected answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerCheck {
    /// Whether the answer is considered correct.
    pub is_correct: bool,
    /// Normalized typed answer (for display).
    pub typed_normalized: String,
    /// Expected answer as stored.
    pub expected: String,
}

/// Compare a typed answer to the expected one: surrounding whitespace is
/// ignored and so is letter case. Nothing else is forgiven.
pub fn check_answer(typed: &str, expected: &str) -> AnswerCheck {
    let typed_normalized = normalize(typed);
    AnswerCheck {
        is_correct: typed_normalized == normalize(expected),
        typed_normalized,
        expected: expected.to_string(),
    }
}

/// Trim and lowercase.
pub fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(check_answer("pes", "pes").is_correct);
        assert!(!check_answer("pse", "pes").is_correct);
    }

    #[test]
    fn test_case_insensitive() {
        assert!(check_answer("Hello", "hello").is_correct);
        assert!(check_answer("ŽLUŤOUČKÝ", "žluťoučký").is_correct);
    }

    #[test]
    fn test_whitespace_trimmed() {
        let result = check_answer("  ice cream \n", "ice cream");
        assert!(result.is_correct);
        assert_eq!(result.typed_normalized, "ice cream");
    }

    #[test]
    fn test_inner_whitespace_matters() {
        assert!(!check_answer("ice  cream", "ice cream").is_correct);
    }

    #[test]
    fn test_empty_answer_is_wrong() {
        assert!(!check_answer("   ", "pes").is_correct);
    }
}
