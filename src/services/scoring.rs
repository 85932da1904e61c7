// src/services/scoring.rs

use crate::config::{ATTEMPT_WEIGHT, HELP_THRESHOLD, MAX_CONFUSION_SCORE, TIME_CAP_SECONDS};

/// Confusion after `attempts` submissions, `elapsed_seconds` into the session.
///
/// `min(100, attempts * 20 + min(elapsed, 60))`. Negative inputs count as zero.
pub fn confusion_score(attempts: i64, elapsed_seconds: i64) -> i64 {
    let from_attempts = attempts.max(0).saturating_mul(ATTEMPT_WEIGHT);
    let from_time = elapsed_seconds.clamp(0, TIME_CAP_SECONDS);
    from_attempts
        .saturating_add(from_time)
        .min(MAX_CONFUSION_SCORE)
}

/// Case-insensitive containment of the expected answer in the submission.
pub fn is_correct_answer(raw_answer: &str, correct_answer: &str) -> bool {
    let expected = correct_answer.trim().to_lowercase();
    if expected.is_empty() {
        return false;
    }
    raw_answer.trim().to_lowercase().contains(&expected)
}

pub fn help_triggered(confusion_score: i64) -> bool {
    confusion_score >= HELP_THRESHOLD
}
