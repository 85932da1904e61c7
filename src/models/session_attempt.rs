// src/models/session_attempt.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::learning_session::HelpContent;

/// Represents the 'session_attempts' table in the database.
/// Immutable record of one answer submission.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct SessionAttempt {
    pub id: i64,
    pub session_id: i64,

    /// 1-based, increments by one per submission within a session.
    pub attempt_number: i32,

    /// Raw text as typed by the learner.
    pub user_answer: String,

    pub is_correct: bool,

    /// Seconds elapsed since the session started.
    pub time_from_start: i32,

    /// Client-generated token used to deduplicate retried submissions.
    pub attempt_token: Option<String>,

    pub created_at: Option<DateTime<Utc>>,
}

/// Insert payload for the `session_attempts` table.
#[derive(Debug, Clone)]
pub struct NewSessionAttempt {
    pub session_id: i64,
    pub attempt_number: i32,
    pub user_answer: String,
    pub is_correct: bool,
    pub time_from_start: i32,
    pub attempt_token: Option<String>,
}

/// DTO for submitting an answer.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAnswerRequest {
    #[validate(length(min = 1, max = 2000))]
    pub answer: String,

    /// Client timer value. Derived from the server clock when absent.
    #[validate(range(min = 0))]
    pub elapsed_seconds: Option<i64>,

    #[validate(length(min = 1, max = 64))]
    pub attempt_token: Option<String>,
}

/// Outcome of one answer submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionResult {
    pub is_correct: bool,
    pub confusion_score: i32,
    pub help_triggered: bool,
    pub attempts: i32,
    pub is_completed: bool,

    /// True when the submission was a retry of an already recorded attempt.
    pub replayed: bool,

    pub help: Option<HelpContent>,
}
