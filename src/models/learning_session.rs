// src/models/learning_session.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'learning_sessions' table in the database.
/// One attempt-cycle by one user on one subject.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct LearningSession {
    pub id: i64,
    pub user_id: i64,
    pub subject_id: i64,
    pub start_time: DateTime<Utc>,

    /// Set exactly when `is_completed` is true.
    pub end_time: Option<DateTime<Utc>>,

    pub attempts: i32,

    /// Seconds since `start_time` at the latest submission.
    pub time_spent: i32,

    /// 0..=100, never decreases within a session.
    pub confusion_score: i32,

    pub is_completed: bool,

    /// Sticky once the help threshold has been crossed.
    pub ai_help_shown: bool,
}

impl LearningSession {
    /// Applies a persisted update to the in-memory copy.
    pub fn apply(&mut self, update: &SessionUpdate) {
        self.attempts = update.attempts;
        self.time_spent = update.time_spent;
        self.confusion_score = update.confusion_score;
        self.is_completed = update.is_completed;
        self.ai_help_shown = update.ai_help_shown;
        self.end_time = update.end_time;
    }
}

/// Insert payload for the `learning_sessions` table.
#[derive(Debug, Clone)]
pub struct NewLearningSession {
    pub user_id: i64,
    pub subject_id: i64,
    pub start_time: DateTime<Utc>,
}

/// Column set written after each answer submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUpdate {
    pub attempts: i32,
    pub time_spent: i32,
    pub confusion_score: i32,
    pub is_completed: bool,
    pub ai_help_shown: bool,
    pub end_time: Option<DateTime<Utc>>,
}

/// DTO for starting a session.
#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    pub subject_id: i64,
}

/// Help content revealed to a confused learner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HelpContent {
    pub help_text: String,
    pub video_url: Option<String>,
}

/// DTO for a single session, with help attached once it has been shown.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    #[serde(flatten)]
    pub session: LearningSession,
    pub help: Option<HelpContent>,
}
