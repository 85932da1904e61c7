// src/models/subject.rs

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Lowercase words separated by single hyphens, e.g. `pythagoras-theorem`.
pub static SLUG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("slug regex is valid"));

/// Represents the 'subjects' table in the database.
/// A single quiz item together with the help content shown to confused learners.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Subject {
    pub id: i64,

    /// Short display name used in listings.
    pub name: String,

    /// URL-friendly unique key.
    pub slug: String,

    pub title: String,

    /// The question the learner has to answer.
    pub question: String,

    /// Supporting data shown alongside the question.
    pub data: String,

    /// Expected answer. Matched case-insensitively as a substring of the submission.
    #[serde(skip_serializing)]
    pub correct_answer: String,

    /// Explanation revealed once the learner is flagged as confused.
    pub help_text: String,

    /// Search phrase used to build the explanatory video link.
    pub video_search: String,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for sending a subject to the client (excludes answer and help content).
#[derive(Debug, Serialize)]
pub struct PublicSubject {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub title: String,
    pub question: String,
    pub data: String,
}

impl From<Subject> for PublicSubject {
    fn from(s: Subject) -> Self {
        Self {
            id: s.id,
            name: s.name,
            slug: s.slug,
            title: s.title,
            question: s.question,
            data: s.data,
        }
    }
}

/// DTO for creating a new subject.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSubjectRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(
        length(min = 1, max = 100),
        regex(path = *SLUG_REGEX, message = "Slug must be lowercase words separated by hyphens.")
    )]
    pub slug: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 2000))]
    pub question: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub data: String,
    #[validate(custom(function = validate_correct_answer))]
    pub correct_answer: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub help_text: String,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub video_search: String,
}

/// A blank answer would match every submission.
fn validate_correct_answer(answer: &str) -> Result<(), validator::ValidationError> {
    let trimmed = answer.trim();
    if trimmed.is_empty() {
        return Err(validator::ValidationError::new("correct_answer_cannot_be_blank"));
    }
    if trimmed.len() > 500 {
        return Err(validator::ValidationError::new("correct_answer_too_long"));
    }
    Ok(())
}

/// Insert payload for the `subjects` table.
#[derive(Debug, Clone)]
pub struct NewSubject {
    pub name: String,
    pub slug: String,
    pub title: String,
    pub question: String,
    pub data: String,
    pub correct_answer: String,
    pub help_text: String,
    pub video_search: String,
}
