// src/store/mod.rs

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    learning_session::{LearningSession, NewLearningSession, SessionUpdate},
    session_attempt::{NewSessionAttempt, SessionAttempt},
    subject::{NewSubject, Subject},
};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

/// Errors surfaced by data store adapters.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                StoreError::Conflict(db.message().to_string())
            }
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

/// Shared handle used by the application state.
pub type SharedStore = Arc<dyn DataStore>;

/// Key-based record storage for subjects, sessions and attempts.
///
/// Access control is assumed to be settled before a call reaches the store.
#[async_trait]
pub trait DataStore: Send + Sync {
    async fn get_subject(&self, id: i64) -> Result<Option<Subject>, StoreError>;

    async fn get_subject_by_slug(&self, slug: &str) -> Result<Option<Subject>, StoreError>;

    async fn list_subjects(&self) -> Result<Vec<Subject>, StoreError>;

    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the slug is already taken.
    async fn create_subject(&self, subject: NewSubject) -> Result<Subject, StoreError>;

    async fn create_session(
        &self,
        session: NewLearningSession,
    ) -> Result<LearningSession, StoreError>;

    async fn get_session(&self, id: i64) -> Result<Option<LearningSession>, StoreError>;

    /// Sessions owned by `user_id`, newest first.
    async fn list_sessions_for_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<LearningSession>, StoreError>;

    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no session has this id.
    async fn update_session(&self, id: i64, update: &SessionUpdate) -> Result<(), StoreError>;

    async fn insert_attempt(
        &self,
        attempt: NewSessionAttempt,
    ) -> Result<SessionAttempt, StoreError>;

    /// Attempts of a session ordered by attempt number.
    async fn list_attempts(&self, session_id: i64) -> Result<Vec<SessionAttempt>, StoreError>;

    async fn find_attempt_by_token(
        &self,
        session_id: i64,
        token: &str,
    ) -> Result<Option<SessionAttempt>, StoreError>;

    /// Persists one answer submission: the attempt insert, then the session update.
    ///
    /// The default implementation issues the two writes independently, so a failure of the
    /// second leaves the first in place. Stores with transactions should override it.
    async fn record_submission(
        &self,
        attempt: NewSessionAttempt,
        session_id: i64,
        update: &SessionUpdate,
    ) -> Result<SessionAttempt, StoreError> {
        let recorded = self.insert_attempt(attempt).await?;
        self.update_session(session_id, update).await?;
        Ok(recorded)
    }
}
