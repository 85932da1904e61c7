// src/store/postgres.rs

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, postgres::PgArguments};

use super::{DataStore, StoreError};
use crate::models::{
    learning_session::{LearningSession, NewLearningSession, SessionUpdate},
    session_attempt::{NewSessionAttempt, SessionAttempt},
    subject::{NewSubject, Subject},
};

const SUBJECT_COLUMNS: &str = "id, name, slug, title, question, data, correct_answer, help_text, video_search, created_at";

const SESSION_COLUMNS: &str = "id, user_id, subject_id, start_time, end_time, attempts, time_spent, confusion_score, is_completed, ai_help_shown";

const ATTEMPT_COLUMNS: &str = "id, session_id, attempt_number, user_answer, is_correct, time_from_start, attempt_token, created_at";

const UPDATE_SESSION_SQL: &str = r#"
    UPDATE learning_sessions
    SET attempts = $1,
        time_spent = $2,
        confusion_score = $3,
        is_completed = $4,
        ai_help_shown = $5,
        end_time = $6
    WHERE id = $7
"#;

const INSERT_ATTEMPT_SQL: &str = r#"
    INSERT INTO session_attempts
        (session_id, attempt_number, user_answer, is_correct, time_from_start, attempt_token)
    VALUES ($1, $2, $3, $4, $5, $6)
    RETURNING id, session_id, attempt_number, user_answer, is_correct, time_from_start, attempt_token, created_at
"#;

/// Postgres-backed data store.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl DataStore for PgStore {
    async fn get_subject(&self, id: i64) -> Result<Option<Subject>, StoreError> {
        let subject = sqlx::query_as::<_, Subject>(&format!(
            "SELECT {SUBJECT_COLUMNS} FROM subjects WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(subject)
    }

    async fn get_subject_by_slug(&self, slug: &str) -> Result<Option<Subject>, StoreError> {
        let subject = sqlx::query_as::<_, Subject>(&format!(
            "SELECT {SUBJECT_COLUMNS} FROM subjects WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(subject)
    }

    async fn list_subjects(&self) -> Result<Vec<Subject>, StoreError> {
        let subjects = sqlx::query_as::<_, Subject>(&format!(
            "SELECT {SUBJECT_COLUMNS} FROM subjects ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(subjects)
    }

    async fn create_subject(&self, subject: NewSubject) -> Result<Subject, StoreError> {
        let created = sqlx::query_as::<_, Subject>(&format!(
            r#"
            INSERT INTO subjects (name, slug, title, question, data, correct_answer, help_text, video_search)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {SUBJECT_COLUMNS}
            "#
        ))
        .bind(&subject.name)
        .bind(&subject.slug)
        .bind(&subject.title)
        .bind(&subject.question)
        .bind(&subject.data)
        .bind(&subject.correct_answer)
        .bind(&subject.help_text)
        .bind(&subject.video_search)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match StoreError::from(e) {
            StoreError::Conflict(_) => {
                StoreError::Conflict(format!("slug '{}' already exists", subject.slug))
            }
            other => other,
        })?;

        Ok(created)
    }

    async fn create_session(
        &self,
        session: NewLearningSession,
    ) -> Result<LearningSession, StoreError> {
        let created = sqlx::query_as::<_, LearningSession>(&format!(
            r#"
            INSERT INTO learning_sessions (user_id, subject_id, start_time)
            VALUES ($1, $2, $3)
            RETURNING {SESSION_COLUMNS}
            "#
        ))
        .bind(session.user_id)
        .bind(session.subject_id)
        .bind(session.start_time)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn get_session(&self, id: i64) -> Result<Option<LearningSession>, StoreError> {
        let session = sqlx::query_as::<_, LearningSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM learning_sessions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    async fn list_sessions_for_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<LearningSession>, StoreError> {
        let sessions = sqlx::query_as::<_, LearningSession>(&format!(
            r#"
            SELECT {SESSION_COLUMNS}
            FROM learning_sessions
            WHERE user_id = $1
            ORDER BY start_time DESC, id DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sessions)
    }

    async fn update_session(&self, id: i64, update: &SessionUpdate) -> Result<(), StoreError> {
        let result = update_session_query(id, update).execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn insert_attempt(
        &self,
        attempt: NewSessionAttempt,
    ) -> Result<SessionAttempt, StoreError> {
        let created = insert_attempt_query(&attempt)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    async fn list_attempts(&self, session_id: i64) -> Result<Vec<SessionAttempt>, StoreError> {
        let attempts = sqlx::query_as::<_, SessionAttempt>(&format!(
            "SELECT {ATTEMPT_COLUMNS} FROM session_attempts WHERE session_id = $1 ORDER BY attempt_number"
        ))
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(attempts)
    }

    async fn find_attempt_by_token(
        &self,
        session_id: i64,
        token: &str,
    ) -> Result<Option<SessionAttempt>, StoreError> {
        let attempt = sqlx::query_as::<_, SessionAttempt>(&format!(
            "SELECT {ATTEMPT_COLUMNS} FROM session_attempts WHERE session_id = $1 AND attempt_token = $2"
        ))
        .bind(session_id)
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attempt)
    }

    /// Both writes commit together or not at all.
    async fn record_submission(
        &self,
        attempt: NewSessionAttempt,
        session_id: i64,
        update: &SessionUpdate,
    ) -> Result<SessionAttempt, StoreError> {
        let mut tx = self.pool.begin().await?;

        let recorded = insert_attempt_query(&attempt).fetch_one(&mut *tx).await?;

        let result = update_session_query(session_id, update)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(StoreError::NotFound);
        }

        tx.commit().await?;
        Ok(recorded)
    }
}

fn update_session_query(
    id: i64,
    update: &SessionUpdate,
) -> sqlx::query::Query<'static, Postgres, PgArguments> {
    sqlx::query(UPDATE_SESSION_SQL)
        .bind(update.attempts)
        .bind(update.time_spent)
        .bind(update.confusion_score)
        .bind(update.is_completed)
        .bind(update.ai_help_shown)
        .bind(update.end_time)
        .bind(id)
}

fn insert_attempt_query(
    attempt: &NewSessionAttempt,
) -> sqlx::query::QueryAs<'static, Postgres, SessionAttempt, PgArguments> {
    sqlx::query_as::<_, SessionAttempt>(INSERT_ATTEMPT_SQL)
        .bind(attempt.session_id)
        .bind(attempt.attempt_number)
        .bind(attempt.user_answer.clone())
        .bind(attempt.is_correct)
        .bind(attempt.time_from_start)
        .bind(attempt.attempt_token.clone())
}
