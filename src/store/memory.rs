// src/store/memory.rs

use std::{
    collections::BTreeMap,
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;
use chrono::Utc;

use super::{DataStore, StoreError};
use crate::models::{
    learning_session::{LearningSession, NewLearningSession, SessionUpdate},
    session_attempt::{NewSessionAttempt, SessionAttempt},
    subject::{NewSubject, Subject},
};

#[derive(Debug, Default)]
struct Tables {
    subjects: BTreeMap<i64, Subject>,
    sessions: BTreeMap<i64, LearningSession>,
    attempts: BTreeMap<i64, SessionAttempt>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Process-local store used by tests and local development.
///
/// Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
    fail_attempt_inserts: Arc<AtomicBool>,
    fail_session_updates: Arc<AtomicBool>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent attempt insert fail with `StoreError::Unavailable`.
    pub fn fail_attempt_inserts(&self, fail: bool) {
        self.fail_attempt_inserts.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent session update fail with `StoreError::Unavailable`.
    pub fn fail_session_updates(&self, fail: bool) {
        self.fail_session_updates.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl DataStore for InMemoryStore {
    async fn get_subject(&self, id: i64) -> Result<Option<Subject>, StoreError> {
        Ok(self.lock()?.subjects.get(&id).cloned())
    }

    async fn get_subject_by_slug(&self, slug: &str) -> Result<Option<Subject>, StoreError> {
        let guard = self.lock()?;
        Ok(guard.subjects.values().find(|s| s.slug == slug).cloned())
    }

    async fn list_subjects(&self) -> Result<Vec<Subject>, StoreError> {
        Ok(self.lock()?.subjects.values().cloned().collect())
    }

    async fn create_subject(&self, subject: NewSubject) -> Result<Subject, StoreError> {
        let mut guard = self.lock()?;
        if guard.subjects.values().any(|s| s.slug == subject.slug) {
            return Err(StoreError::Conflict(format!(
                "slug '{}' already exists",
                subject.slug
            )));
        }
        let id = guard.next_id();
        let created = Subject {
            id,
            name: subject.name,
            slug: subject.slug,
            title: subject.title,
            question: subject.question,
            data: subject.data,
            correct_answer: subject.correct_answer,
            help_text: subject.help_text,
            video_search: subject.video_search,
            created_at: Some(Utc::now()),
        };
        guard.subjects.insert(id, created.clone());
        Ok(created)
    }

    async fn create_session(
        &self,
        session: NewLearningSession,
    ) -> Result<LearningSession, StoreError> {
        let mut guard = self.lock()?;
        let id = guard.next_id();
        let created = LearningSession {
            id,
            user_id: session.user_id,
            subject_id: session.subject_id,
            start_time: session.start_time,
            end_time: None,
            attempts: 0,
            time_spent: 0,
            confusion_score: 0,
            is_completed: false,
            ai_help_shown: false,
        };
        guard.sessions.insert(id, created.clone());
        Ok(created)
    }

    async fn get_session(&self, id: i64) -> Result<Option<LearningSession>, StoreError> {
        Ok(self.lock()?.sessions.get(&id).cloned())
    }

    async fn list_sessions_for_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<LearningSession>, StoreError> {
        let guard = self.lock()?;
        let mut sessions: Vec<LearningSession> = guard
            .sessions
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.start_time.cmp(&a.start_time).then(b.id.cmp(&a.id)));
        Ok(sessions)
    }

    async fn update_session(&self, id: i64, update: &SessionUpdate) -> Result<(), StoreError> {
        if self.fail_session_updates.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "session update rejected".to_string(),
            ));
        }
        let mut guard = self.lock()?;
        let session = guard.sessions.get_mut(&id).ok_or(StoreError::NotFound)?;
        session.apply(update);
        Ok(())
    }

    async fn insert_attempt(
        &self,
        attempt: NewSessionAttempt,
    ) -> Result<SessionAttempt, StoreError> {
        if self.fail_attempt_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "attempt insert rejected".to_string(),
            ));
        }
        let mut guard = self.lock()?;
        if !guard.sessions.contains_key(&attempt.session_id) {
            return Err(StoreError::NotFound);
        }
        let duplicate = guard.attempts.values().any(|a| {
            a.session_id == attempt.session_id
                && (a.attempt_number == attempt.attempt_number
                    || (attempt.attempt_token.is_some() && a.attempt_token == attempt.attempt_token))
        });
        if duplicate {
            return Err(StoreError::Conflict(format!(
                "attempt {} already recorded for session {}",
                attempt.attempt_number, attempt.session_id
            )));
        }
        let id = guard.next_id();
        let created = SessionAttempt {
            id,
            session_id: attempt.session_id,
            attempt_number: attempt.attempt_number,
            user_answer: attempt.user_answer,
            is_correct: attempt.is_correct,
            time_from_start: attempt.time_from_start,
            attempt_token: attempt.attempt_token,
            created_at: Some(Utc::now()),
        };
        guard.attempts.insert(id, created.clone());
        Ok(created)
    }

    async fn list_attempts(&self, session_id: i64) -> Result<Vec<SessionAttempt>, StoreError> {
        let guard = self.lock()?;
        let mut attempts: Vec<SessionAttempt> = guard
            .attempts
            .values()
            .filter(|a| a.session_id == session_id)
            .cloned()
            .collect();
        attempts.sort_by_key(|a| a.attempt_number);
        Ok(attempts)
    }

    async fn find_attempt_by_token(
        &self,
        session_id: i64,
        token: &str,
    ) -> Result<Option<SessionAttempt>, StoreError> {
        let guard = self.lock()?;
        Ok(guard
            .attempts
            .values()
            .find(|a| a.session_id == session_id && a.attempt_token.as_deref() == Some(token))
            .cloned())
    }
}
