// src/services/lifecycle.rs

use crate::{
    error::AppError,
    models::{
        learning_session::{HelpContent, LearningSession, NewLearningSession, SessionUpdate},
        session_attempt::{NewSessionAttempt, SessionAttempt, SubmissionResult},
        subject::Subject,
    },
    services::scoring,
    store::SharedStore,
    utils::{clock::Clock, video::video_search_url},
};

/// One answer submission as received from the presentation layer.
#[derive(Debug, Clone)]
pub struct Submission {
    /// Raw text as typed. Stored verbatim, compared after trimming.
    pub answer: String,
    pub elapsed_seconds: i64,
    /// Client-generated token; a repeated token replays the earlier outcome.
    pub attempt_token: Option<String>,
}

/// Drives a learner through one subject: session creation, answer scoring,
/// and the help-trigger decision after every submission.
///
/// The caller owns the `LearningSession` value between calls.
#[derive(Clone)]
pub struct SessionLifecycle {
    store: SharedStore,
    clock: Clock,
}

impl SessionLifecycle {
    pub fn new(store: SharedStore, clock: Clock) -> Self {
        Self { store, clock }
    }

    /// Opens a fresh session for `user_id` on `subject_id`.
    ///
    /// Returns `AppError::NotFound` without writing anything if the subject does not exist.
    pub async fn start_session(
        &self,
        subject_id: i64,
        user_id: i64,
    ) -> Result<(LearningSession, Subject), AppError> {
        let subject = self
            .store
            .get_subject(subject_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Subject {} not found", subject_id)))?;

        let session = self
            .store
            .create_session(NewLearningSession {
                user_id,
                subject_id: subject.id,
                start_time: self.clock.now(),
            })
            .await?;

        tracing::info!(
            session_id = session.id,
            user_id,
            subject = %subject.slug,
            "Learning session started"
        );

        Ok((session, subject))
    }

    /// Scores one answer and persists it.
    ///
    /// The attempt insert and the session update go through
    /// `DataStore::record_submission`; `session` is only modified once that succeeds.
    pub async fn submit_answer(
        &self,
        session: &mut LearningSession,
        subject: &Subject,
        submission: Submission,
    ) -> Result<SubmissionResult, AppError> {
        let answer = submission.answer.trim();
        if answer.is_empty() {
            return Err(AppError::BadRequest("Answer must not be empty".to_string()));
        }
        if submission.elapsed_seconds < 0 {
            return Err(AppError::BadRequest(
                "Elapsed seconds must not be negative".to_string(),
            ));
        }
        if session.subject_id != subject.id {
            return Err(AppError::BadRequest(
                "Session does not belong to this subject".to_string(),
            ));
        }

        let recorded = self.store.list_attempts(session.id).await?;

        if let Some(token) = submission.attempt_token.as_deref() {
            if let Some(previous) = recorded
                .iter()
                .find(|a| a.attempt_token.as_deref() == Some(token))
            {
                tracing::info!(
                    session_id = session.id,
                    attempt_number = previous.attempt_number,
                    "Replaying previously recorded attempt"
                );
                return Ok(replayed_result(subject, previous, &recorded));
            }
        }

        if session.is_completed {
            return Err(AppError::Conflict(
                "Session is already completed".to_string(),
            ));
        }

        // Recorded attempts win over the session counters, which lag behind after a
        // failed session update.
        let last_recorded = recorded.iter().map(|a| a.attempt_number).max().unwrap_or(0);
        let attempts = session.attempts.max(last_recorded) + 1;
        // Client timers can drift backwards; earlier values keep confusion monotonic.
        let elapsed = submission
            .elapsed_seconds
            .max(i64::from(session.time_spent))
            .max(latest_elapsed(recorded.iter()));
        let confusion = scoring::confusion_score(i64::from(attempts), elapsed);
        let is_correct = scoring::is_correct_answer(answer, &subject.correct_answer);
        let help_triggered = scoring::help_triggered(confusion);

        let attempt = NewSessionAttempt {
            session_id: session.id,
            attempt_number: attempts,
            user_answer: submission.answer.clone(),
            is_correct,
            time_from_start: saturating_i32(submission.elapsed_seconds),
            attempt_token: submission.attempt_token.clone(),
        };

        let update = SessionUpdate {
            attempts,
            time_spent: saturating_i32(elapsed),
            confusion_score: saturating_i32(confusion),
            is_completed: is_correct,
            ai_help_shown: help_triggered || session.ai_help_shown,
            end_time: if is_correct {
                Some(self.clock.now())
            } else {
                session.end_time
            },
        };

        self.store
            .record_submission(attempt, session.id, &update)
            .await
            .inspect_err(|e| {
                tracing::warn!(
                    session_id = session.id,
                    attempt = attempts,
                    "Failed to record submission: {}",
                    e
                )
            })?;

        session.apply(&update);

        tracing::debug!(
            session_id = session.id,
            attempts,
            confusion,
            is_correct,
            help_triggered,
            "Answer recorded"
        );

        Ok(SubmissionResult {
            is_correct,
            confusion_score: session.confusion_score,
            help_triggered,
            attempts,
            is_completed: session.is_completed,
            replayed: false,
            help: help_triggered.then(|| help_content(subject)),
        })
    }

    /// Seconds between the session start and the clock's current time.
    pub fn elapsed_since_start(&self, session: &LearningSession) -> i64 {
        (self.clock.now() - session.start_time).num_seconds().max(0)
    }

    /// Loads a session owned by `user_id`.
    ///
    /// Sessions of other users are reported as missing.
    pub async fn session_for_user(
        &self,
        session_id: i64,
        user_id: i64,
    ) -> Result<LearningSession, AppError> {
        self.store
            .get_session(session_id)
            .await?
            .filter(|s| s.user_id == user_id)
            .ok_or_else(|| AppError::NotFound(format!("Session {} not found", session_id)))
    }

    pub async fn subject_for_session(&self, session: &LearningSession) -> Result<Subject, AppError> {
        self.store
            .get_subject(session.subject_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Subject {} not found", session.subject_id)))
    }

    pub async fn history_for_user(&self, user_id: i64) -> Result<Vec<LearningSession>, AppError> {
        Ok(self.store.list_sessions_for_user(user_id).await?)
    }

    pub async fn attempts_for_session(
        &self,
        session: &LearningSession,
    ) -> Result<Vec<SessionAttempt>, AppError> {
        Ok(self.store.list_attempts(session.id).await?)
    }
}

/// Help text and video link of a subject.
pub fn help_content(subject: &Subject) -> HelpContent {
    HelpContent {
        help_text: subject.help_text.clone(),
        video_url: video_search_url(&subject.video_search),
    }
}

/// Rebuilds the outcome of `previous` as it was first reported.
fn replayed_result(
    subject: &Subject,
    previous: &SessionAttempt,
    recorded: &[SessionAttempt],
) -> SubmissionResult {
    let earlier = recorded
        .iter()
        .filter(|a| a.attempt_number < previous.attempt_number);
    let elapsed = i64::from(previous.time_from_start).max(latest_elapsed(earlier));
    let confusion = scoring::confusion_score(i64::from(previous.attempt_number), elapsed);
    let help_triggered = scoring::help_triggered(confusion);

    SubmissionResult {
        is_correct: previous.is_correct,
        confusion_score: saturating_i32(confusion),
        help_triggered,
        attempts: previous.attempt_number,
        is_completed: previous.is_correct,
        replayed: true,
        help: help_triggered.then(|| help_content(subject)),
    }
}

fn latest_elapsed<'a>(attempts: impl Iterator<Item = &'a SessionAttempt>) -> i64 {
    attempts
        .map(|a| i64::from(a.time_from_start))
        .max()
        .unwrap_or(0)
}

fn saturating_i32(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
