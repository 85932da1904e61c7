// tests/lifecycle_tests.rs

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use tutor_backend::{
    error::AppError,
    models::subject::{NewSubject, Subject},
    services::{SessionLifecycle, Submission},
    store::{DataStore, InMemoryStore},
    utils::clock::Clock,
};

const USER: i64 = 7;

/// Builds a lifecycle over a fresh in-memory store holding one subject whose answer is "5".
async fn setup() -> (SessionLifecycle, InMemoryStore, Subject) {
    let store = InMemoryStore::new();
    let subject = store
        .create_subject(NewSubject {
            name: "Arithmetic".to_string(),
            slug: "adding-small-numbers".to_string(),
            title: "Adding small numbers".to_string(),
            question: "What is 2 + 3?".to_string(),
            data: String::new(),
            correct_answer: "5".to_string(),
            help_text: "Count up from 2.".to_string(),
            video_search: "adding numbers".to_string(),
        })
        .await
        .unwrap();

    let clock = Clock::fixed(Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap());
    let lifecycle = SessionLifecycle::new(Arc::new(store.clone()), clock);
    (lifecycle, store, subject)
}

fn answer(text: &str, elapsed_seconds: i64) -> Submission {
    Submission {
        answer: text.to_string(),
        elapsed_seconds,
        attempt_token: None,
    }
}

#[tokio::test]
async fn start_session_initialises_counters() {
    let (lifecycle, store, subject) = setup().await;

    let (session, loaded) = lifecycle.start_session(subject.id, USER).await.unwrap();

    assert_eq!(loaded.id, subject.id);
    assert_eq!(session.user_id, USER);
    assert_eq!(session.attempts, 0);
    assert_eq!(session.time_spent, 0);
    assert_eq!(session.confusion_score, 0);
    assert!(!session.is_completed);
    assert!(!session.ai_help_shown);
    assert!(session.end_time.is_none());
    assert_eq!(
        session.start_time,
        Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap()
    );
    assert_eq!(store.get_session(session.id).await.unwrap(), Some(session));
}

#[tokio::test]
async fn start_session_for_unknown_subject_creates_nothing() {
    let (lifecycle, store, _) = setup().await;

    let err = lifecycle.start_session(999, USER).await.unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
    assert!(store.list_sessions_for_user(USER).await.unwrap().is_empty());
}

#[tokio::test]
async fn wrong_then_right_answer_completes_session() {
    let (lifecycle, store, subject) = setup().await;
    let (mut session, _) = lifecycle.start_session(subject.id, USER).await.unwrap();

    let first = lifecycle
        .submit_answer(&mut session, &subject, answer("3", 10))
        .await
        .unwrap();
    assert!(!first.is_correct);
    assert_eq!(first.attempts, 1);
    assert_eq!(first.confusion_score, 30);
    assert!(!first.help_triggered);
    assert!(first.help.is_none());
    assert!(!session.is_completed);

    let second = lifecycle
        .submit_answer(&mut session, &subject, answer("5", 25))
        .await
        .unwrap();
    assert!(second.is_correct);
    assert_eq!(second.attempts, 2);
    assert_eq!(second.confusion_score, 65);
    assert!(second.help_triggered);
    assert!(second.is_completed);

    let help = second.help.unwrap();
    assert_eq!(help.help_text, "Count up from 2.");
    assert_eq!(
        help.video_url.as_deref(),
        Some("https://www.youtube.com/results?search_query=adding+numbers")
    );

    assert!(session.is_completed);
    assert!(session.ai_help_shown);
    assert_eq!(
        session.end_time,
        Some(Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap())
    );

    // The stored row matches the caller's copy.
    let stored = store.get_session(session.id).await.unwrap().unwrap();
    assert_eq!(stored, session);

    let attempts = store.list_attempts(session.id).await.unwrap();
    assert_eq!(attempts.len(), 2);
    assert_eq!(attempts[0].attempt_number, 1);
    assert_eq!(attempts[0].user_answer, "3");
    assert_eq!(attempts[0].time_from_start, 10);
    assert!(!attempts[0].is_correct);
    assert_eq!(attempts[1].attempt_number, 2);
    assert!(attempts[1].is_correct);
}

#[tokio::test]
async fn answer_matching_is_case_insensitive_substring() {
    let (lifecycle, _, subject) = setup().await;
    let (mut session, _) = lifecycle.start_session(subject.id, USER).await.unwrap();

    let result = lifecycle
        .submit_answer(&mut session, &subject, answer("  The Answer is 5 ", 3))
        .await
        .unwrap();

    assert!(result.is_correct);
}

#[tokio::test]
async fn confusion_saturates_after_repeated_slow_attempts() {
    let (lifecycle, store, subject) = setup().await;
    let (mut session, _) = lifecycle.start_session(subject.id, USER).await.unwrap();

    let mut scores = Vec::new();
    for _ in 0..5 {
        let result = lifecycle
            .submit_answer(&mut session, &subject, answer("no idea", 75))
            .await
            .unwrap();
        scores.push(result.confusion_score);
    }

    assert_eq!(scores, vec![80, 100, 100, 100, 100]);
    assert_eq!(session.attempts, 5);
    assert!(!session.is_completed);
    assert!(session.end_time.is_none());

    let numbers: Vec<i32> = store
        .list_attempts(session.id)
        .await
        .unwrap()
        .iter()
        .map(|a| a.attempt_number)
        .collect();
    assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn blank_answer_is_rejected_without_writes() {
    let (lifecycle, store, subject) = setup().await;
    let (mut session, _) = lifecycle.start_session(subject.id, USER).await.unwrap();
    let before = session.clone();

    let err = lifecycle
        .submit_answer(&mut session, &subject, answer("   \t ", 10))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::BadRequest(_)));
    assert_eq!(session, before);
    assert!(store.list_attempts(session.id).await.unwrap().is_empty());
    assert_eq!(store.get_session(session.id).await.unwrap(), Some(before));
}

#[tokio::test]
async fn negative_elapsed_is_rejected() {
    let (lifecycle, store, subject) = setup().await;
    let (mut session, _) = lifecycle.start_session(subject.id, USER).await.unwrap();

    let err = lifecycle
        .submit_answer(&mut session, &subject, answer("3", -1))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::BadRequest(_)));
    assert!(store.list_attempts(session.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn completed_session_rejects_further_answers() {
    let (lifecycle, store, subject) = setup().await;
    let (mut session, _) = lifecycle.start_session(subject.id, USER).await.unwrap();

    lifecycle
        .submit_answer(&mut session, &subject, answer("5", 4))
        .await
        .unwrap();
    let err = lifecycle
        .submit_answer(&mut session, &subject, answer("6", 8))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
    assert!(session.is_completed);
    assert_eq!(session.attempts, 1);
    assert_eq!(store.list_attempts(session.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn help_flag_stays_set_once_shown() {
    let (lifecycle, _, subject) = setup().await;
    let (mut session, _) = lifecycle.start_session(subject.id, USER).await.unwrap();
    session.ai_help_shown = true;

    let result = lifecycle
        .submit_answer(&mut session, &subject, answer("3", 0))
        .await
        .unwrap();

    assert_eq!(result.confusion_score, 20);
    assert!(!result.help_triggered);
    assert!(session.ai_help_shown);
}

#[tokio::test]
async fn earlier_elapsed_value_does_not_lower_confusion() {
    let (lifecycle, _, subject) = setup().await;
    let (mut session, _) = lifecycle.start_session(subject.id, USER).await.unwrap();

    let first = lifecycle
        .submit_answer(&mut session, &subject, answer("3", 30))
        .await
        .unwrap();
    let second = lifecycle
        .submit_answer(&mut session, &subject, answer("4", 5))
        .await
        .unwrap();

    assert_eq!(first.confusion_score, 50);
    assert_eq!(second.confusion_score, 70);
    assert!(second.confusion_score >= first.confusion_score);
    assert_eq!(session.time_spent, 30);
}

#[tokio::test]
async fn repeated_attempt_token_replays_without_writing() {
    let (lifecycle, store, subject) = setup().await;
    let (mut session, _) = lifecycle.start_session(subject.id, USER).await.unwrap();

    let submission = Submission {
        answer: "3".to_string(),
        elapsed_seconds: 30,
        attempt_token: Some("retry-me".to_string()),
    };

    let first = lifecycle
        .submit_answer(&mut session, &subject, submission.clone())
        .await
        .unwrap();
    let replay = lifecycle
        .submit_answer(&mut session, &subject, submission)
        .await
        .unwrap();

    assert!(!first.replayed);
    assert!(replay.replayed);
    assert_eq!(replay.attempts, 1);
    assert_eq!(replay.confusion_score, first.confusion_score);
    assert_eq!(replay.is_correct, first.is_correct);
    assert_eq!(store.list_attempts(session.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn replay_of_completing_attempt_is_not_rejected() {
    let (lifecycle, store, subject) = setup().await;
    let (mut session, _) = lifecycle.start_session(subject.id, USER).await.unwrap();

    let submission = Submission {
        answer: "5".to_string(),
        elapsed_seconds: 12,
        attempt_token: Some("final".to_string()),
    };
    lifecycle
        .submit_answer(&mut session, &subject, submission.clone())
        .await
        .unwrap();
    let replay = lifecycle
        .submit_answer(&mut session, &subject, submission)
        .await
        .unwrap();

    assert!(replay.replayed);
    assert!(replay.is_correct);
    assert!(replay.is_completed);
    assert_eq!(store.list_attempts(session.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn unavailable_store_surfaces_and_leaves_session_untouched() {
    let (lifecycle, store, subject) = setup().await;
    let (mut session, _) = lifecycle.start_session(subject.id, USER).await.unwrap();
    let before = session.clone();
    store.fail_attempt_inserts(true);

    let err = lifecycle
        .submit_answer(&mut session, &subject, answer("3", 10))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::ServiceUnavailable(_)));
    assert_eq!(session, before);
    assert!(store.list_attempts(session.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn failed_session_update_leaves_recorded_attempt() {
    let (lifecycle, store, subject) = setup().await;
    let (mut session, _) = lifecycle.start_session(subject.id, USER).await.unwrap();
    let before = session.clone();
    store.fail_session_updates(true);

    let err = lifecycle
        .submit_answer(&mut session, &subject, answer("3", 10))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::ServiceUnavailable(_)));
    assert_eq!(session, before);
    // Not reconciled: the attempt exists while the stored session is unchanged.
    assert_eq!(store.list_attempts(session.id).await.unwrap().len(), 1);
    assert_eq!(store.get_session(session.id).await.unwrap(), Some(before));

    // The session still accepts answers once the store recovers.
    store.fail_session_updates(false);
    let mut reloaded = store.get_session(session.id).await.unwrap().unwrap();
    let result = lifecycle
        .submit_answer(&mut reloaded, &subject, answer("5", 20))
        .await
        .unwrap();

    assert!(result.is_correct);
    assert!(result.is_completed);
    assert_eq!(result.attempts, 2);
    assert_eq!(result.confusion_score, 60);
    assert_eq!(reloaded.attempts, 2);

    let numbers: Vec<i32> = store
        .list_attempts(session.id)
        .await
        .unwrap()
        .iter()
        .map(|a| a.attempt_number)
        .collect();
    assert_eq!(numbers, vec![1, 2]);
}

#[tokio::test]
async fn replay_after_later_answers_reports_original_outcome() {
    let (lifecycle, store, subject) = setup().await;
    let (mut session, _) = lifecycle.start_session(subject.id, USER).await.unwrap();

    let early = Submission {
        answer: "3".to_string(),
        elapsed_seconds: 10,
        attempt_token: Some("early".to_string()),
    };
    let first = lifecycle
        .submit_answer(&mut session, &subject, early.clone())
        .await
        .unwrap();
    lifecycle
        .submit_answer(&mut session, &subject, answer("5", 25))
        .await
        .unwrap();
    assert!(session.is_completed);

    let replay = lifecycle
        .submit_answer(&mut session, &subject, early)
        .await
        .unwrap();

    assert!(replay.replayed);
    assert!(!replay.is_correct);
    assert!(!replay.is_completed);
    assert_eq!(replay.attempts, 1);
    assert_eq!(replay.confusion_score, 30);
    assert!(!replay.help_triggered);
    assert!(replay.help.is_none());
    assert_eq!(
        (replay.confusion_score, replay.attempts, replay.is_completed),
        (first.confusion_score, first.attempts, first.is_completed)
    );
    assert_eq!(store.list_attempts(session.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn session_of_another_user_is_not_found() {
    let (lifecycle, _, subject) = setup().await;
    let (session, _) = lifecycle.start_session(subject.id, USER).await.unwrap();

    assert!(lifecycle.session_for_user(session.id, USER).await.is_ok());
    assert!(matches!(
        lifecycle.session_for_user(session.id, USER + 1).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn mismatched_subject_is_rejected() {
    let (lifecycle, store, subject) = setup().await;
    let other = store
        .create_subject(NewSubject {
            name: "Geography".to_string(),
            slug: "capital-of-france".to_string(),
            title: "Capitals".to_string(),
            question: "Capital of France?".to_string(),
            data: String::new(),
            correct_answer: "paris".to_string(),
            help_text: String::new(),
            video_search: String::new(),
        })
        .await
        .unwrap();
    let (mut session, _) = lifecycle.start_session(subject.id, USER).await.unwrap();

    let err = lifecycle
        .submit_answer(&mut session, &other, answer("paris", 5))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn elapsed_since_start_follows_clock() {
    let store = InMemoryStore::new();
    let start = Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap();
    let mut clock = Clock::fixed(start);
    let subject = store
        .create_subject(NewSubject {
            name: "Arithmetic".to_string(),
            slug: "sum".to_string(),
            title: "Sum".to_string(),
            question: "2 + 3?".to_string(),
            data: String::new(),
            correct_answer: "5".to_string(),
            help_text: String::new(),
            video_search: String::new(),
        })
        .await
        .unwrap();
    let (session, _) = SessionLifecycle::new(Arc::new(store.clone()), clock)
        .start_session(subject.id, USER)
        .await
        .unwrap();

    clock.advance(chrono::Duration::seconds(47));
    let later = SessionLifecycle::new(Arc::new(store), clock);

    assert_eq!(later.elapsed_since_start(&session), 47);
}
