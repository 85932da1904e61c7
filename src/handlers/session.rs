// src/handlers/session.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        learning_session::{SessionResponse, StartSessionRequest},
        session_attempt::SubmitAnswerRequest,
        subject::PublicSubject,
    },
    services::{SessionLifecycle, Submission, lifecycle::help_content},
    utils::jwt::Claims,
};

/// Starts a learning session for the authenticated user.
///
/// Returns 201 Created with the session and the public view of its subject.
pub async fn start_session(
    State(lifecycle): State<SessionLifecycle>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<StartSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let (session, subject) = lifecycle.start_session(req.subject_id, user_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "session": session,
            "subject": PublicSubject::from(subject),
        })),
    ))
}

/// Lists the caller's sessions, newest first.
pub async fn list_sessions(
    State(lifecycle): State<SessionLifecycle>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let sessions = lifecycle.history_for_user(user_id).await?;

    Ok(Json(sessions))
}

/// Retrieves one of the caller's sessions.
/// Help content is attached once it has been shown.
pub async fn get_session(
    State(lifecycle): State<SessionLifecycle>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let session = lifecycle.session_for_user(id, claims.user_id()?).await?;

    let help = if session.ai_help_shown {
        let subject = lifecycle.subject_for_session(&session).await?;
        Some(help_content(&subject))
    } else {
        None
    };

    Ok(Json(SessionResponse { session, help }))
}

/// Submits an answer for a session.
///
/// * Falls back to server-side elapsed time when the client sends none.
/// * Returns correctness, the new confusion score and help content when triggered.
pub async fn submit_answer(
    State(lifecycle): State<SessionLifecycle>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(req): Json<SubmitAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = req.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let mut session = lifecycle.session_for_user(id, claims.user_id()?).await?;
    let subject = lifecycle.subject_for_session(&session).await?;

    let elapsed_seconds = req
        .elapsed_seconds
        .unwrap_or_else(|| lifecycle.elapsed_since_start(&session));

    let result = lifecycle
        .submit_answer(
            &mut session,
            &subject,
            Submission {
                answer: req.answer,
                elapsed_seconds,
                attempt_token: req.attempt_token,
            },
        )
        .await?;

    Ok(Json(result))
}

/// Lists the recorded attempts of one of the caller's sessions.
pub async fn list_attempts(
    State(lifecycle): State<SessionLifecycle>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let session = lifecycle.session_for_user(id, claims.user_id()?).await?;
    let attempts = lifecycle.attempts_for_session(&session).await?;

    Ok(Json(attempts))
}
