// src/handlers/admin.rs

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use validator::Validate;

use crate::{
    error::AppError,
    models::subject::{CreateSubjectRequest, NewSubject, PublicSubject},
    store::SharedStore,
    utils::{html::clean_html, jwt::Claims},
};

/// Creates a new subject.
/// Admin only. Help text is sanitized before it is stored.
pub async fn create_subject(
    State(store): State<SharedStore>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateSubjectRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let subject = store
        .create_subject(NewSubject {
            name: payload.name,
            slug: payload.slug,
            title: payload.title,
            question: payload.question,
            data: payload.data,
            correct_answer: payload.correct_answer.trim().to_string(),
            help_text: clean_html(&payload.help_text),
            video_search: payload.video_search.trim().to_string(),
        })
        .await?;

    tracing::info!(admin = %claims.sub, slug = %subject.slug, "Subject created");

    Ok((StatusCode::CREATED, Json(PublicSubject::from(subject))))
}
