// src/handlers/subject.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::subject::PublicSubject,
    store::SharedStore,
};

/// Lists all subjects without their answers or help content.
pub async fn list_subjects(State(store): State<SharedStore>) -> Result<impl IntoResponse, AppError> {
    let subjects: Vec<PublicSubject> = store
        .list_subjects()
        .await?
        .into_iter()
        .map(PublicSubject::from)
        .collect();

    Ok(Json(subjects))
}

/// Retrieves a single subject by slug.
pub async fn get_subject(
    State(store): State<SharedStore>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let subject = store
        .get_subject_by_slug(&slug)
        .await?
        .ok_or(AppError::NotFound("Subject not found".to_string()))?;

    Ok(Json(PublicSubject::from(subject)))
}
