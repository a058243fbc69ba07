use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use kotoba_core::model::{Lesson, LessonDraft, LessonId};
use services::LessonOverview;

use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::extractors::{AppJson, AppPath};

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

/// GET /api/lessons
pub async fn list_lessons(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<LessonOverview>>, ApiError> {
    let lessons = state.services.lessons().list_lessons(user).await?;
    Ok(Json(lessons))
}

/// POST /api/lessons
pub async fn create_lesson(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    AppJson(draft): AppJson<LessonDraft>,
) -> Result<(StatusCode, Json<Lesson>), ApiError> {
    let lesson = state.services.lessons().create_lesson(user, draft).await?;
    Ok((StatusCode::CREATED, Json(lesson)))
}

/// GET /api/lessons/{id}
pub async fn get_lesson(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    AppPath(id): AppPath<u64>,
) -> Result<Json<Lesson>, ApiError> {
    let lesson = state
        .services
        .lessons()
        .get_lesson(user, LessonId::new(id))
        .await?;
    Ok(Json(lesson))
}

/// PUT /api/lessons/{id}
pub async fn update_lesson(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    AppPath(id): AppPath<u64>,
    AppJson(draft): AppJson<LessonDraft>,
) -> Result<Json<Lesson>, ApiError> {
    let lesson = state
        .services
        .lessons()
        .update_lesson(user, LessonId::new(id), draft)
        .await?;
    Ok(Json(lesson))
}

/// DELETE /api/lessons/{id} - removes the lesson and all of its words.
pub async fn delete_lesson(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    AppPath(id): AppPath<u64>,
) -> Result<Json<DeleteResponse>, ApiError> {
    state
        .services
        .lessons()
        .delete_lesson(user, LessonId::new(id))
        .await?;
    Ok(Json(DeleteResponse {
        success: true,
        message: "Lesson deleted successfully".to_string(),
    }))
}
