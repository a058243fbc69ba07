use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use kotoba_core::model::{LessonId, WordDraft, WordId, WordPair};

use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::extractors::{AppJson, AppPath};

pub async fn list_words(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    AppPath(lesson_id): AppPath<u64>,
) -> Result<Json<Vec<WordPair>>, ApiError> {
    let words = state
        .services
        .words()
        .list_words(user, LessonId::new(lesson_id))
        .await?;
    Ok(Json(words))
}

pub async fn create_word(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    AppPath(lesson_id): AppPath<u64>,
    AppJson(draft): AppJson<WordDraft>,
) -> Result<(StatusCode, Json<WordPair>), ApiError> {
    let word = state
        .services
        .words()
        .add_word(user, LessonId::new(lesson_id), draft)
        .await?;
    Ok((StatusCode::CREATED, Json(word)))
}

pub async fn update_word(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    AppPath((lesson_id, word_id)): AppPath<(u64, u64)>,
    AppJson(draft): AppJson<WordDraft>,
) -> Result<Json<WordPair>, ApiError> {
    let word = state
        .services
        .words()
        .update_word(user, LessonId::new(lesson_id), WordId::new(word_id), draft)
        .await?;
    Ok(Json(word))
}

pub async fn delete_word(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    AppPath((lesson_id, word_id)): AppPath<(u64, u64)>,
) -> Result<StatusCode, ApiError> {
    state
        .services
        .words()
        .delete_word(user, LessonId::new(lesson_id), WordId::new(word_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
