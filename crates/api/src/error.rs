use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use kotoba_core::quiz::QuizError;
use services::{LessonServiceError, SettingsServiceError, StudyError, WordServiceError};
use storage::repository::StorageError;

use crate::auth::AuthError;

/// Handler failure rendered as `{"error": "<message>"}`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Unauthorized(#[from] AuthError),
    #[error("admin access required")]
    Forbidden,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Internal(detail) => {
                tracing::error!(%detail, "request failed");
                "internal storage error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => ApiError::NotFound(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<LessonServiceError> for ApiError {
    fn from(err: LessonServiceError) -> Self {
        match err {
            LessonServiceError::NotFound(_) => ApiError::NotFound(err.to_string()),
            LessonServiceError::Lesson(inner) => ApiError::BadRequest(inner.to_string()),
            LessonServiceError::Storage(inner) => inner.into(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<WordServiceError> for ApiError {
    fn from(err: WordServiceError) -> Self {
        match err {
            WordServiceError::LessonNotFound(_) | WordServiceError::NotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            WordServiceError::Word(inner) => ApiError::BadRequest(inner.to_string()),
            WordServiceError::Storage(inner) => inner.into(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<StudyError> for ApiError {
    fn from(err: StudyError) -> Self {
        match err {
            StudyError::LessonNotFound(_) => ApiError::NotFound(err.to_string()),
            StudyError::Quiz(QuizError::EmptyDeck) => {
                ApiError::BadRequest(QuizError::EmptyDeck.to_string())
            }
            StudyError::Storage(inner) => inner.into(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<SettingsServiceError> for ApiError {
    fn from(err: SettingsServiceError) -> Self {
        match err {
            SettingsServiceError::Forbidden => ApiError::Forbidden,
            SettingsServiceError::UnknownKey(_) => ApiError::NotFound(err.to_string()),
            SettingsServiceError::Setting(inner) => ApiError::BadRequest(inner.to_string()),
            SettingsServiceError::Storage(inner) => inner.into(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
