//! Shared error types for the services crate.

use thiserror::Error;

use kotoba_core::model::{AppSettingError, LessonError, LessonId, WordError, WordId};
use kotoba_core::quiz::QuizError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `LessonService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LessonServiceError {
    #[error("lesson {0} not found")]
    NotFound(LessonId),
    #[error(transparent)]
    Lesson(#[from] LessonError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `WordService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WordServiceError {
    #[error("lesson {0} not found")]
    LessonNotFound(LessonId),
    #[error("word {0} not found")]
    NotFound(WordId),
    #[error(transparent)]
    Word(#[from] WordError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `StudyService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StudyError {
    #[error("lesson {0} not found")]
    LessonNotFound(LessonId),
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `SettingsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SettingsServiceError {
    #[error("not an admin")]
    Forbidden,
    #[error("unknown setting: {0}")]
    UnknownKey(String),
    #[error(transparent)]
    Setting(#[from] AppSettingError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by the import tools.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ImportError {
    #[error("invalid word pair format: {0}")]
    InvalidPair(String),
    #[error("no owner given and no existing lesson to borrow one from")]
    NoOwner,
    #[error("lesson not found: {0}")]
    LessonNotFound(String),
    #[error(transparent)]
    Lesson(#[from] LessonError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
