#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod import;
pub mod lesson_service;
pub mod settings_service;
pub mod study_service;
pub mod word_service;

pub use kotoba_core::Clock;

pub use app_services::AppServices;
pub use error::{
    AppServicesError, ImportError, LessonServiceError, SettingsServiceError, StudyError,
    WordServiceError,
};
pub use import::{FailedWord, ImportReport, ImportService, parse_csv, parse_pair};
pub use lesson_service::{LessonOverview, LessonService};
pub use settings_service::SettingsService;
pub use study_service::{StudyDeck, StudyService};
pub use word_service::WordService;
