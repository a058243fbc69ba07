use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::import::ImportService;
use crate::lesson_service::LessonService;
use crate::settings_service::SettingsService;
use crate::study_service::StudyService;
use crate::word_service::WordService;

/// Assembles app-facing services over one `Storage`.
#[derive(Clone)]
pub struct AppServices {
    storage: Storage,
    lessons: Arc<LessonService>,
    words: Arc<WordService>,
    study: Arc<StudyService>,
    settings: Arc<SettingsService>,
    import: Arc<ImportService>,
}

impl AppServices {
    #[must_use]
    pub fn new(storage: Storage, clock: Clock) -> Self {
        let lessons = Arc::new(LessonService::new(
            clock,
            Arc::clone(&storage.lessons),
            Arc::clone(&storage.words),
        ));
        let words = Arc::new(WordService::new(
            clock,
            Arc::clone(&storage.lessons),
            Arc::clone(&storage.words),
        ));
        let study = Arc::new(StudyService::new(
            clock,
            Arc::clone(&storage.lessons),
            Arc::clone(&storage.words),
        ));
        let settings = Arc::new(SettingsService::new(clock, Arc::clone(&storage.settings)));
        let import = Arc::new(ImportService::new(
            clock,
            Arc::clone(&storage.lessons),
            Arc::clone(&storage.words),
        ));

        Self {
            storage,
            lessons,
            words,
            study,
            settings,
            import,
        }
    }

    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        tracing::info!(db_url, "sqlite storage ready");
        Ok(Self::new(storage, clock))
    }

    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::new(Storage::in_memory(), clock)
    }

    /// Raw repositories, for seeding and health checks.
    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    #[must_use]
    pub fn lessons(&self) -> Arc<LessonService> {
        Arc::clone(&self.lessons)
    }

    #[must_use]
    pub fn words(&self) -> Arc<WordService> {
        Arc::clone(&self.words)
    }

    #[must_use]
    pub fn study(&self) -> Arc<StudyService> {
        Arc::clone(&self.study)
    }

    #[must_use]
    pub fn settings(&self) -> Arc<SettingsService> {
        Arc::clone(&self.settings)
    }

    #[must_use]
    pub fn import(&self) -> Arc<ImportService> {
        Arc::clone(&self.import)
    }
}
