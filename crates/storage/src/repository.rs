use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kotoba_core::model::{AppSetting, Language, Lesson, LessonId, UserId, WordId, WordPair};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Insert payload for a lesson whose id is assigned by storage.
#[derive(Debug, Clone)]
pub struct NewLessonRecord {
    pub owner: UserId,
    pub title: String,
    pub description: String,
    pub language_from: Language,
    pub language_to: Language,
    pub created_at: DateTime<Utc>,
}

impl NewLessonRecord {
    #[must_use]
    pub fn from_lesson(lesson: &Lesson) -> Self {
        Self {
            owner: lesson.owner(),
            title: lesson.title().to_owned(),
            description: lesson.description().to_owned(),
            language_from: lesson.language_from(),
            language_to: lesson.language_to(),
            created_at: lesson.created_at(),
        }
    }
}

/// Insert payload for a word whose id is assigned by storage.
#[derive(Debug, Clone)]
pub struct NewWordRecord {
    pub lesson_id: LessonId,
    pub japanese: String,
    pub ukrainian: String,
    pub furigana: Option<String>,
    pub pronunciation: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewWordRecord {
    #[must_use]
    pub fn from_word(word: &WordPair) -> Self {
        Self {
            lesson_id: word.lesson_id(),
            japanese: word.japanese().to_owned(),
            ukrainian: word.ukrainian().to_owned(),
            furigana: word.furigana().map(ToOwned::to_owned),
            pronunciation: word.pronunciation().map(ToOwned::to_owned),
            created_at: word.created_at(),
        }
    }
}

/// Repository contract for lessons.
///
/// Reads and deletes are scoped to an owner; a lesson owned by someone else
/// behaves exactly like a missing one.
#[async_trait]
pub trait LessonRepository: Send + Sync {
    /// Insert a new lesson and return its assigned ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the lesson cannot be stored.
    async fn insert_new_lesson(&self, lesson: NewLessonRecord) -> Result<LessonId, StorageError>;

    /// Overwrite the editable fields of an existing lesson.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no lesson with that id and owner exists.
    async fn update_lesson(&self, lesson: &Lesson) -> Result<(), StorageError>;

    /// Fetch a lesson by ID for its owner.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_lesson(&self, owner: UserId, id: LessonId)
    -> Result<Option<Lesson>, StorageError>;

    /// All lessons of `owner`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_lessons(&self, owner: UserId) -> Result<Vec<Lesson>, StorageError>;

    /// Case-insensitive title lookup across all owners, oldest match first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn find_lesson_by_title(&self, title: &str) -> Result<Option<Lesson>, StorageError>;

    /// Owner of any stored lesson, used when an import names no owner.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn any_lesson_owner(&self) -> Result<Option<UserId>, StorageError>;

    /// Delete a lesson and all of its words. Returns `false` when nothing matched.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn delete_lesson(&self, owner: UserId, id: LessonId) -> Result<bool, StorageError>;
}

#[async_trait]
pub trait WordRepository: Send + Sync {
    /// Insert a new word and return its assigned ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the lesson does not exist.
    async fn insert_new_word(&self, word: NewWordRecord) -> Result<WordId, StorageError>;

    /// Overwrite the editable fields of an existing word.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the word is not in its lesson.
    async fn update_word(&self, word: &WordPair) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_word(&self, lesson_id: LessonId, id: WordId)
    -> Result<Option<WordPair>, StorageError>;

    /// Words of a lesson in creation order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_words(&self, lesson_id: LessonId) -> Result<Vec<WordPair>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn count_words(&self, lesson_id: LessonId) -> Result<u32, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn delete_word(&self, lesson_id: LessonId, id: WordId) -> Result<bool, StorageError>;
}

/// Feature flags and the admin list that gates changing them.
#[async_trait]
pub trait AppSettingsRepository: Send + Sync {
    /// All flags ordered by key.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_flags(&self) -> Result<Vec<AppSetting>, StorageError>;

    /// Set an existing flag. Returns `None` when the key is unknown.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn update_flag(
        &self,
        key: &str,
        value: bool,
        updated_by: UserId,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<AppSetting>, StorageError>;

    /// Create or replace a flag.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn insert_flag(&self, setting: &AppSetting) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn is_admin(&self, user: UserId) -> Result<bool, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn grant_admin(&self, user: UserId) -> Result<(), StorageError>;
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

#[derive(Default)]
struct MemoryState {
    lessons: HashMap<LessonId, Lesson>,
    words: HashMap<WordId, WordPair>,
    settings: BTreeMap<String, AppSetting>,
    admins: HashSet<UserId>,
    next_lesson_id: u64,
    next_word_id: u64,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StorageError> {
        self.state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

fn same_title(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.trim().to_lowercase()
}

#[async_trait]
impl LessonRepository for InMemoryRepository {
    async fn insert_new_lesson(&self, lesson: NewLessonRecord) -> Result<LessonId, StorageError> {
        let mut guard = self.lock()?;
        guard.next_lesson_id += 1;
        let id = LessonId::new(guard.next_lesson_id);
        let stored = Lesson::new(
            id,
            lesson.owner,
            lesson.title,
            lesson.description,
            lesson.language_from,
            lesson.language_to,
            lesson.created_at,
        )
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
        guard.lessons.insert(id, stored);
        Ok(id)
    }

    async fn update_lesson(&self, lesson: &Lesson) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        match guard.lessons.get_mut(&lesson.id()) {
            Some(existing) if existing.owner() == lesson.owner() => {
                *existing = lesson.clone();
                Ok(())
            }
            _ => Err(StorageError::NotFound),
        }
    }

    async fn get_lesson(
        &self,
        owner: UserId,
        id: LessonId,
    ) -> Result<Option<Lesson>, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .lessons
            .get(&id)
            .filter(|l| l.owner() == owner)
            .cloned())
    }

    async fn list_lessons(&self, owner: UserId) -> Result<Vec<Lesson>, StorageError> {
        let guard = self.lock()?;
        let mut lessons: Vec<Lesson> = guard
            .lessons
            .values()
            .filter(|l| l.owner() == owner)
            .cloned()
            .collect();
        lessons.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().cmp(&a.id()))
        });
        Ok(lessons)
    }

    async fn find_lesson_by_title(&self, title: &str) -> Result<Option<Lesson>, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .lessons
            .values()
            .filter(|l| same_title(l.title(), title))
            .min_by_key(|l| l.id())
            .cloned())
    }

    async fn any_lesson_owner(&self) -> Result<Option<UserId>, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .lessons
            .values()
            .min_by_key(|l| l.id())
            .map(Lesson::owner))
    }

    async fn delete_lesson(&self, owner: UserId, id: LessonId) -> Result<bool, StorageError> {
        let mut guard = self.lock()?;
        let owned = guard.lessons.get(&id).is_some_and(|l| l.owner() == owner);
        if !owned {
            return Ok(false);
        }
        guard.words.retain(|_, w| w.lesson_id() != id);
        guard.lessons.remove(&id);
        Ok(true)
    }
}

#[async_trait]
impl WordRepository for InMemoryRepository {
    async fn insert_new_word(&self, word: NewWordRecord) -> Result<WordId, StorageError> {
        let mut guard = self.lock()?;
        if !guard.lessons.contains_key(&word.lesson_id) {
            return Err(StorageError::NotFound);
        }
        guard.next_word_id += 1;
        let id = WordId::new(guard.next_word_id);
        let stored = WordPair::from_persisted(
            id,
            word.lesson_id,
            word.japanese,
            word.ukrainian,
            word.furigana,
            word.pronunciation,
            word.created_at,
            word.created_at,
        )
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
        guard.words.insert(id, stored);
        Ok(id)
    }

    async fn update_word(&self, word: &WordPair) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        match guard.words.get_mut(&word.id()) {
            Some(existing) if existing.lesson_id() == word.lesson_id() => {
                *existing = word.clone();
                Ok(())
            }
            _ => Err(StorageError::NotFound),
        }
    }

    async fn get_word(
        &self,
        lesson_id: LessonId,
        id: WordId,
    ) -> Result<Option<WordPair>, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .words
            .get(&id)
            .filter(|w| w.lesson_id() == lesson_id)
            .cloned())
    }

    async fn list_words(&self, lesson_id: LessonId) -> Result<Vec<WordPair>, StorageError> {
        let guard = self.lock()?;
        let mut words: Vec<WordPair> = guard
            .words
            .values()
            .filter(|w| w.lesson_id() == lesson_id)
            .cloned()
            .collect();
        words.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(&b.id()))
        });
        Ok(words)
    }

    async fn count_words(&self, lesson_id: LessonId) -> Result<u32, StorageError> {
        let guard = self.lock()?;
        let count = guard
            .words
            .values()
            .filter(|w| w.lesson_id() == lesson_id)
            .count();
        u32::try_from(count).map_err(|_| StorageError::Serialization("word count overflow".into()))
    }

    async fn delete_word(&self, lesson_id: LessonId, id: WordId) -> Result<bool, StorageError> {
        let mut guard = self.lock()?;
        let matches = guard
            .words
            .get(&id)
            .is_some_and(|w| w.lesson_id() == lesson_id);
        if matches {
            guard.words.remove(&id);
        }
        Ok(matches)
    }
}

#[async_trait]
impl AppSettingsRepository for InMemoryRepository {
    async fn list_flags(&self) -> Result<Vec<AppSetting>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.settings.values().cloned().collect())
    }

    async fn update_flag(
        &self,
        key: &str,
        value: bool,
        updated_by: UserId,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<AppSetting>, StorageError> {
        let mut guard = self.lock()?;
        Ok(guard.settings.get_mut(key).map(|setting| {
            setting.value = value;
            setting.updated_at = Some(updated_at);
            setting.updated_by = Some(updated_by);
            setting.clone()
        }))
    }

    async fn insert_flag(&self, setting: &AppSetting) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard.settings.insert(setting.key.clone(), setting.clone());
        Ok(())
    }

    async fn is_admin(&self, user: UserId) -> Result<bool, StorageError> {
        Ok(self.lock()?.admins.contains(&user))
    }

    async fn grant_admin(&self, user: UserId) -> Result<(), StorageError> {
        self.lock()?.admins.insert(user);
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub lessons: Arc<dyn LessonRepository>,
    pub words: Arc<dyn WordRepository>,
    pub settings: Arc<dyn AppSettingsRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let lessons: Arc<dyn LessonRepository> = Arc::new(repo.clone());
        let words: Arc<dyn WordRepository> = Arc::new(repo.clone());
        let settings: Arc<dyn AppSettingsRepository> = Arc::new(repo);
        Self {
            lessons,
            words,
            settings,
        }
    }
}
