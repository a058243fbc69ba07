use std::sync::Arc;

use kotoba_core::model::{Lesson, LessonDraft, LessonId, UserId};
use serde::Serialize;
use storage::repository::{LessonRepository, NewLessonRecord, WordRepository};

use crate::Clock;
use crate::error::LessonServiceError;

/// A lesson as listed on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LessonOverview {
    #[serde(flatten)]
    pub lesson: Lesson,
    pub word_count: u32,
}

/// Owner-scoped lesson management.
#[derive(Clone)]
pub struct LessonService {
    clock: Clock,
    lessons: Arc<dyn LessonRepository>,
    words: Arc<dyn WordRepository>,
}

impl LessonService {
    #[must_use]
    pub fn new(
        clock: Clock,
        lessons: Arc<dyn LessonRepository>,
        words: Arc<dyn WordRepository>,
    ) -> Self {
        Self {
            clock,
            lessons,
            words,
        }
    }

    /// Validate and persist a new lesson for `owner`.
    ///
    /// # Errors
    ///
    /// Returns `LessonServiceError::Lesson` for validation failures.
    /// Returns `LessonServiceError::Storage` if persistence fails.
    pub async fn create_lesson(
        &self,
        owner: UserId,
        draft: LessonDraft,
    ) -> Result<Lesson, LessonServiceError> {
        let lesson = draft.validate(LessonId::new(0), owner, self.clock.now())?;
        let id = self
            .lessons
            .insert_new_lesson(NewLessonRecord::from_lesson(&lesson))
            .await?;
        tracing::info!(lesson_id = %id, %owner, title = lesson.title(), "lesson created");
        Ok(lesson.with_id(id))
    }

    /// The owner's lessons, newest first, each with its word count.
    ///
    /// # Errors
    ///
    /// Returns `LessonServiceError::Storage` if repository access fails.
    pub async fn list_lessons(
        &self,
        owner: UserId,
    ) -> Result<Vec<LessonOverview>, LessonServiceError> {
        let lessons = self.lessons.list_lessons(owner).await?;
        let mut overviews = Vec::with_capacity(lessons.len());
        for lesson in lessons {
            let word_count = self.words.count_words(lesson.id()).await?;
            overviews.push(LessonOverview { lesson, word_count });
        }
        Ok(overviews)
    }

    /// # Errors
    ///
    /// Returns `LessonServiceError::NotFound` when the lesson is missing or
    /// belongs to someone else.
    pub async fn get_lesson(
        &self,
        owner: UserId,
        id: LessonId,
    ) -> Result<Lesson, LessonServiceError> {
        self.lessons
            .get_lesson(owner, id)
            .await?
            .ok_or(LessonServiceError::NotFound(id))
    }

    /// Replace title, description and languages, keeping the creation time.
    ///
    /// # Errors
    ///
    /// Returns `LessonServiceError::NotFound`, `Lesson` on validation failure,
    /// or `Storage`.
    pub async fn update_lesson(
        &self,
        owner: UserId,
        id: LessonId,
        draft: LessonDraft,
    ) -> Result<Lesson, LessonServiceError> {
        let current = self.get_lesson(owner, id).await?;
        let updated = current.apply(draft, self.clock.now())?;
        self.lessons.update_lesson(&updated).await?;
        tracing::info!(lesson_id = %id, %owner, "lesson updated");
        Ok(updated)
    }

    /// Delete a lesson together with its words.
    ///
    /// # Errors
    ///
    /// Returns `LessonServiceError::NotFound` when nothing owned by `owner` matched.
    pub async fn delete_lesson(
        &self,
        owner: UserId,
        id: LessonId,
    ) -> Result<(), LessonServiceError> {
        if !self.lessons.delete_lesson(owner, id).await? {
            tracing::warn!(lesson_id = %id, %owner, "delete requested for missing lesson");
            return Err(LessonServiceError::NotFound(id));
        }
        tracing::info!(lesson_id = %id, %owner, "lesson deleted");
        Ok(())
    }
}
