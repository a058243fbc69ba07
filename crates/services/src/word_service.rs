use std::sync::Arc;

use kotoba_core::model::{LessonId, UserId, WordDraft, WordId, WordPair};
use storage::repository::{LessonRepository, NewWordRecord, WordRepository};

use crate::Clock;
use crate::error::WordServiceError;

/// Word management inside a lesson the caller owns.
#[derive(Clone)]
pub struct WordService {
    clock: Clock,
    lessons: Arc<dyn LessonRepository>,
    words: Arc<dyn WordRepository>,
}

impl WordService {
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

    async fn ensure_owned(
        &self,
        owner: UserId,
        lesson_id: LessonId,
    ) -> Result<(), WordServiceError> {
        match self.lessons.get_lesson(owner, lesson_id).await? {
            Some(_) => Ok(()),
            None => Err(WordServiceError::LessonNotFound(lesson_id)),
        }
    }

    /// Words in creation order.
    ///
    /// # Errors
    ///
    /// Returns `WordServiceError::LessonNotFound` if the lesson is not the caller's.
    pub async fn list_words(
        &self,
        owner: UserId,
        lesson_id: LessonId,
    ) -> Result<Vec<WordPair>, WordServiceError> {
        self.ensure_owned(owner, lesson_id).await?;
        Ok(self.words.list_words(lesson_id).await?)
    }

    /// # Errors
    ///
    /// Returns `WordServiceError::LessonNotFound`, `Word` on validation failure,
    /// or `Storage`.
    pub async fn add_word(
        &self,
        owner: UserId,
        lesson_id: LessonId,
        draft: WordDraft,
    ) -> Result<WordPair, WordServiceError> {
        self.ensure_owned(owner, lesson_id).await?;
        let word = draft.validate(WordId::new(0), lesson_id, self.clock.now())?;
        let id = self
            .words
            .insert_new_word(NewWordRecord::from_word(&word))
            .await?;
        tracing::info!(lesson_id = %lesson_id, word_id = %id, "word added");
        Ok(word.with_id(id))
    }

    /// # Errors
    ///
    /// Returns `WordServiceError::LessonNotFound`, `NotFound`, `Word`, or `Storage`.
    pub async fn update_word(
        &self,
        owner: UserId,
        lesson_id: LessonId,
        id: WordId,
        draft: WordDraft,
    ) -> Result<WordPair, WordServiceError> {
        self.ensure_owned(owner, lesson_id).await?;
        let current = self
            .words
            .get_word(lesson_id, id)
            .await?
            .ok_or(WordServiceError::NotFound(id))?;
        let updated = current.apply(draft, self.clock.now())?;
        self.words.update_word(&updated).await?;
        tracing::info!(lesson_id = %lesson_id, word_id = %id, "word updated");
        Ok(updated)
    }

    /// # Errors
    ///
    /// Returns `WordServiceError::LessonNotFound`, `NotFound`, or `Storage`.
    pub async fn delete_word(
        &self,
        owner: UserId,
        lesson_id: LessonId,
        id: WordId,
    ) -> Result<(), WordServiceError> {
        self.ensure_owned(owner, lesson_id).await?;
        if !self.words.delete_word(lesson_id, id).await? {
            return Err(WordServiceError::NotFound(id));
        }
        tracing::info!(lesson_id = %lesson_id, word_id = %id, "word deleted");
        Ok(())
    }
}
