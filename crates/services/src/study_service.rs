use std::sync::Arc;

use kotoba_core::model::{Lesson, LessonId, UserId, WordPair};
use kotoba_core::quiz::{QuizError, QuizSession, SessionConfig, StudyFlow};
use storage::repository::{LessonRepository, WordRepository};

use crate::Clock;
use crate::error::StudyError;

/// A lesson and the words that make up its deck.
#[derive(Debug, Clone)]
pub struct StudyDeck {
    pub lesson: Lesson,
    pub words: Vec<WordPair>,
}

/// Loads decks from storage and hands out quiz sessions.
///
/// Sessions live only in memory; nothing here writes results back.
#[derive(Clone)]
pub struct StudyService {
    clock: Clock,
    lessons: Arc<dyn LessonRepository>,
    words: Arc<dyn WordRepository>,
}

impl StudyService {
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

    /// # Errors
    ///
    /// Returns `StudyError::LessonNotFound` for missing or foreign lessons.
    pub async fn load_deck(
        &self,
        owner: UserId,
        lesson_id: LessonId,
    ) -> Result<StudyDeck, StudyError> {
        let lesson = self
            .lessons
            .get_lesson(owner, lesson_id)
            .await?
            .ok_or(StudyError::LessonNotFound(lesson_id))?;
        let words = self.words.list_words(lesson_id).await?;
        Ok(StudyDeck { lesson, words })
    }

    /// Start a session over the lesson's words, shuffled per `config`.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::Quiz(QuizError::EmptyDeck)` when the lesson has no words.
    pub async fn start_session(
        &self,
        owner: UserId,
        lesson_id: LessonId,
        config: SessionConfig,
    ) -> Result<QuizSession, StudyError> {
        let deck = self.load_deck(owner, lesson_id).await?;
        let session = QuizSession::start(deck.words, config, self.clock.now(), &mut rand::rng())
            .inspect_err(|err| {
                if matches!(err, QuizError::EmptyDeck) {
                    tracing::warn!(lesson_id = %lesson_id, "cannot study an empty lesson");
                }
            })?;
        tracing::info!(
            lesson_id = %lesson_id,
            cards = session.total_cards(),
            shuffle = config.shuffle,
            "session started"
        );
        Ok(session)
    }

    /// A fresh study flow in the setup phase for the given lesson.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::LessonNotFound` for missing or foreign lessons.
    pub async fn study_flow(
        &self,
        owner: UserId,
        lesson_id: LessonId,
    ) -> Result<StudyFlow, StudyError> {
        let deck = self.load_deck(owner, lesson_id).await?;
        Ok(StudyFlow::new(deck.lesson.title(), deck.words))
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }
}
