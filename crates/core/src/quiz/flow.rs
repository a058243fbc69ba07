use chrono::{DateTime, Utc};
use rand::Rng;
use thiserror::Error;

use crate::model::WordPair;
use crate::quiz::config::SessionConfig;
use crate::quiz::session::{Progress, QuizError, QuizSession};
use crate::quiz::summary::SessionSummary;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FlowError {
    #[error("`{action}` is not available during {phase}")]
    WrongPhase {
        action: &'static str,
        phase: &'static str,
    },

    #[error(transparent)]
    Quiz(#[from] QuizError),
}

/// Which side of the current card is visible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CardFace {
    #[default]
    Prompt,
    Answer,
}

#[derive(Debug, Clone)]
pub enum StudyPhase {
    Setup,
    Learning { session: QuizSession, face: CardFace },
    Results {
        session: QuizSession,
        summary: SessionSummary,
    },
}

impl StudyPhase {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            StudyPhase::Setup => "setup",
            StudyPhase::Learning { .. } => "learning",
            StudyPhase::Results { .. } => "results",
        }
    }
}

/// The current card as presented, oriented by the session direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView<'a> {
    pub face: CardFace,
    pub front: &'a str,
    pub back: &'a str,
    pub front_label: &'static str,
    pub back_label: &'static str,
    pub furigana: Option<&'a str>,
    pub pronunciation: Option<&'a str>,
}

/// Counters shown while learning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveProgress {
    /// One-based index of the card on screen.
    pub current: usize,
    pub total: usize,
    pub correct: usize,
    pub incorrect: usize,
}

impl LiveProgress {
    /// Fraction of the deck reached, in `(0, 1]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.current as f64 / self.total as f64
    }
}

/// Setup → Learning → Results, for one lesson's words.
#[derive(Debug, Clone)]
pub struct StudyFlow {
    lesson_title: String,
    words: Vec<WordPair>,
    phase: StudyPhase,
}

impl StudyFlow {
    #[must_use]
    pub fn new(lesson_title: impl Into<String>, words: Vec<WordPair>) -> Self {
        Self {
            lesson_title: lesson_title.into(),
            words,
            phase: StudyPhase::Setup,
        }
    }

    #[must_use]
    pub fn lesson_title(&self) -> &str {
        &self.lesson_title
    }

    #[must_use]
    pub fn words(&self) -> &[WordPair] {
        &self.words
    }

    #[must_use]
    pub fn phase(&self) -> &StudyPhase {
        &self.phase
    }

    /// Begin learning with the chosen options.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::WrongPhase` outside of setup and `FlowError::Quiz`
    /// when the lesson has no words. The flow stays in setup on error.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        config: SessionConfig,
        at: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<(), FlowError> {
        self.expect_phase("start", matches!(self.phase, StudyPhase::Setup))?;
        let session = QuizSession::start(self.words.clone(), config, at, rng)?;
        self.enter_learning(session);
        Ok(())
    }

    /// Toggle the visible side of the current card.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::WrongPhase` unless learning.
    pub fn flip(&mut self) -> Result<CardFace, FlowError> {
        match &mut self.phase {
            StudyPhase::Learning { face, .. } => {
                *face = match face {
                    CardFace::Prompt => CardFace::Answer,
                    CardFace::Answer => CardFace::Prompt,
                };
                Ok(*face)
            }
            other => Err(FlowError::WrongPhase {
                action: "flip",
                phase: other.name(),
            }),
        }
    }

    /// Record whether the current card was known and move on.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::WrongPhase` unless learning.
    pub fn answer(&mut self, correct: bool, at: DateTime<Utc>) -> Result<Progress, FlowError> {
        let (session, face) = match &mut self.phase {
            StudyPhase::Learning { session, face } => (session, face),
            other => {
                return Err(FlowError::WrongPhase {
                    action: "answer",
                    phase: other.name(),
                });
            }
        };

        let progress = session.record_outcome(correct, at)?;
        *face = CardFace::Prompt;

        if let Progress::Complete(summary) = &progress {
            let finished = session.clone();
            self.phase = StudyPhase::Results {
                session: finished,
                summary: summary.clone(),
            };
        }
        Ok(progress)
    }

    /// Run the same deck again.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::WrongPhase` unless on the results screen.
    pub fn retry<R: Rng + ?Sized>(
        &mut self,
        at: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<(), FlowError> {
        let StudyPhase::Results { session, .. } = &self.phase else {
            return Err(self.wrong_phase("retry"));
        };
        let next = session.retry(at, rng)?;
        self.enter_learning(next);
        Ok(())
    }

    /// Study only the cards missed in the last run.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::WrongPhase` unless on the results screen, and
    /// `FlowError::Quiz(QuizError::EmptyDeck)` when nothing was missed.
    pub fn repeat_incorrect(&mut self, at: DateTime<Utc>) -> Result<(), FlowError> {
        let StudyPhase::Results { session, .. } = &self.phase else {
            return Err(self.wrong_phase("repeat_incorrect"));
        };
        let next = session.repeat_incorrect(at)?;
        self.enter_learning(next);
        Ok(())
    }

    /// Abandon the current run or results and return to setup.
    pub fn back_to_setup(&mut self) {
        self.phase = StudyPhase::Setup;
    }

    #[must_use]
    pub fn session(&self) -> Option<&QuizSession> {
        match &self.phase {
            StudyPhase::Setup => None,
            StudyPhase::Learning { session, .. } | StudyPhase::Results { session, .. } => {
                Some(session)
            }
        }
    }

    #[must_use]
    pub fn summary(&self) -> Option<&SessionSummary> {
        match &self.phase {
            StudyPhase::Results { summary, .. } => Some(summary),
            _ => None,
        }
    }

    /// Whether "repeat incorrect" should be offered.
    #[must_use]
    pub fn has_incorrect(&self) -> bool {
        self.summary().is_some_and(|s| s.incorrect() > 0)
    }

    #[must_use]
    pub fn card(&self) -> Option<CardView<'_>> {
        let StudyPhase::Learning { session, face } = &self.phase else {
            return None;
        };
        let word = session.current()?;
        let direction = session.config().direction;
        let (prompt, answer) = (direction.prompt_language(), direction.answer_language());

        Some(CardView {
            face: *face,
            front: word.term(prompt),
            back: word.term(answer),
            front_label: prompt.label(),
            back_label: answer.label(),
            furigana: word.furigana(),
            pronunciation: word.pronunciation(),
        })
    }

    #[must_use]
    pub fn progress(&self) -> Option<LiveProgress> {
        let StudyPhase::Learning { session, .. } = &self.phase else {
            return None;
        };
        Some(LiveProgress {
            current: (session.position() + 1).min(session.total_cards()),
            total: session.total_cards(),
            correct: session.correct_count(),
            incorrect: session.incorrect_count(),
        })
    }

    fn enter_learning(&mut self, session: QuizSession) {
        self.phase = StudyPhase::Learning {
            session,
            face: CardFace::Prompt,
        };
    }

    fn expect_phase(&self, action: &'static str, ok: bool) -> Result<(), FlowError> {
        if ok { Ok(()) } else { Err(self.wrong_phase(action)) }
    }

    fn wrong_phase(&self, action: &'static str) -> FlowError {
        FlowError::WrongPhase {
            action,
            phase: self.phase.name(),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
