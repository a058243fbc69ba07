use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use thiserror::Error;

use crate::model::{WordId, WordPair};
use crate::quiz::config::SessionConfig;
use crate::quiz::summary::SessionSummary;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("cannot start a session with an empty deck")]
    EmptyDeck,

    #[error("word {0} appears more than once in the deck")]
    DuplicateWord(WordId),

    #[error("no current card: position {position} of {len}")]
    InvalidPosition { position: usize, len: usize },
}

//
// ─── PROGRESS ──────────────────────────────────────────────────────────────────
//

/// What happened after recording an outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    /// More cards remain; the session is still learning.
    Continue,
    /// The last card was answered.
    Complete(SessionSummary),
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory state of one quiz run over a fixed deck.
///
/// Invariants: the deck never changes length, `position <= deck.len()`, and
/// the outcome map only holds ids of cards already answered.
#[derive(Clone)]
pub struct QuizSession {
    deck: Vec<WordPair>,
    config: SessionConfig,
    position: usize,
    outcomes: HashMap<WordId, bool>,
    started_at: DateTime<Utc>,
}

impl QuizSession {
    /// Start a session over `deck`, shuffling it first when the config asks for it.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::EmptyDeck` for an empty deck and
    /// `QuizError::DuplicateWord` if an id occurs twice.
    pub fn start<R: Rng + ?Sized>(
        mut deck: Vec<WordPair>,
        config: SessionConfig,
        started_at: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<Self, QuizError> {
        if deck.is_empty() {
            return Err(QuizError::EmptyDeck);
        }

        let mut seen = HashSet::with_capacity(deck.len());
        for word in &deck {
            if !seen.insert(word.id()) {
                return Err(QuizError::DuplicateWord(word.id()));
            }
        }

        if config.shuffle {
            deck.shuffle(rng);
        }

        Ok(Self {
            deck,
            config,
            position: 0,
            outcomes: HashMap::new(),
            started_at,
        })
    }

    #[must_use]
    pub fn deck(&self) -> &[WordPair] {
        &self.deck
    }

    #[must_use]
    pub fn config(&self) -> SessionConfig {
        self.config
    }

    /// Zero-based index of the card being shown; equals the deck length once complete.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub fn outcomes(&self) -> &HashMap<WordId, bool> {
        &self.outcomes
    }

    #[must_use]
    pub fn outcome(&self, id: WordId) -> Option<bool> {
        self.outcomes.get(&id).copied()
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn total_cards(&self) -> usize {
        self.deck.len()
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.deck.len().saturating_sub(self.position)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.position >= self.deck.len()
    }

    #[must_use]
    pub fn current(&self) -> Option<&WordPair> {
        self.deck.get(self.position)
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.outcomes.values().filter(|&&ok| ok).count()
    }

    #[must_use]
    pub fn incorrect_count(&self) -> usize {
        self.outcomes.values().filter(|&&ok| !ok).count()
    }

    /// Record the outcome for the current card and advance.
    ///
    /// `at` becomes the completion time when this was the last card.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidPosition` if every card has already been answered.
    pub fn record_outcome(
        &mut self,
        correct: bool,
        at: DateTime<Utc>,
    ) -> Result<Progress, QuizError> {
        let Some(word) = self.deck.get(self.position) else {
            return Err(QuizError::InvalidPosition {
                position: self.position,
                len: self.deck.len(),
            });
        };

        self.outcomes.insert(word.id(), correct);
        self.position += 1;

        if self.is_complete() {
            Ok(Progress::Complete(self.summarize(at)))
        } else {
            Ok(Progress::Continue)
        }
    }

    /// Summarize the outcomes recorded so far.
    #[must_use]
    pub fn summarize(&self, completed_at: DateTime<Utc>) -> SessionSummary {
        SessionSummary::new(
            self.deck.len(),
            self.correct_count(),
            self.incorrect_count(),
            self.started_at,
            completed_at,
        )
    }

    /// Cards answered incorrectly, in deck order.
    #[must_use]
    pub fn incorrect_words(&self) -> Vec<WordPair> {
        incorrect_words(&self.deck, &self.outcomes)
    }

    /// Run the same deck again with the same configuration.
    ///
    /// # Errors
    ///
    /// Propagates `QuizSession::start` errors.
    pub fn retry<R: Rng + ?Sized>(
        &self,
        started_at: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<Self, QuizError> {
        Self::start(self.deck.clone(), self.config, started_at, rng)
    }

    /// Start over with only the missed cards, in their current order.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::EmptyDeck` when nothing was answered incorrectly.
    pub fn repeat_incorrect(&self, started_at: DateTime<Utc>) -> Result<Self, QuizError> {
        let missed = self.incorrect_words();
        // in-order configs never consult the rng
        Self::start(missed, self.config.in_order(), started_at, &mut rand::rng())
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("deck_len", &self.deck.len())
            .field("config", &self.config)
            .field("position", &self.position)
            .field("outcomes_len", &self.outcomes.len())
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}

/// Filters `deck` down to ids whose recorded outcome is `false`, keeping deck order.
#[must_use]
pub fn incorrect_words(deck: &[WordPair], outcomes: &HashMap<WordId, bool>) -> Vec<WordPair> {
    deck.iter()
        .filter(|word| outcomes.get(&word.id()) == Some(&false))
        .cloned()
        .collect()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
