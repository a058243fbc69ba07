use serde::{Deserialize, Serialize};

use crate::model::Language;

/// Which side of a word pair is shown first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// 日本語 → Українська
    #[default]
    JapaneseFirst,
    /// Українська → 日本語
    UkrainianFirst,
}

impl Direction {
    #[must_use]
    pub fn prompt_language(self) -> Language {
        match self {
            Direction::JapaneseFirst => Language::Japanese,
            Direction::UkrainianFirst => Language::Ukrainian,
        }
    }

    #[must_use]
    pub fn answer_language(self) -> Language {
        self.prompt_language().other()
    }
}

/// Options chosen on the setup screen. Fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub shuffle: bool,
}

impl SessionConfig {
    #[must_use]
    pub fn new(direction: Direction, shuffle: bool) -> Self {
        Self { direction, shuffle }
    }

    /// True when the Japanese term (language A of every pair) is the prompt.
    #[must_use]
    pub fn prompt_language_is_a(&self) -> bool {
        self.direction == Direction::JapaneseFirst
    }

    /// Same direction, original order.
    #[must_use]
    pub fn in_order(self) -> Self {
        Self {
            shuffle: false,
            ..self
        }
    }
}
