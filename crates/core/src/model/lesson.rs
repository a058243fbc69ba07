use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::{LessonId, UserId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LessonError {
    #[error("lesson title cannot be empty")]
    EmptyTitle,

    #[error("unknown language: {0}")]
    UnknownLanguage(String),

    #[error("updated_at is before created_at")]
    InvalidTimeRange,
}

//
// ─── LANGUAGE ──────────────────────────────────────────────────────────────────
//

/// One side of a lesson's language pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Japanese,
    Ukrainian,
}

impl Language {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Japanese => "japanese",
            Language::Ukrainian => "ukrainian",
        }
    }

    /// Native-script label shown next to a card face.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Language::Japanese => "日本語",
            Language::Ukrainian => "Українська",
        }
    }

    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Language::Japanese => Language::Ukrainian,
            Language::Ukrainian => Language::Japanese,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = LessonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "japanese" => Ok(Language::Japanese),
            "ukrainian" => Ok(Language::Ukrainian),
            other => Err(LessonError::UnknownLanguage(other.to_owned())),
        }
    }
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// User-provided lesson fields, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_from")]
    pub language_from: Language,
    #[serde(default = "default_to")]
    pub language_to: Language,
}

fn default_from() -> Language {
    Language::Japanese
}

fn default_to() -> Language {
    Language::Ukrainian
}

impl LessonDraft {
    /// A Japanese → Ukrainian lesson with the given title.
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            language_from: default_from(),
            language_to: default_to(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Validate the draft into a lesson owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::EmptyTitle` if the title is empty or whitespace-only.
    pub fn validate(
        self,
        id: LessonId,
        owner: UserId,
        now: DateTime<Utc>,
    ) -> Result<Lesson, LessonError> {
        Lesson::new(
            id,
            owner,
            self.title,
            self.description,
            self.language_from,
            self.language_to,
            now,
        )
    }
}

//
// ─── LESSON ────────────────────────────────────────────────────────────────────
//

/// A named, owned collection of word pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lesson {
    id: LessonId,
    owner: UserId,
    title: String,
    description: String,
    language_from: Language,
    language_to: Language,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Lesson {
    /// Creates a new Lesson.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::EmptyTitle` if title is empty or whitespace-only.
    pub fn new(
        id: LessonId,
        owner: UserId,
        title: impl Into<String>,
        description: impl Into<String>,
        language_from: Language,
        language_to: Language,
        created_at: DateTime<Utc>,
    ) -> Result<Self, LessonError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(LessonError::EmptyTitle);
        }

        Ok(Self {
            id,
            owner,
            title: title.trim().to_owned(),
            description: description.into().trim().to_owned(),
            language_from,
            language_to,
            created_at,
            updated_at: created_at,
        })
    }

    /// Rehydrate a lesson from storage.
    ///
    /// # Errors
    ///
    /// Returns `LessonError` if the stored title is empty or timestamps are inverted.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: LessonId,
        owner: UserId,
        title: String,
        description: String,
        language_from: Language,
        language_to: Language,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, LessonError> {
        if updated_at < created_at {
            return Err(LessonError::InvalidTimeRange);
        }
        let mut lesson = Self::new(
            id,
            owner,
            title,
            description,
            language_from,
            language_to,
            created_at,
        )?;
        lesson.updated_at = updated_at;
        Ok(lesson)
    }

    /// Apply an edit, keeping identity, owner and creation time.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::EmptyTitle` if the new title is blank.
    pub fn apply(&self, draft: LessonDraft, now: DateTime<Utc>) -> Result<Self, LessonError> {
        let mut updated = Self::new(
            self.id,
            self.owner,
            draft.title,
            draft.description,
            draft.language_from,
            draft.language_to,
            self.created_at,
        )?;
        updated.updated_at = now.max(self.created_at);
        Ok(updated)
    }

    /// Same lesson under a storage-assigned id.
    #[must_use]
    pub fn with_id(mut self, id: LessonId) -> Self {
        self.id = id;
        self
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> LessonId {
        self.id
    }

    #[must_use]
    pub fn owner(&self) -> UserId {
        self.owner
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn language_from(&self) -> Language {
        self.language_from
    }

    #[must_use]
    pub fn language_to(&self) -> Language {
        self.language_to
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn lesson_rejects_blank_title() {
        let err = LessonDraft::titled("   ")
            .validate(LessonId::new(1), UserId::random(), fixed_now())
            .unwrap_err();
        assert_eq!(err, LessonError::EmptyTitle);
    }

    #[test]
    fn lesson_trims_title_and_description() {
        let lesson = LessonDraft::titled("  Привітання  ")
            .with_description("  greetings  ")
            .validate(LessonId::new(1), UserId::random(), fixed_now())
            .unwrap();
        assert_eq!(lesson.title(), "Привітання");
        assert_eq!(lesson.description(), "greetings");
        assert_eq!(lesson.language_from(), Language::Japanese);
        assert_eq!(lesson.language_to(), Language::Ukrainian);
        assert_eq!(lesson.created_at(), lesson.updated_at());
    }

    #[test]
    fn apply_keeps_identity_and_bumps_updated_at() {
        let owner = UserId::random();
        let lesson = LessonDraft::titled("Verbs")
            .validate(LessonId::new(4), owner, fixed_now())
            .unwrap();
        let later = fixed_now() + chrono::Duration::hours(1);
        let draft = LessonDraft {
            title: "Verbs 2".into(),
            description: String::new(),
            language_from: Language::Ukrainian,
            language_to: Language::Japanese,
        };
        let updated = lesson.apply(draft, later).unwrap();
        assert_eq!(updated.id(), LessonId::new(4));
        assert_eq!(updated.owner(), owner);
        assert_eq!(updated.title(), "Verbs 2");
        assert_eq!(updated.language_from(), Language::Ukrainian);
        assert_eq!(updated.created_at(), fixed_now());
        assert_eq!(updated.updated_at(), later);
    }

    #[test]
    fn language_parses_case_insensitively() {
        assert_eq!("Japanese".parse::<Language>().unwrap(), Language::Japanese);
        assert!(matches!(
            "klingon".parse::<Language>(),
            Err(LessonError::UnknownLanguage(_))
        ));
        assert_eq!(Language::Japanese.other(), Language::Ukrainian);
    }

    #[test]
    fn persisted_lesson_rejects_inverted_timestamps() {
        let err = Lesson::from_persisted(
            LessonId::new(1),
            UserId::random(),
            "T".into(),
            String::new(),
            Language::Japanese,
            Language::Ukrainian,
            fixed_now(),
            fixed_now() - chrono::Duration::seconds(1),
        )
        .unwrap_err();
        assert_eq!(err, LessonError::InvalidTimeRange);
    }
}
