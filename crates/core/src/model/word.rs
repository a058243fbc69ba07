use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{LessonId, WordId};
use crate::model::lesson::Language;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WordError {
    #[error("japanese term cannot be empty")]
    EmptyJapanese,

    #[error("ukrainian term cannot be empty")]
    EmptyUkrainian,

    #[error("updated_at is before created_at")]
    InvalidTimeRange,
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// User-provided word fields, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordDraft {
    pub japanese: String,
    pub ukrainian: String,
    #[serde(default)]
    pub furigana: Option<String>,
    #[serde(default)]
    pub pronunciation: Option<String>,
}

impl WordDraft {
    #[must_use]
    pub fn pair(japanese: impl Into<String>, ukrainian: impl Into<String>) -> Self {
        Self {
            japanese: japanese.into(),
            ukrainian: ukrainian.into(),
            furigana: None,
            pronunciation: None,
        }
    }

    #[must_use]
    pub fn with_furigana(mut self, furigana: impl Into<String>) -> Self {
        self.furigana = Some(furigana.into());
        self
    }

    #[must_use]
    pub fn with_pronunciation(mut self, pronunciation: impl Into<String>) -> Self {
        self.pronunciation = Some(pronunciation.into());
        self
    }

    /// Validate the draft into a word belonging to `lesson_id`.
    ///
    /// # Errors
    ///
    /// Returns `WordError::EmptyJapanese` / `WordError::EmptyUkrainian` when a term is blank.
    pub fn validate(
        self,
        id: WordId,
        lesson_id: LessonId,
        now: DateTime<Utc>,
    ) -> Result<WordPair, WordError> {
        let japanese = required(self.japanese, WordError::EmptyJapanese)?;
        let ukrainian = required(self.ukrainian, WordError::EmptyUkrainian)?;

        Ok(WordPair {
            id,
            lesson_id,
            japanese,
            ukrainian,
            furigana: optional(self.furigana),
            pronunciation: optional(self.pronunciation),
            created_at: now,
            updated_at: now,
        })
    }
}

fn required(value: String, err: WordError) -> Result<String, WordError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(err);
    }
    Ok(trimmed.to_owned())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

//
// ─── WORD PAIR ─────────────────────────────────────────────────────────────────
//

/// One vocabulary entry: a Japanese term, its Ukrainian counterpart, and
/// optional reading aids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordPair {
    id: WordId,
    lesson_id: LessonId,
    japanese: String,
    ukrainian: String,
    furigana: Option<String>,
    pronunciation: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl WordPair {
    /// Rehydrate a word from storage.
    ///
    /// # Errors
    ///
    /// Returns `WordError` if a stored term is blank or timestamps are inverted.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: WordId,
        lesson_id: LessonId,
        japanese: String,
        ukrainian: String,
        furigana: Option<String>,
        pronunciation: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, WordError> {
        if updated_at < created_at {
            return Err(WordError::InvalidTimeRange);
        }
        let mut word = WordDraft {
            japanese,
            ukrainian,
            furigana,
            pronunciation,
        }
        .validate(id, lesson_id, created_at)?;
        word.updated_at = updated_at;
        Ok(word)
    }

    /// Apply an edit, keeping identity, lesson and creation time.
    ///
    /// # Errors
    ///
    /// Returns `WordError` when a term in the draft is blank.
    pub fn apply(&self, draft: WordDraft, now: DateTime<Utc>) -> Result<Self, WordError> {
        let mut updated = draft.validate(self.id, self.lesson_id, self.created_at)?;
        updated.updated_at = now.max(self.created_at);
        Ok(updated)
    }

    /// Same word under a storage-assigned id.
    #[must_use]
    pub fn with_id(mut self, id: WordId) -> Self {
        self.id = id;
        self
    }

    #[must_use]
    pub fn id(&self) -> WordId {
        self.id
    }

    #[must_use]
    pub fn lesson_id(&self) -> LessonId {
        self.lesson_id
    }

    #[must_use]
    pub fn japanese(&self) -> &str {
        &self.japanese
    }

    #[must_use]
    pub fn ukrainian(&self) -> &str {
        &self.ukrainian
    }

    #[must_use]
    pub fn furigana(&self) -> Option<&str> {
        self.furigana.as_deref()
    }

    #[must_use]
    pub fn pronunciation(&self) -> Option<&str> {
        self.pronunciation.as_deref()
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// The term written in `language`.
    #[must_use]
    pub fn term(&self, language: Language) -> &str {
        match language {
            Language::Japanese => &self.japanese,
            Language::Ukrainian => &self.ukrainian,
        }
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
    fn word_requires_both_terms() {
        let err = WordDraft::pair("  ", "вечір")
            .validate(WordId::new(1), LessonId::new(1), fixed_now())
            .unwrap_err();
        assert_eq!(err, WordError::EmptyJapanese);

        let err = WordDraft::pair("こんばんは", "")
            .validate(WordId::new(1), LessonId::new(1), fixed_now())
            .unwrap_err();
        assert_eq!(err, WordError::EmptyUkrainian);
    }

    #[test]
    fn blank_reading_aids_become_none() {
        let word = WordDraft::pair(" 犬 ", " собака ")
            .with_furigana("  ")
            .with_pronunciation(" inu ")
            .validate(WordId::new(2), LessonId::new(1), fixed_now())
            .unwrap();
        assert_eq!(word.japanese(), "犬");
        assert_eq!(word.ukrainian(), "собака");
        assert_eq!(word.furigana(), None);
        assert_eq!(word.pronunciation(), Some("inu"));
    }

    #[test]
    fn term_follows_language() {
        let word = WordDraft::pair("猫", "кіт")
            .validate(WordId::new(3), LessonId::new(1), fixed_now())
            .unwrap();
        assert_eq!(word.term(Language::Japanese), "猫");
        assert_eq!(word.term(Language::Ukrainian), "кіт");
    }

    #[test]
    fn apply_keeps_created_at() {
        let word = WordDraft::pair("猫", "кіт")
            .validate(WordId::new(3), LessonId::new(9), fixed_now())
            .unwrap();
        let later = fixed_now() + chrono::Duration::minutes(5);
        let edited = word
            .apply(WordDraft::pair("ねこ", "кішка").with_furigana("ねこ"), later)
            .unwrap();
        assert_eq!(edited.id(), WordId::new(3));
        assert_eq!(edited.lesson_id(), LessonId::new(9));
        assert_eq!(edited.japanese(), "ねこ");
        assert_eq!(edited.created_at(), fixed_now());
        assert_eq!(edited.updated_at(), later);
    }
}
