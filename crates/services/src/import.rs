//! Bulk word import: CSV files and "japanese - ukrainian" pairs.

use std::sync::Arc;

use kotoba_core::model::{Language, Lesson, LessonDraft, LessonId, UserId, WordDraft, WordId};
use storage::repository::{LessonRepository, NewLessonRecord, NewWordRecord, WordRepository};

use crate::Clock;
use crate::error::ImportError;

pub const IMPORTED_DESCRIPTION: &str = "Imported from CSV";

/// Parse CSV content into word drafts.
///
/// The first non-blank line is a header and is skipped. Each line uses a tab
/// delimiter if it contains one, otherwise a comma. Fields are trimmed and a
/// surrounding pair of double quotes is removed. Lines with fewer than two
/// fields are dropped; extra fields are ignored.
#[must_use]
pub fn parse_csv(content: &str) -> Vec<WordDraft> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .skip(1)
        .filter_map(parse_csv_line)
        .collect()
}

fn parse_csv_line(line: &str) -> Option<WordDraft> {
    let delimiter = if line.contains('\t') { '\t' } else { ',' };
    let mut fields = line.split(delimiter).map(clean_field);
    let japanese = fields.next()?;
    let ukrainian = fields.next()?;
    Some(WordDraft::pair(japanese, ukrainian))
}

fn clean_field(raw: &str) -> String {
    let trimmed = raw.trim();
    let unquoted = trimmed.strip_prefix('"').unwrap_or(trimmed);
    let unquoted = unquoted.strip_suffix('"').unwrap_or(unquoted);
    unquoted.to_owned()
}

/// Parse `"japanese - ukrainian"`, splitting on the first `-`.
///
/// # Errors
///
/// Returns `ImportError::InvalidPair` when there is no `-` or either side is blank.
pub fn parse_pair(raw: &str) -> Result<WordDraft, ImportError> {
    let invalid = || ImportError::InvalidPair(raw.to_owned());
    let (japanese, ukrainian) = raw.split_once('-').ok_or_else(invalid)?;
    let (japanese, ukrainian) = (japanese.trim(), ukrainian.trim());
    if japanese.is_empty() || ukrainian.is_empty() {
        return Err(invalid());
    }
    Ok(WordDraft::pair(japanese, ukrainian))
}

/// A word that could not be stored, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedWord {
    pub japanese: String,
    pub reason: String,
}

/// Outcome of one import run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub lesson_id: LessonId,
    pub lesson_title: String,
    pub lesson_created: bool,
    pub added: usize,
    pub failed: Vec<FailedWord>,
}

impl ImportReport {
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.added + self.failed.len()
    }
}

/// Feeds parsed words into a lesson looked up by title.
#[derive(Clone)]
pub struct ImportService {
    clock: Clock,
    lessons: Arc<dyn LessonRepository>,
    words: Arc<dyn WordRepository>,
}

impl ImportService {
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

    /// Import into the lesson titled `title`, creating it when missing.
    ///
    /// A new lesson goes to `owner`, or failing that to the owner of any
    /// existing lesson.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::NoOwner` when a lesson must be created and no owner
    /// can be determined, `Lesson` if the title is blank, or `Storage`.
    pub async fn import_words(
        &self,
        title: &str,
        words: Vec<WordDraft>,
        owner: Option<UserId>,
    ) -> Result<ImportReport, ImportError> {
        let (lesson, created) = match self.lessons.find_lesson_by_title(title).await? {
            Some(lesson) => (lesson, false),
            None => (self.create_lesson(title, owner).await?, true),
        };
        Ok(self.insert_all(lesson, created, words).await)
    }

    /// Add words to an existing lesson.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::LessonNotFound` if no lesson has that title.
    pub async fn add_words(
        &self,
        title: &str,
        words: Vec<WordDraft>,
    ) -> Result<ImportReport, ImportError> {
        let lesson = self
            .lessons
            .find_lesson_by_title(title)
            .await?
            .ok_or_else(|| ImportError::LessonNotFound(title.to_owned()))?;
        Ok(self.insert_all(lesson, false, words).await)
    }

    async fn create_lesson(
        &self,
        title: &str,
        owner: Option<UserId>,
    ) -> Result<Lesson, ImportError> {
        let owner = match owner {
            Some(owner) => owner,
            None => self
                .lessons
                .any_lesson_owner()
                .await?
                .ok_or(ImportError::NoOwner)?,
        };
        let mut draft = LessonDraft::titled(title).with_description(IMPORTED_DESCRIPTION);
        draft.language_from = Language::Japanese;
        draft.language_to = Language::Ukrainian;

        let lesson = draft.validate(LessonId::new(0), owner, self.clock.now())?;
        let id = self
            .lessons
            .insert_new_lesson(NewLessonRecord::from_lesson(&lesson))
            .await?;
        tracing::info!(lesson_id = %id, %owner, title, "created lesson for import");
        Ok(lesson.with_id(id))
    }

    async fn insert_all(
        &self,
        lesson: Lesson,
        created: bool,
        words: Vec<WordDraft>,
    ) -> ImportReport {
        let mut report = ImportReport {
            lesson_id: lesson.id(),
            lesson_title: lesson.title().to_owned(),
            lesson_created: created,
            added: 0,
            failed: Vec::new(),
        };

        for draft in words {
            let japanese = draft.japanese.clone();
            match self.insert_one(lesson.id(), draft).await {
                Ok(word_id) => {
                    tracing::debug!(
                        lesson_id = %lesson.id(),
                        %word_id,
                        japanese = %japanese,
                        "word imported"
                    );
                    report.added += 1;
                }
                Err(reason) => {
                    tracing::warn!(
                        lesson_id = %lesson.id(),
                        japanese = %japanese,
                        %reason,
                        "word skipped"
                    );
                    report.failed.push(FailedWord { japanese, reason });
                }
            }
        }

        tracing::info!(
            lesson_id = %report.lesson_id,
            added = report.added,
            failed = report.failed.len(),
            "import finished"
        );
        report
    }

    async fn insert_one(&self, lesson_id: LessonId, draft: WordDraft) -> Result<WordId, String> {
        let word = draft
            .validate(WordId::new(0), lesson_id, self.clock.now())
            .map_err(|e| e.to_string())?;
        self.words
            .insert_new_word(NewWordRecord::from_word(&word))
            .await
            .map_err(|e| e.to_string())
    }
}
