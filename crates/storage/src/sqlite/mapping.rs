use chrono::{DateTime, Utc};
use kotoba_core::model::{AppSetting, Language, Lesson, LessonId, UserId, WordId, WordPair};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn lesson_id_from_i64(v: i64) -> Result<LessonId, StorageError> {
    Ok(LessonId::new(i64_to_u64("lesson_id", v)?))
}

pub(crate) fn word_id_from_i64(v: i64) -> Result<WordId, StorageError> {
    Ok(WordId::new(i64_to_u64("word_id", v)?))
}

/// Row key for a lesson id. Ids past `i64::MAX` can never have been stored.
pub(crate) fn lesson_key(id: LessonId) -> Option<i64> {
    i64::try_from(id.value()).ok()
}

pub(crate) fn word_key(id: WordId) -> Option<i64> {
    i64::try_from(id.value()).ok()
}

/// User ids are stored as hyphenated lowercase UUID text.
pub(crate) fn user_id_to_text(id: UserId) -> String {
    id.value().hyphenated().to_string()
}

pub(crate) fn user_id_from_text(s: &str) -> Result<UserId, StorageError> {
    s.parse::<UserId>().map_err(ser)
}

pub(crate) fn parse_language(s: &str) -> Result<Language, StorageError> {
    s.parse::<Language>().map_err(ser)
}

pub(crate) fn map_lesson_row(row: &SqliteRow) -> Result<Lesson, StorageError> {
    let owner: String = row.try_get("user_id").map_err(ser)?;
    let from: String = row.try_get("language_from").map_err(ser)?;
    let to: String = row.try_get("language_to").map_err(ser)?;

    Lesson::from_persisted(
        lesson_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        user_id_from_text(&owner)?,
        row.try_get::<String, _>("title").map_err(ser)?,
        row.try_get::<String, _>("description").map_err(ser)?,
        parse_language(&from)?,
        parse_language(&to)?,
        row.try_get("created_at").map_err(ser)?,
        row.try_get("updated_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_word_row(row: &SqliteRow) -> Result<WordPair, StorageError> {
    WordPair::from_persisted(
        word_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        lesson_id_from_i64(row.try_get::<i64, _>("lesson_id").map_err(ser)?)?,
        row.try_get::<String, _>("japanese").map_err(ser)?,
        row.try_get::<String, _>("ukrainian").map_err(ser)?,
        row.try_get::<Option<String>, _>("furigana").map_err(ser)?,
        row.try_get::<Option<String>, _>("pronunciation").map_err(ser)?,
        row.try_get("created_at").map_err(ser)?,
        row.try_get("updated_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_setting_row(row: &SqliteRow) -> Result<AppSetting, StorageError> {
    let mut setting = AppSetting::new(
        row.try_get::<String, _>("key").map_err(ser)?,
        row.try_get::<i64, _>("value").map_err(ser)? != 0,
    )
    .map_err(ser)?;
    setting.updated_at = row
        .try_get::<Option<DateTime<Utc>>, _>("updated_at")
        .map_err(ser)?;
    setting.updated_by = row
        .try_get::<Option<String>, _>("updated_by")
        .map_err(ser)?
        .as_deref()
        .map(user_id_from_text)
        .transpose()?;
    Ok(setting)
}
