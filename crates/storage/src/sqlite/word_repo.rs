use async_trait::async_trait;
use kotoba_core::model::{LessonId, WordId, WordPair};

use super::SqliteRepository;
use super::mapping::{conn, lesson_key, map_word_row, ser, word_id_from_i64, word_key};
use crate::repository::{NewWordRecord, StorageError, WordRepository};

const WORD_COLUMNS: &str =
    "id, lesson_id, japanese, ukrainian, furigana, pronunciation, created_at, updated_at";

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_foreign_key_violation())
}

#[async_trait]
impl WordRepository for SqliteRepository {
    async fn insert_new_word(&self, word: NewWordRecord) -> Result<WordId, StorageError> {
        let Some(lesson_id) = lesson_key(word.lesson_id) else {
            return Err(StorageError::NotFound);
        };
        let res = sqlx::query(
            r"
            INSERT INTO words
                (lesson_id, japanese, ukrainian, furigana, pronunciation, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            ",
        )
        .bind(lesson_id)
        .bind(word.japanese)
        .bind(word.ukrainian)
        .bind(word.furigana)
        .bind(word.pronunciation)
        .bind(word.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                StorageError::NotFound
            } else {
                conn(e)
            }
        })?;

        word_id_from_i64(res.last_insert_rowid())
    }

    async fn update_word(&self, word: &WordPair) -> Result<(), StorageError> {
        let (Some(id), Some(lesson_id)) = (word_key(word.id()), lesson_key(word.lesson_id())) else {
            return Err(StorageError::NotFound);
        };
        let res = sqlx::query(
            r"
            UPDATE words
            SET japanese = ?1, ukrainian = ?2, furigana = ?3, pronunciation = ?4, updated_at = ?5
            WHERE id = ?6 AND lesson_id = ?7
            ",
        )
        .bind(word.japanese())
        .bind(word.ukrainian())
        .bind(word.furigana())
        .bind(word.pronunciation())
        .bind(word.updated_at())
        .bind(id)
        .bind(lesson_id)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn get_word(
        &self,
        lesson_id: LessonId,
        id: WordId,
    ) -> Result<Option<WordPair>, StorageError> {
        let (Some(id), Some(lesson_id)) = (word_key(id), lesson_key(lesson_id)) else {
            return Ok(None);
        };
        let row = sqlx::query(&format!(
            "SELECT {WORD_COLUMNS} FROM words WHERE id = ?1 AND lesson_id = ?2"
        ))
        .bind(id)
        .bind(lesson_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_word_row).transpose()
    }

    async fn list_words(&self, lesson_id: LessonId) -> Result<Vec<WordPair>, StorageError> {
        let Some(lesson_id) = lesson_key(lesson_id) else {
            return Ok(Vec::new());
        };
        let rows = sqlx::query(&format!(
            "SELECT {WORD_COLUMNS} FROM words WHERE lesson_id = ?1 ORDER BY created_at ASC, id ASC"
        ))
        .bind(lesson_id)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_word_row).collect()
    }

    async fn count_words(&self, lesson_id: LessonId) -> Result<u32, StorageError> {
        let Some(lesson_id) = lesson_key(lesson_id) else {
            return Ok(0);
        };
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM words WHERE lesson_id = ?1")
            .bind(lesson_id)
            .fetch_one(&self.pool)
            .await
            .map_err(conn)?;

        u32::try_from(count).map_err(ser)
    }

    async fn delete_word(&self, lesson_id: LessonId, id: WordId) -> Result<bool, StorageError> {
        let (Some(id), Some(lesson_id)) = (word_key(id), lesson_key(lesson_id)) else {
            return Ok(false);
        };
        let res = sqlx::query("DELETE FROM words WHERE id = ?1 AND lesson_id = ?2")
            .bind(id)
            .bind(lesson_id)
            .execute(&self.pool)
            .await
            .map_err(conn)?;

        Ok(res.rows_affected() > 0)
    }
}
