use async_trait::async_trait;
use kotoba_core::model::{Lesson, LessonId, UserId};

use super::SqliteRepository;
use super::mapping::{
    conn, lesson_id_from_i64, lesson_key, map_lesson_row, user_id_from_text, user_id_to_text,
};
use crate::repository::{LessonRepository, NewLessonRecord, StorageError};

const LESSON_COLUMNS: &str =
    "id, user_id, title, description, language_from, language_to, created_at, updated_at";

#[async_trait]
impl LessonRepository for SqliteRepository {
    async fn insert_new_lesson(&self, lesson: NewLessonRecord) -> Result<LessonId, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO lessons
                (user_id, title, description, language_from, language_to, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            ",
        )
        .bind(user_id_to_text(lesson.owner))
        .bind(lesson.title)
        .bind(lesson.description)
        .bind(lesson.language_from.as_str())
        .bind(lesson.language_to.as_str())
        .bind(lesson.created_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        lesson_id_from_i64(res.last_insert_rowid())
    }

    async fn update_lesson(&self, lesson: &Lesson) -> Result<(), StorageError> {
        let Some(id) = lesson_key(lesson.id()) else {
            return Err(StorageError::NotFound);
        };
        let res = sqlx::query(
            r"
            UPDATE lessons
            SET title = ?1, description = ?2, language_from = ?3, language_to = ?4, updated_at = ?5
            WHERE id = ?6 AND user_id = ?7
            ",
        )
        .bind(lesson.title())
        .bind(lesson.description())
        .bind(lesson.language_from().as_str())
        .bind(lesson.language_to().as_str())
        .bind(lesson.updated_at())
        .bind(id)
        .bind(user_id_to_text(lesson.owner()))
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn get_lesson(
        &self,
        owner: UserId,
        id: LessonId,
    ) -> Result<Option<Lesson>, StorageError> {
        let Some(id) = lesson_key(id) else {
            return Ok(None);
        };
        let row = sqlx::query(&format!(
            "SELECT {LESSON_COLUMNS} FROM lessons WHERE id = ?1 AND user_id = ?2"
        ))
        .bind(id)
        .bind(user_id_to_text(owner))
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_lesson_row).transpose()
    }

    async fn list_lessons(&self, owner: UserId) -> Result<Vec<Lesson>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {LESSON_COLUMNS} FROM lessons WHERE user_id = ?1 \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id_to_text(owner))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_lesson_row).collect()
    }

    async fn find_lesson_by_title(&self, title: &str) -> Result<Option<Lesson>, StorageError> {
        // SQLite's lower() only folds ASCII, so Cyrillic titles are compared here.
        let wanted = title.trim().to_lowercase();
        let rows = sqlx::query(&format!(
            "SELECT {LESSON_COLUMNS} FROM lessons ORDER BY id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        for row in &rows {
            let lesson = map_lesson_row(row)?;
            if lesson.title().to_lowercase() == wanted {
                return Ok(Some(lesson));
            }
        }
        Ok(None)
    }

    async fn any_lesson_owner(&self) -> Result<Option<UserId>, StorageError> {
        let owner: Option<String> =
            sqlx::query_scalar("SELECT user_id FROM lessons ORDER BY id ASC LIMIT 1")
                .fetch_optional(&self.pool)
                .await
                .map_err(conn)?;

        owner.as_deref().map(user_id_from_text).transpose()
    }

    async fn delete_lesson(&self, owner: UserId, id: LessonId) -> Result<bool, StorageError> {
        let Some(id) = lesson_key(id) else {
            return Ok(false);
        };
        let mut tx = self.pool.begin().await.map_err(conn)?;

        let owned = sqlx::query("SELECT 1 FROM lessons WHERE id = ?1 AND user_id = ?2")
            .bind(id)
            .bind(user_id_to_text(owner))
            .fetch_optional(&mut *tx)
            .await
            .map_err(conn)?;
        if owned.is_none() {
            return Ok(false);
        }

        sqlx::query("DELETE FROM words WHERE lesson_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        sqlx::query("DELETE FROM lessons WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        tx.commit().await.map_err(conn)?;
        Ok(true)
    }
}
