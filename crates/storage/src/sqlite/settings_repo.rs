use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kotoba_core::model::{AppSetting, UserId};

use super::SqliteRepository;
use super::mapping::{conn, map_setting_row, user_id_to_text};
use crate::repository::{AppSettingsRepository, StorageError};

#[async_trait]
impl AppSettingsRepository for SqliteRepository {
    async fn list_flags(&self) -> Result<Vec<AppSetting>, StorageError> {
        let rows = sqlx::query(
            "SELECT key, value, updated_at, updated_by FROM app_settings ORDER BY key ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_setting_row).collect()
    }

    async fn update_flag(
        &self,
        key: &str,
        value: bool,
        updated_by: UserId,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<AppSetting>, StorageError> {
        let row = sqlx::query(
            r"
            UPDATE app_settings
            SET value = ?1, updated_at = ?2, updated_by = ?3
            WHERE key = ?4
            RETURNING key, value, updated_at, updated_by
            ",
        )
        .bind(i64::from(value))
        .bind(updated_at)
        .bind(user_id_to_text(updated_by))
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_setting_row).transpose()
    }

    async fn insert_flag(&self, setting: &AppSetting) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO app_settings (key, value, updated_at, updated_by)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at,
                updated_by = excluded.updated_by
            ",
        )
        .bind(&setting.key)
        .bind(i64::from(setting.value))
        .bind(setting.updated_at)
        .bind(setting.updated_by.map(user_id_to_text))
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn is_admin(&self, user: UserId) -> Result<bool, StorageError> {
        let row = sqlx::query("SELECT 1 FROM admin_users WHERE user_id = ?1")
            .bind(user_id_to_text(user))
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;
        Ok(row.is_some())
    }

    async fn grant_admin(&self, user: UserId) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO admin_users (user_id, created_at)
            VALUES (?1, ?2)
            ON CONFLICT(user_id) DO NOTHING
            ",
        )
        .bind(user_id_to_text(user))
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }
}
