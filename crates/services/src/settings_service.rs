use std::sync::Arc;

use kotoba_core::model::{AppSetting, AppSettings, UserId, normalize_key};
use storage::repository::AppSettingsRepository;

use crate::Clock;
use crate::error::SettingsServiceError;

/// Public feature flags, writable by admins only.
#[derive(Clone)]
pub struct SettingsService {
    clock: Clock,
    repo: Arc<dyn AppSettingsRepository>,
}

impl SettingsService {
    #[must_use]
    pub fn new(clock: Clock, repo: Arc<dyn AppSettingsRepository>) -> Self {
        Self { clock, repo }
    }

    /// Load the flag map. No authentication needed.
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError::Storage` on storage failures.
    pub async fn load(&self) -> Result<AppSettings, SettingsServiceError> {
        let flags = self.repo.list_flags().await?;
        Ok(flags.into_iter().collect())
    }

    /// Set an existing flag, stamping who changed it and when.
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError::Forbidden` for non-admins,
    /// `Setting` for a blank key, `UnknownKey` when the flag does not exist,
    /// or `Storage`.
    pub async fn update(
        &self,
        user: UserId,
        key: String,
        value: bool,
    ) -> Result<AppSetting, SettingsServiceError> {
        if !self.repo.is_admin(user).await? {
            tracing::warn!(%user, "settings update refused for non-admin");
            return Err(SettingsServiceError::Forbidden);
        }
        let key = normalize_key(key)?;
        let updated = self
            .repo
            .update_flag(&key, value, user, self.clock.now())
            .await?
            .ok_or_else(|| SettingsServiceError::UnknownKey(key.clone()))?;
        tracing::info!(%user, key = %key, value, "setting updated");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use kotoba_core::time::fixed_now;
    use storage::repository::InMemoryRepository;

    async fn seeded() -> (SettingsService, InMemoryRepository) {
        let repo = InMemoryRepository::new();
        repo.insert_flag(&AppSetting::new("registration_open", true).unwrap())
            .await
            .unwrap();
        let svc = SettingsService::new(Clock::fixed(fixed_now()), Arc::new(repo.clone()));
        (svc, repo)
    }

    #[tokio::test]
    async fn anyone_can_load_flags() {
        let (svc, _) = seeded().await;
        let settings = svc.load().await.unwrap();
        assert!(settings.is_enabled("registration_open"));
    }

    #[tokio::test]
    async fn non_admin_is_forbidden() {
        let (svc, _) = seeded().await;
        let err = svc
            .update(UserId::random(), "registration_open".into(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, SettingsServiceError::Forbidden));
        assert!(svc.load().await.unwrap().is_enabled("registration_open"));
    }

    #[tokio::test]
    async fn admin_updates_known_flag() {
        let (svc, repo) = seeded().await;
        let admin = UserId::random();
        repo.grant_admin(admin).await.unwrap();

        let updated = svc
            .update(admin, " registration_open ".into(), false)
            .await
            .unwrap();
        assert!(!updated.value);
        assert_eq!(updated.updated_by, Some(admin));
        assert_eq!(updated.updated_at, Some(fixed_now()));

        assert!(matches!(
            svc.update(admin, "nope".into(), true).await,
            Err(SettingsServiceError::UnknownKey(_))
        ));
        assert!(matches!(
            svc.update(admin, "  ".into(), true).await,
            Err(SettingsServiceError::Setting(_))
        ));
    }
}
