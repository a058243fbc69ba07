use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::model::ids::UserId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AppSettingError {
    #[error("setting key cannot be empty")]
    EmptyKey,
}

/// A single application-wide boolean flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppSetting {
    pub key: String,
    pub value: bool,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<UserId>,
}

impl AppSetting {
    /// # Errors
    ///
    /// Returns `AppSettingError::EmptyKey` when the key is blank.
    pub fn new(key: impl Into<String>, value: bool) -> Result<Self, AppSettingError> {
        let key = normalize_key(key.into())?;
        Ok(Self {
            key,
            value,
            updated_at: None,
            updated_by: None,
        })
    }
}

/// Trims a flag key and rejects blank keys.
///
/// # Errors
///
/// Returns `AppSettingError::EmptyKey` when the key is blank.
pub fn normalize_key(key: String) -> Result<String, AppSettingError> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Err(AppSettingError::EmptyKey);
    }
    Ok(trimmed.to_owned())
}

/// Flag map as served to clients: `{ "key": bool, ... }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AppSettings(BTreeMap<String, bool>);

impl AppSettings {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<bool> {
        self.0.get(key).copied()
    }

    /// True only when the flag exists and is set.
    #[must_use]
    pub fn is_enabled(&self, key: &str) -> bool {
        self.get(key).unwrap_or(false)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<AppSetting> for AppSettings {
    fn from_iter<I: IntoIterator<Item = AppSetting>>(iter: I) -> Self {
        Self(iter.into_iter().map(|s| (s.key, s.value)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_key_is_rejected() {
        assert_eq!(
            AppSetting::new("  ", true).unwrap_err(),
            AppSettingError::EmptyKey
        );
    }

    #[test]
    fn settings_collect_into_flag_map() {
        let settings: AppSettings = vec![
            AppSetting::new("registration_open", true).unwrap(),
            AppSetting::new("maintenance", false).unwrap(),
        ]
        .into_iter()
        .collect();

        assert_eq!(settings.len(), 2);
        assert!(settings.is_enabled("registration_open"));
        assert!(!settings.is_enabled("maintenance"));
        assert!(!settings.is_enabled("missing"));
    }
}
