mod app_settings;
mod ids;
mod lesson;
mod word;

pub use app_settings::{AppSetting, AppSettingError, AppSettings, normalize_key};
pub use ids::{LessonId, ParseIdError, UserId, WordId};

pub use lesson::{Language, Lesson, LessonDraft, LessonError};
pub use word::{WordDraft, WordError, WordPair};
