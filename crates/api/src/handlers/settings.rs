use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Deserialize;

use kotoba_core::model::{AppSetting, AppSettings};

use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::extractors::AppJson;

#[derive(Debug, Deserialize)]
pub struct UpdateSettingRequest {
    pub key: String,
    pub value: bool,
}

/// GET /api/settings - public flag map.
pub async fn get_settings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AppSettings>, ApiError> {
    Ok(Json(state.services.settings().load().await?))
}

/// PUT /api/settings - admins only.
pub async fn update_setting(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    AppJson(body): AppJson<UpdateSettingRequest>,
) -> Result<Json<AppSetting>, ApiError> {
    let setting = state
        .services
        .settings()
        .update(user, body.key, body.value)
        .await?;
    Ok(Json(setting))
}
