//! Catalog settings routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use rentdesk_core::settings::{CatalogSettings, Preset};
use tracing::info;

use crate::{AppState, error::ApiResult, middleware::AuthUser};

/// Creates the settings routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/settings", get(get_settings).put(update_settings))
        .route("/settings/preset/{preset}", post(apply_preset))
}

/// GET `/settings` - Current labels, currency and categories.
async fn get_settings(State(state): State<AppState>) -> ApiResult<Json<CatalogSettings>> {
    Ok(Json(state.backend.settings().await?))
}

/// PUT `/settings` - Replace the settings (admin).
async fn update_settings(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(mut body): Json<CatalogSettings>,
) -> ApiResult<Json<CatalogSettings>> {
    auth.require_admin()?;
    let categories = std::mem::take(&mut body.categories);
    body.set_categories(categories);
    let saved = state.backend.save_settings(body).await?;
    info!(operator = %auth.name(), app_name = %saved.app_name, "Settings updated");
    Ok(Json(saved))
}

/// POST `/settings/preset/{preset}` - Replace the settings with a preset (admin).
async fn apply_preset(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(preset): Path<String>,
) -> ApiResult<Json<CatalogSettings>> {
    auth.require_admin()?;
    let preset = Preset::parse(&preset)?;
    let saved = state
        .backend
        .save_settings(CatalogSettings::from_preset(preset))
        .await?;
    info!(operator = %auth.name(), preset = %preset, "Preset applied");
    Ok(Json(saved))
}
