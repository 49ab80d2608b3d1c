use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::identity::CurrentUser;
use crate::models::palette::{Color, NewPalette, Palette};
use crate::palettes::service::{delete_palette, validate_new_palette, visible_palette};
use crate::rewards::{reward, Action};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SavePaletteRequest {
    pub name: String,
    pub colors: Vec<Color>,
    #[serde(default)]
    pub ai_generated: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// POST /api/v1/palettes
pub async fn handle_save(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<SavePaletteRequest>,
) -> Result<Json<Palette>, AppError> {
    let user = current.require()?;
    let new_palette = NewPalette {
        name: request.name.trim().to_string(),
        colors: request.colors,
        owner_id: user.id.clone(),
        ai_generated: request.ai_generated,
        tags: request.tags,
    };
    validate_new_palette(&new_palette)?;

    let palette = state.store.insert_palette(new_palette).await?;
    info!(palette_id = %palette.id, owner_id = %user.id, "Palette saved");

    reward(state.store.as_ref(), &user.id, Action::SavePalette).await;
    Ok(Json(palette))
}

/// GET /api/v1/palettes
pub async fn handle_list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<Palette>>, AppError> {
    let user = current.require()?;
    Ok(Json(state.store.palettes_by_owner(&user.id).await?))
}

/// GET /api/v1/palettes/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Palette>, AppError> {
    let user = current.require()?;
    Ok(Json(visible_palette(state.store.as_ref(), id, &user.id).await?))
}

/// DELETE /api/v1/palettes/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let user = current.require()?;
    let deleted = delete_palette(state.store.as_ref(), id, &user.id).await?;
    Ok(Json(json!({ "deleted": deleted })))
}
