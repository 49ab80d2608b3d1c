use axum::{
    extract::{Multipart, State},
    Extension, Json,
};
use tracing::info;

use crate::brand::validate_font;
use crate::errors::AppError;
use crate::identity::CurrentUser;
use crate::models::font::{FontSummary, NewFont};
use crate::models::user::PlanTier;
use crate::plans::require_plan;
use crate::state::AppState;

const FILE_FIELD: &str = "file";

/// POST /api/v1/brand/fonts (multipart, field `file`)
pub async fn handle_upload_font(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> Result<Json<FontSummary>, AppError> {
    let user = current.require()?;
    require_plan(user, PlanTier::Plus, "Custom fonts")?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let declared_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("could not read upload: {e}")))?;

        let content_type = validate_font(&file_name, declared_type.as_deref(), data.len())?;
        let font = state
            .store
            .insert_font(NewFont {
                owner_id: user.id.clone(),
                file_name,
                content_type,
                data: data.to_vec(),
            })
            .await?;
        info!(font_id = %font.id, owner_id = %user.id, size = font.size_bytes, "Font uploaded");
        return Ok(Json(font));
    }

    Err(AppError::Validation(format!(
        "multipart field '{FILE_FIELD}' is required"
    )))
}

/// GET /api/v1/brand/fonts
pub async fn handle_list_fonts(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<FontSummary>>, AppError> {
    let user = current.require()?;
    Ok(Json(state.store.fonts_for(&user.id).await?))
}
