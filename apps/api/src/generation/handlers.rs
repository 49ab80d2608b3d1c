//! Axum route handlers for the Generation API.

use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::generation::gateway::GeneratedPalette;
use crate::identity::CurrentUser;
use crate::rewards::{reward, Action};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
    /// `data:<mime>;base64,<data>` or bare base64.
    #[serde(default)]
    pub image: Option<String>,
}

/// POST /api/v1/palettes/generate
///
/// Anonymous callers may generate. Signed-in callers earn points, best-effort:
/// the palette is returned even if the reward writes fail.
pub async fn handle_generate(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GeneratedPalette>, AppError> {
    if request.prompt.trim().is_empty() {
        return Err(AppError::Validation("prompt cannot be empty".to_string()));
    }

    info!(
        user = current.user().map(|u| u.email.as_str()).unwrap_or("anonymous"),
        has_image = request.image.is_some(),
        "Generating palette"
    );

    let palette = state
        .gateway
        .generate(&request.prompt, request.image.as_deref())
        .await?;

    if let Some(user) = current.user() {
        reward(state.store.as_ref(), &user.id, Action::GeneratePalette).await;
    }

    Ok(Json(palette))
}
