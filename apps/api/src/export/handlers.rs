use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;
use uuid::Uuid;

use super::ase::to_ase;
use super::canva::to_canva_png;
use super::{download_name, to_css, to_figma, ExportError, ExportFormat};
use crate::state::AppState;

fn attachment(file_name: String) -> String {
    format!("attachment; filename=\"{file_name}\"")
}

/// GET /export/:id/:format
///
/// Public by palette id. The format is checked before the palette is looked up.
pub async fn handle_export(
    State(state): State<AppState>,
    Path((id, format)): Path<(String, String)>,
) -> Result<Response, ExportError> {
    let format: ExportFormat = format.parse()?;
    let id = Uuid::parse_str(&id).map_err(|_| ExportError::PaletteNotFound)?;
    let palette = state
        .store
        .find_palette(id)
        .await?
        .ok_or(ExportError::PaletteNotFound)?;

    info!(palette_id = %id, %format, "Exporting palette");
    let name = download_name(&palette.name);

    let response = match format {
        ExportFormat::Figma => Json(to_figma(&palette)).into_response(),
        ExportFormat::Css => (
            [
                (header::CONTENT_TYPE, "text/css".to_string()),
                (header::CONTENT_DISPOSITION, attachment(format!("{name}.css"))),
            ],
            to_css(&palette),
        )
            .into_response(),
        ExportFormat::Ase => (
            [
                (header::CONTENT_TYPE, "application/octet-stream".to_string()),
                (header::CONTENT_DISPOSITION, attachment(format!("{name}.ase"))),
            ],
            to_ase(&palette)?,
        )
            .into_response(),
        ExportFormat::Canva => (
            [
                (header::CONTENT_TYPE, "image/png".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    attachment(format!("aura-canva-{name}.png")),
                ),
            ],
            to_canva_png(&palette)?,
        )
            .into_response(),
    };
    Ok(response)
}
