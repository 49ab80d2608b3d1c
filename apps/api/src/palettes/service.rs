use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::palette::{NewPalette, Palette};
use crate::models::social::RESOURCE_PALETTE;
use crate::store::Store;

pub fn validate_new_palette(palette: &NewPalette) -> Result<(), AppError> {
    if palette.name.trim().is_empty() {
        return Err(AppError::Validation("palette name cannot be empty".to_string()));
    }
    if palette.colors.is_empty() {
        return Err(AppError::Validation(
            "palette must contain at least one color".to_string(),
        ));
    }
    Ok(())
}

/// A palette is visible to its owner, and to everyone once public.
pub async fn visible_palette(
    store: &dyn Store,
    id: Uuid,
    viewer_id: &str,
) -> Result<Palette, AppError> {
    store
        .find_palette(id)
        .await?
        .filter(|p| p.owner_id == viewer_id || p.is_public)
        .ok_or_else(|| AppError::NotFound(format!("Palette {id} not found")))
}

/// Deletes an owned palette and its dependents, children first.
///
/// Returns `false` without touching anything when `owner_id` does not own it.
pub async fn delete_palette(store: &dyn Store, id: Uuid, owner_id: &str) -> Result<bool, AppError> {
    let owned = store
        .find_palette(id)
        .await?
        .is_some_and(|p| p.owner_id == owner_id);
    if !owned {
        info!(palette_id = %id, owner_id, "Delete skipped: palette not owned by caller");
        return Ok(false);
    }

    let links = store.delete_moodboard_links(id).await?;
    let collaborations = store.delete_collaborations(RESOURCE_PALETTE, id).await?;
    let deleted = store.delete_owned_palette(id, owner_id).await?;
    info!(
        palette_id = %id,
        links,
        collaborations,
        deleted,
        "Palette delete cascade finished"
    );
    Ok(deleted > 0)
}
