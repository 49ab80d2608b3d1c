//! Brand kit: custom font uploads for PLUS and higher.

pub mod handlers;

use crate::errors::AppError;

pub const MAX_FONT_BYTES: usize = 5 * 1024 * 1024;
pub const FONT_EXTENSIONS: [&str; 4] = ["ttf", "otf", "woff", "woff2"];

/// Checks name and size, returning the content type to store.
/// An upload's own content type is kept unless it is missing or generic.
pub fn validate_font(
    file_name: &str,
    declared_type: Option<&str>,
    size: usize,
) -> Result<String, AppError> {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| FONT_EXTENSIONS.contains(&ext.as_str()))
        .ok_or_else(|| {
            AppError::Validation(format!(
                "unsupported font file '{file_name}': expected .ttf, .otf, .woff or .woff2"
            ))
        })?;

    if size == 0 {
        return Err(AppError::Validation("font file is empty".to_string()));
    }
    if size > MAX_FONT_BYTES {
        return Err(AppError::Validation(format!(
            "font file exceeds {} MiB",
            MAX_FONT_BYTES / (1024 * 1024)
        )));
    }

    Ok(match declared_type {
        Some(t) if !t.is_empty() && t != "application/octet-stream" => t.to_string(),
        _ => format!("font/{extension}"),
    })
}
