//! Palette export to design-tool formats.
//!
//! Every failure on this surface is answered with a plain-text body.

use std::fmt;
use std::str::FromStr;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::models::palette::Palette;
use crate::store::StoreError;

pub mod ase;
pub mod canva;
pub mod handlers;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Figma,
    Css,
    Ase,
    Canva,
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "figma" => Ok(ExportFormat::Figma),
            "css" => Ok(ExportFormat::Css),
            "ase" => Ok(ExportFormat::Ase),
            "canva" => Ok(ExportFormat::Canva),
            _ => Err(ExportError::UnsupportedFormat),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Figma => "figma",
            ExportFormat::Css => "css",
            ExportFormat::Ase => "ase",
            ExportFormat::Canva => "canva",
        })
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Unsupported format")]
    UnsupportedFormat,

    #[error("Palette not found")]
    PaletteNotFound,

    #[error("Invalid color '{0}': expected #RRGGBB")]
    InvalidHex(String),

    #[error("Palette has no colors to render")]
    NoColors,

    #[error("Swatch name is too long: {0} UTF-16 units")]
    NameTooLong(usize),

    #[error("Image encoding failed: {0}")]
    Encode(#[from] png::EncodingError),

    #[error("Database error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for ExportError {
    fn into_response(self) -> Response {
        let status = match &self {
            ExportError::UnsupportedFormat => StatusCode::BAD_REQUEST,
            ExportError::PaletteNotFound => StatusCode::NOT_FOUND,
            ExportError::InvalidHex(_) | ExportError::NoColors | ExportError::NameTooLong(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ExportError::Encode(_) | ExportError::Store(_) => {
                tracing::error!("Export error: {self}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = match &self {
            ExportError::Encode(_) | ExportError::Store(_) => "Export failed".to_string(),
            other => other.to_string(),
        };
        (status, body).into_response()
    }
}

/// An sRGB colour with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Accepts `#RRGGBB`, `RRGGBB` and the `#RGB` shorthand.
    pub fn parse_hex(hex: &str) -> Result<Rgb, ExportError> {
        let invalid = || ExportError::InvalidHex(hex.to_string());
        let digits = hex.trim().trim_start_matches('#');
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let expanded: String = match digits.len() {
            6 => digits.to_string(),
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            _ => return Err(invalid()),
        };
        let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).map_err(|_| invalid());
        Ok(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_unit(self) -> [f32; 3] {
        [
            self.0 as f32 / 255.0,
            self.1 as f32 / 255.0,
            self.2 as f32 / 255.0,
        ]
    }
}

/// Parses every swatch, failing on the first bad hex.
pub fn palette_rgb(palette: &Palette) -> Result<Vec<Rgb>, ExportError> {
    palette.colors.iter().map(|c| Rgb::parse_hex(&c.hex)).collect()
}

#[derive(Debug, Serialize)]
pub struct FigmaExport {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub version: &'static str,
    pub colors: Vec<FigmaColor>,
}

#[derive(Debug, Serialize)]
pub struct FigmaColor {
    pub name: String,
    pub value: String,
    pub opacity: u8,
}

/// Hex values are passed through as saved.
pub fn to_figma(palette: &Palette) -> FigmaExport {
    FigmaExport {
        name: palette.name.clone(),
        kind: "FIGMA_VARIABLES",
        version: "1.0",
        colors: palette
            .colors
            .iter()
            .map(|c| FigmaColor {
                name: c.name.clone(),
                value: c.hex.clone(),
                opacity: 1,
            })
            .collect(),
    }
}

/// Lower-case name with each whitespace run, leading and trailing ones
/// included, collapsed to `-`.
pub fn css_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_space = false;
    for c in name.to_lowercase().chars() {
        if c.is_whitespace() {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
        } else {
            slug.push(c);
            in_space = false;
        }
    }
    slug
}

pub fn to_css(palette: &Palette) -> String {
    let mut css = String::from(":root {\n");
    for color in &palette.colors {
        css.push_str(&format!(
            "  --aura-{}: {};\n",
            css_slug(&color.name),
            color.hex
        ));
    }
    css.push_str("}\n");
    css
}

/// Makes a palette name safe for a quoted `Content-Disposition` filename.
pub fn download_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '"' | '\\' | '/' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();
    if cleaned.is_empty() {
        "palette".to_string()
    } else {
        cleaned
    }
}
