use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A single swatch. `hex` is `#RRGGBB` by convention; it is only checked at export time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub hex: String,
    pub name: String,
    #[serde(default)]
    pub psychology: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Palette {
    pub id: Uuid,
    pub name: String,
    #[sqlx(json)]
    pub colors: Vec<Color>,
    pub owner_id: String,
    pub is_public: bool,
    pub ai_generated: bool,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a palette. The store assigns `id` and `created_at`.
#[derive(Debug, Clone)]
pub struct NewPalette {
    pub name: String,
    pub colors: Vec<Color>,
    pub owner_id: String,
    pub ai_generated: bool,
    pub tags: Vec<String>,
}
