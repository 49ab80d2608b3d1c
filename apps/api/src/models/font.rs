use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Font metadata returned to clients; the file bytes are never echoed back.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FontSummary {
    pub id: Uuid,
    pub owner_id: String,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewFont {
    pub owner_id: String,
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}
