//! Persistence seam. Handlers and services only talk to `dyn Store`;
//! `PgStore` backs it in production.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::font::{FontSummary, NewFont};
use crate::models::palette::{NewPalette, Palette};
use crate::models::social::{
    ActivityLog, Collaboration, CollaboratorRecord, CommentRecord, NewCollaboration, NewComment,
    NewNotification, Notification, UserBadge,
};
use crate::models::user::{BillingLink, IdentityProfile, User};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Database(sqlx::Error),

    /// A write was refused by a referential or uniqueness constraint.
    #[error("constraint violation: {0}")]
    Constraint(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db)
                if db.is_foreign_key_violation() || db.is_unique_violation() =>
            {
                StoreError::Constraint(db.message().to_string())
            }
            _ => StoreError::Database(err),
        }
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    // Users
    /// Login sync. A row with the identity id takes the provider's current email and profile;
    /// otherwise a row with the same email is re-keyed to the identity id. New rows start on
    /// FREE with `signup_points`.
    async fn sync_identity_user(
        &self,
        profile: &IdentityProfile,
        signup_points: i32,
    ) -> Result<User, StoreError>;
    /// Upserts by email from a billing event. New rows get a `temp_` id and `signup_points`.
    async fn upsert_billing_user(
        &self,
        link: &BillingLink,
        signup_points: i32,
    ) -> Result<User, StoreError>;
    /// Resets every user bound to the subscription back to FREE.
    async fn downgrade_subscription(&self, subscription_id: &str) -> Result<u64, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn add_points(&self, user_id: &str, points: i32) -> Result<(), StoreError>;
    async fn log_activity(
        &self,
        user_id: &str,
        action_type: &str,
        points_earned: i32,
    ) -> Result<(), StoreError>;
    async fn recent_activity(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<ActivityLog>, StoreError>;
    async fn badges(&self, user_id: &str) -> Result<Vec<UserBadge>, StoreError>;

    // Palettes
    async fn insert_palette(&self, palette: NewPalette) -> Result<Palette, StoreError>;
    async fn palettes_by_owner(&self, owner_id: &str) -> Result<Vec<Palette>, StoreError>;
    async fn find_palette(&self, id: Uuid) -> Result<Option<Palette>, StoreError>;
    async fn delete_moodboard_links(&self, palette_id: Uuid) -> Result<u64, StoreError>;
    async fn delete_collaborations(
        &self,
        resource_type: &str,
        resource_id: Uuid,
    ) -> Result<u64, StoreError>;
    /// Deletes the palette row only if `owner_id` owns it. Dependents must already be gone.
    async fn delete_owned_palette(&self, id: Uuid, owner_id: &str) -> Result<u64, StoreError>;

    // Comments
    async fn insert_comment(&self, comment: NewComment) -> Result<CommentRecord, StoreError>;
    /// All comments on a resource, oldest first.
    async fn comments_for(&self, resource_id: Uuid) -> Result<Vec<CommentRecord>, StoreError>;

    // Collaborations
    async fn insert_collaboration(
        &self,
        collaboration: NewCollaboration,
    ) -> Result<Collaboration, StoreError>;
    async fn collaborators(&self, resource_id: Uuid)
        -> Result<Vec<CollaboratorRecord>, StoreError>;

    // Notifications
    async fn insert_notification(
        &self,
        notification: NewNotification,
    ) -> Result<Notification, StoreError>;
    async fn notifications_for(&self, user_id: &str) -> Result<Vec<Notification>, StoreError>;
    async fn mark_notification_read(&self, id: Uuid, user_id: &str) -> Result<u64, StoreError>;

    // Fonts
    async fn insert_font(&self, font: NewFont) -> Result<FontSummary, StoreError>;
    async fn fonts_for(&self, owner_id: &str) -> Result<Vec<FontSummary>, StoreError>;
}

/// Id assigned to users first seen through a billing event, before they ever log in.
pub fn temp_user_id() -> String {
    format!("temp_{}", Uuid::new_v4().simple())
}
