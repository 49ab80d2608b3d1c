use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::{temp_user_id, Store, StoreError};
use crate::models::font::{FontSummary, NewFont};
use crate::models::palette::{NewPalette, Palette};
use crate::models::social::{
    ActivityLog, Collaboration, CollaboratorRecord, CommentRecord, NewCollaboration, NewComment,
    NewNotification, Notification, UserBadge,
};
use crate::models::user::{BillingLink, IdentityProfile, PlanTier, User};

const COMMENT_COLUMNS: &str = r#"
    c.id, c.resource_id, c.user_id, c.content, c.parent_comment_id, c.created_at,
    u.email AS author_email, u.full_name AS author_full_name, u.avatar_url AS author_avatar_url
"#;

const FONT_COLUMNS: &str =
    "id, owner_id, file_name, content_type, octet_length(data)::BIGINT AS size_bytes, created_at";

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn sync_identity_user(
        &self,
        profile: &IdentityProfile,
        signup_points: i32,
    ) -> Result<User, StoreError> {
        let existing = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
                SET email = $2,
                    full_name = $3,
                    avatar_url = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(&profile.id)
        .bind(&profile.email)
        .bind(&profile.full_name)
        .bind(&profile.avatar_url)
        .fetch_optional(&self.pool)
        .await?;
        if let Some(user) = existing {
            return Ok(user);
        }

        Ok(sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, full_name, avatar_url, plan, points)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (email) DO UPDATE
                SET id = EXCLUDED.id,
                    full_name = EXCLUDED.full_name,
                    avatar_url = EXCLUDED.avatar_url
            RETURNING *
            "#,
        )
        .bind(&profile.id)
        .bind(&profile.email)
        .bind(&profile.full_name)
        .bind(&profile.avatar_url)
        .bind(PlanTier::Free.as_str())
        .bind(signup_points)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn upsert_billing_user(
        &self,
        link: &BillingLink,
        signup_points: i32,
    ) -> Result<User, StoreError> {
        Ok(sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, plan, points, stripe_customer_id, stripe_subscription_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (email) DO UPDATE
                SET plan = EXCLUDED.plan,
                    stripe_customer_id = EXCLUDED.stripe_customer_id,
                    stripe_subscription_id = EXCLUDED.stripe_subscription_id
            RETURNING *
            "#,
        )
        .bind(temp_user_id())
        .bind(&link.email)
        .bind(link.plan.as_str())
        .bind(signup_points)
        .bind(&link.customer_id)
        .bind(&link.subscription_id)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn downgrade_subscription(&self, subscription_id: &str) -> Result<u64, StoreError> {
        let result = sqlx::query("UPDATE users SET plan = $1 WHERE stripe_subscription_id = $2")
            .bind(PlanTier::Free.as_str())
            .bind(subscription_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn add_points(&self, user_id: &str, points: i32) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET points = points + $1 WHERE id = $2")
            .bind(points)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn log_activity(
        &self,
        user_id: &str,
        action_type: &str,
        points_earned: i32,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO activity_logs (id, user_id, action_type, points_earned) VALUES ($1, $2, $3, $4)",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(action_type)
        .bind(points_earned)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn recent_activity(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<ActivityLog>, StoreError> {
        Ok(sqlx::query_as::<_, ActivityLog>(
            "SELECT * FROM activity_logs WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn badges(&self, user_id: &str) -> Result<Vec<UserBadge>, StoreError> {
        Ok(sqlx::query_as::<_, UserBadge>(
            "SELECT badge_name, unlocked_at FROM user_badges WHERE user_id = $1 ORDER BY unlocked_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn insert_palette(&self, palette: NewPalette) -> Result<Palette, StoreError> {
        Ok(sqlx::query_as::<_, Palette>(
            r#"
            INSERT INTO palettes (id, name, colors, owner_id, ai_generated, tags)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&palette.name)
        .bind(Json(&palette.colors))
        .bind(&palette.owner_id)
        .bind(palette.ai_generated)
        .bind(&palette.tags)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn palettes_by_owner(&self, owner_id: &str) -> Result<Vec<Palette>, StoreError> {
        Ok(sqlx::query_as::<_, Palette>(
            "SELECT * FROM palettes WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn find_palette(&self, id: Uuid) -> Result<Option<Palette>, StoreError> {
        Ok(
            sqlx::query_as::<_, Palette>("SELECT * FROM palettes WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn delete_moodboard_links(&self, palette_id: Uuid) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM moodboard_palettes WHERE palette_id = $1")
            .bind(palette_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_collaborations(
        &self,
        resource_type: &str,
        resource_id: Uuid,
    ) -> Result<u64, StoreError> {
        let result =
            sqlx::query("DELETE FROM collaborations WHERE resource_type = $1 AND resource_id = $2")
                .bind(resource_type)
                .bind(resource_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }

    async fn delete_owned_palette(&self, id: Uuid, owner_id: &str) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM palettes WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn insert_comment(&self, comment: NewComment) -> Result<CommentRecord, StoreError> {
        let sql = format!(
            r#"
            WITH c AS (
                INSERT INTO comments (id, resource_id, user_id, content, parent_comment_id)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
            )
            SELECT {COMMENT_COLUMNS}
            FROM c JOIN users u ON u.id = c.user_id
            "#
        );
        Ok(sqlx::query_as::<_, CommentRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(comment.resource_id)
            .bind(&comment.user_id)
            .bind(&comment.content)
            .bind(comment.parent_comment_id)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn comments_for(&self, resource_id: Uuid) -> Result<Vec<CommentRecord>, StoreError> {
        let sql = format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM comments c JOIN users u ON u.id = c.user_id
            WHERE c.resource_id = $1
            ORDER BY c.created_at ASC
            "#
        );
        Ok(sqlx::query_as::<_, CommentRecord>(&sql)
            .bind(resource_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn insert_collaboration(
        &self,
        collaboration: NewCollaboration,
    ) -> Result<Collaboration, StoreError> {
        Ok(sqlx::query_as::<_, Collaboration>(
            r#"
            INSERT INTO collaborations (id, resource_type, resource_id, user_id, role, invited_by_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&collaboration.resource_type)
        .bind(collaboration.resource_id)
        .bind(&collaboration.user_id)
        .bind(collaboration.role.as_str())
        .bind(&collaboration.invited_by_id)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn collaborators(
        &self,
        resource_id: Uuid,
    ) -> Result<Vec<CollaboratorRecord>, StoreError> {
        Ok(sqlx::query_as::<_, CollaboratorRecord>(
            r#"
            SELECT c.*, u.email AS user_email, u.full_name AS user_full_name,
                   u.avatar_url AS user_avatar_url
            FROM collaborations c JOIN users u ON u.id = c.user_id
            WHERE c.resource_id = $1
            ORDER BY c.created_at ASC
            "#,
        )
        .bind(resource_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn insert_notification(
        &self,
        notification: NewNotification,
    ) -> Result<Notification, StoreError> {
        Ok(sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (id, user_id, kind, title, message, link)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&notification.user_id)
        .bind(&notification.kind)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(&notification.link)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn notifications_for(&self, user_id: &str) -> Result<Vec<Notification>, StoreError> {
        Ok(sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn mark_notification_read(&self, id: Uuid, user_id: &str) -> Result<u64, StoreError> {
        let result =
            sqlx::query("UPDATE notifications SET read = TRUE WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }

    async fn insert_font(&self, font: NewFont) -> Result<FontSummary, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO custom_fonts (id, owner_id, file_name, content_type, data)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {FONT_COLUMNS}
            "#
        );
        Ok(sqlx::query_as::<_, FontSummary>(&sql)
            .bind(Uuid::new_v4())
            .bind(&font.owner_id)
            .bind(&font.file_name)
            .bind(&font.content_type)
            .bind(&font.data)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn fonts_for(&self, owner_id: &str) -> Result<Vec<FontSummary>, StoreError> {
        let sql = format!(
            "SELECT {FONT_COLUMNS} FROM custom_fonts WHERE owner_id = $1 ORDER BY created_at DESC"
        );
        Ok(sqlx::query_as::<_, FontSummary>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?)
    }
}
