use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

/// Resource type tag used by collaborations on palettes.
pub const RESOURCE_PALETTE: &str = "PALETTE";

/// Public author/collaborator card embedded in comment and collaboration views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Comments
// ────────────────────────────────────────────────────────────────────────────

/// A comment joined with its author's public fields.
#[derive(Debug, Clone, FromRow)]
pub struct CommentRecord {
    pub id: Uuid,
    pub resource_id: Uuid,
    pub user_id: String,
    pub content: String,
    pub parent_comment_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub author_email: String,
    pub author_full_name: Option<String>,
    pub author_avatar_url: Option<String>,
}

impl CommentRecord {
    pub fn author(&self) -> UserSummary {
        UserSummary {
            id: self.user_id.clone(),
            email: self.author_email.clone(),
            full_name: self.author_full_name.clone(),
            avatar_url: self.author_avatar_url.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub resource_id: Uuid,
    pub user_id: String,
    pub content: String,
    pub parent_comment_id: Option<Uuid>,
}

// ────────────────────────────────────────────────────────────────────────────
// Collaborations
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CollaborationRole {
    #[default]
    Viewer,
    Editor,
}

#[derive(Debug, Error)]
#[error("unknown collaboration role: {0}")]
pub struct UnknownRole(pub String);

impl CollaborationRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollaborationRole::Viewer => "VIEWER",
            CollaborationRole::Editor => "EDITOR",
        }
    }
}

impl fmt::Display for CollaborationRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollaborationRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "VIEWER" => Ok(CollaborationRole::Viewer),
            "EDITOR" => Ok(CollaborationRole::Editor),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

impl TryFrom<String> for CollaborationRole {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Collaboration {
    pub id: Uuid,
    pub resource_type: String,
    pub resource_id: Uuid,
    pub user_id: String,
    #[sqlx(try_from = "String")]
    pub role: CollaborationRole,
    pub status: String,
    pub invited_by_id: String,
    pub created_at: DateTime<Utc>,
}

/// A collaboration joined with the collaborator's public fields.
#[derive(Debug, Clone, FromRow)]
pub struct CollaboratorRecord {
    #[sqlx(flatten)]
    pub collaboration: Collaboration,
    pub user_email: String,
    pub user_full_name: Option<String>,
    pub user_avatar_url: Option<String>,
}

impl CollaboratorRecord {
    pub fn user(&self) -> UserSummary {
        UserSummary {
            id: self.collaboration.user_id.clone(),
            email: self.user_email.clone(),
            full_name: self.user_full_name.clone(),
            avatar_url: self.user_avatar_url.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewCollaboration {
    pub resource_type: String,
    pub resource_id: Uuid,
    pub user_id: String,
    pub role: CollaborationRole,
    pub invited_by_id: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Notifications, activity, badges
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: String,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: String,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ActivityLog {
    pub id: Uuid,
    pub user_id: String,
    pub action_type: String,
    pub points_earned: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserBadge {
    pub badge_name: String,
    pub unlocked_at: DateTime<Utc>,
}
