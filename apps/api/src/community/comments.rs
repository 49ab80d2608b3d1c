use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::social::{CommentRecord, NewComment, UserSummary};
use crate::models::user::User;
use crate::rewards::{reward, Action};
use crate::store::Store;

/// A comment as served to clients. Only top-level comments carry replies.
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: Uuid,
    pub resource_id: Uuid,
    pub content: String,
    pub parent_comment_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub user: UserSummary,
    pub replies: Vec<CommentView>,
}

impl From<CommentRecord> for CommentView {
    fn from(record: CommentRecord) -> Self {
        let user = record.author();
        CommentView {
            id: record.id,
            resource_id: record.resource_id,
            content: record.content,
            parent_comment_id: record.parent_comment_id,
            created_at: record.created_at,
            user,
            replies: Vec::new(),
        }
    }
}

/// Groups oldest-first records into top-level comments with their direct replies.
/// Replies nested deeper than one level are not listed.
pub fn thread(records: Vec<CommentRecord>) -> Vec<CommentView> {
    let (top_level, replies): (Vec<_>, Vec<_>) = records
        .into_iter()
        .partition(|r| r.parent_comment_id.is_none());

    let mut threads: Vec<CommentView> = top_level.into_iter().map(CommentView::from).collect();
    for reply in replies {
        if let Some(parent) = threads
            .iter_mut()
            .find(|t| Some(t.id) == reply.parent_comment_id)
        {
            parent.replies.push(reply.into());
        }
    }
    threads
}

pub async fn add_comment(
    store: &dyn Store,
    author: &User,
    resource_id: Uuid,
    content: &str,
    parent_comment_id: Option<Uuid>,
) -> Result<CommentView, AppError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::Validation("comment cannot be empty".to_string()));
    }

    let record = store
        .insert_comment(NewComment {
            resource_id,
            user_id: author.id.clone(),
            content: content.to_string(),
            parent_comment_id,
        })
        .await?;

    reward(store, &author.id, Action::AddComment).await;
    Ok(record.into())
}
