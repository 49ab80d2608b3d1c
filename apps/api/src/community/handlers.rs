use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::community::collaboration::{invite, CollaboratorView, Invite};
use crate::community::comments::{add_comment, thread, CommentView};
use crate::errors::AppError;
use crate::identity::CurrentUser;
use crate::models::social::{
    ActivityLog, Collaboration, CollaborationRole, Notification, UserBadge, UserSummary,
};
use crate::state::AppState;

const ACTIVITY_FEED_LIMIT: i64 = 10;

/// GET /api/v1/comments/:resource_id
pub async fn handle_list_comments(
    State(state): State<AppState>,
    Path(resource_id): Path<Uuid>,
) -> Result<Json<Vec<CommentView>>, AppError> {
    let records = state.store.comments_for(resource_id).await?;
    Ok(Json(thread(records)))
}

#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    pub resource_id: Uuid,
    pub content: String,
    #[serde(default)]
    pub parent_comment_id: Option<Uuid>,
}

/// POST /api/v1/comments
pub async fn handle_add_comment(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<AddCommentRequest>,
) -> Result<Json<CommentView>, AppError> {
    let user = current.require()?;
    let comment = add_comment(
        state.store.as_ref(),
        user,
        request.resource_id,
        &request.content,
        request.parent_comment_id,
    )
    .await?;
    Ok(Json(comment))
}

/// GET /api/v1/collaborations/:resource_id
pub async fn handle_list_collaborators(
    State(state): State<AppState>,
    Path(resource_id): Path<Uuid>,
) -> Result<Json<Vec<CollaboratorView>>, AppError> {
    let records = state.store.collaborators(resource_id).await?;
    Ok(Json(records.into_iter().map(CollaboratorView::from).collect()))
}

#[derive(Debug, Deserialize)]
pub struct AddCollaborationRequest {
    pub resource_id: Uuid,
    pub resource_type: String,
    pub user_id: String,
    #[serde(default)]
    pub role: Option<CollaborationRole>,
}

/// POST /api/v1/collaborations
pub async fn handle_add_collaboration(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<AddCollaborationRequest>,
) -> Result<Json<Collaboration>, AppError> {
    let user = current.require()?;
    let collaboration = invite(
        state.store.as_ref(),
        user,
        Invite {
            resource_id: request.resource_id,
            resource_type: request.resource_type,
            user_id: request.user_id,
            role: request.role,
        },
    )
    .await?;
    Ok(Json(collaboration))
}

/// GET /api/v1/notifications
pub async fn handle_notifications(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<Notification>>, AppError> {
    let user = current.require()?;
    Ok(Json(state.store.notifications_for(&user.id).await?))
}

/// POST /api/v1/notifications/:id/read
///
/// Marking someone else's notification is a no-op (`updated: false`).
pub async fn handle_mark_read(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let user = current.require()?;
    let updated = state.store.mark_notification_read(id, &user.id).await?;
    Ok(Json(json!({ "updated": updated > 0 })))
}

/// GET /api/v1/activity
pub async fn handle_activity(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<ActivityLog>>, AppError> {
    let user = current.require()?;
    Ok(Json(
        state
            .store
            .recent_activity(&user.id, ACTIVITY_FEED_LIMIT)
            .await?,
    ))
}

/// GET /api/v1/badges
pub async fn handle_badges(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<UserBadge>>, AppError> {
    let user = current.require()?;
    Ok(Json(state.store.badges(&user.id).await?))
}

#[derive(Debug, Deserialize)]
pub struct UserSearchQuery {
    pub email: String,
}

/// GET /api/v1/users/search?email=
///
/// Exact email match; only the public card is returned.
pub async fn handle_user_search(
    State(state): State<AppState>,
    Query(query): Query<UserSearchQuery>,
) -> Result<Json<Option<UserSummary>>, AppError> {
    let user = state.store.find_user_by_email(query.email.trim()).await?;
    Ok(Json(user.map(|u| UserSummary {
        id: u.id,
        email: u.email,
        full_name: u.full_name,
        avatar_url: u.avatar_url,
    })))
}
