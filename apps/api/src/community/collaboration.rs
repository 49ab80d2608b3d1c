use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::social::{
    Collaboration, CollaborationRole, CollaboratorRecord, NewCollaboration, NewNotification,
    UserSummary, RESOURCE_PALETTE,
};
use crate::models::user::{PlanTier, User};
use crate::plans::require_plan;
use crate::rewards::best_effort;
use crate::store::Store;

pub const NOTIFICATION_INVITE: &str = "INVITE";
const UNNAMED_RESOURCE: &str = "a resource";

#[derive(Debug, Clone, Serialize)]
pub struct CollaboratorView {
    #[serde(flatten)]
    pub collaboration: Collaboration,
    pub user: UserSummary,
}

impl From<CollaboratorRecord> for CollaboratorView {
    fn from(record: CollaboratorRecord) -> Self {
        let user = record.user();
        CollaboratorView {
            collaboration: record.collaboration,
            user,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Invite {
    pub resource_id: Uuid,
    pub resource_type: String,
    pub user_id: String,
    pub role: Option<CollaborationRole>,
}

/// Adds a collaborator and notifies them. PLUS or higher only; the plan check
/// runs before any write. The notification is best-effort.
pub async fn invite(
    store: &dyn Store,
    inviter: &User,
    invite: Invite,
) -> Result<Collaboration, AppError> {
    require_plan(inviter, PlanTier::Plus, "Collaboration")?;

    let role = invite.role.unwrap_or_default();
    let collaboration = store
        .insert_collaboration(NewCollaboration {
            resource_type: invite.resource_type.clone(),
            resource_id: invite.resource_id,
            user_id: invite.user_id.clone(),
            role,
            invited_by_id: inviter.id.clone(),
        })
        .await?;
    info!(
        collaboration_id = %collaboration.id,
        resource_id = %invite.resource_id,
        invitee = %invite.user_id,
        %role,
        "Collaborator added"
    );

    best_effort("invite notification", async {
        let resource_name = resource_name(store, &invite.resource_type, invite.resource_id).await?;
        let inviter_name = inviter.full_name.as_deref().unwrap_or(&inviter.email);
        store
            .insert_notification(NewNotification {
                user_id: invite.user_id.clone(),
                kind: NOTIFICATION_INVITE.to_string(),
                title: "New invitation".to_string(),
                message: format!(
                    "{inviter_name} invited you to collaborate on \"{resource_name}\" as {role}."
                ),
                link: Some(format!("/projects/{}", invite.resource_id)),
            })
            .await
    })
    .await;

    Ok(collaboration)
}

async fn resource_name(
    store: &dyn Store,
    resource_type: &str,
    resource_id: Uuid,
) -> Result<String, crate::store::StoreError> {
    if resource_type != RESOURCE_PALETTE {
        return Ok(UNNAMED_RESOURCE.to_string());
    }
    Ok(store
        .find_palette(resource_id)
        .await?
        .map(|p| p.name)
        .unwrap_or_else(|| UNNAMED_RESOURCE.to_string()))
}
