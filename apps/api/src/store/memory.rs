//! In-memory store for tests. Mirrors the schema's constraints: unique ids and
//! emails, user foreign keys with `ON UPDATE CASCADE`, and no palette delete
//! while moodboard links remain.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{temp_user_id, Store, StoreError};
use crate::models::font::{FontSummary, NewFont};
use crate::models::palette::{NewPalette, Palette};
use crate::models::social::{
    ActivityLog, Collaboration, CollaboratorRecord, CommentRecord, NewCollaboration, NewComment,
    NewNotification, Notification, UserBadge,
};
use crate::models::user::{BillingLink, IdentityProfile, PlanTier, User};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    palettes: Vec<Palette>,
    /// (moodboard_id, palette_id)
    moodboard_links: Vec<(Uuid, Uuid)>,
    comments: Vec<CommentRecord>,
    collaborations: Vec<Collaboration>,
    notifications: Vec<Notification>,
    activity: Vec<ActivityLog>,
    badges: Vec<(String, UserBadge)>,
    fonts: Vec<FontSummary>,
}

impl Tables {
    fn user(&self, id: &str) -> Result<&User, StoreError> {
        self.users
            .iter()
            .find(|u| u.id == id)
            .ok_or_else(|| StoreError::Constraint(format!("user {id} does not exist")))
    }

    /// `ON UPDATE CASCADE` for every `users(id)` reference.
    fn rekey_user(&mut self, old_id: &str, new_id: &str) {
        let rekey = |id: &mut String| {
            if id == old_id {
                *id = new_id.to_string();
            }
        };
        self.palettes.iter_mut().for_each(|p| rekey(&mut p.owner_id));
        self.comments.iter_mut().for_each(|c| rekey(&mut c.user_id));
        for collaboration in self.collaborations.iter_mut() {
            rekey(&mut collaboration.user_id);
            rekey(&mut collaboration.invited_by_id);
        }
        self.notifications.iter_mut().for_each(|n| rekey(&mut n.user_id));
        self.activity.iter_mut().for_each(|a| rekey(&mut a.user_id));
        self.badges.iter_mut().for_each(|(user_id, _)| rekey(user_id));
        self.fonts.iter_mut().for_each(|f| rekey(&mut f.owner_id));
    }

    /// Comment rows carry the author columns the SQL store joins in.
    fn refresh_author(&mut self, user: &User) {
        for comment in self.comments.iter_mut().filter(|c| c.user_id == user.id) {
            comment.author_email = user.email.clone();
            comment.author_full_name = user.full_name.clone();
            comment.author_avatar_url = user.avatar_url.clone();
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_points: AtomicBool,
    fail_notifications: AtomicBool,
}

fn unavailable(what: &str) -> StoreError {
    StoreError::Database(sqlx::Error::Protocol(format!("{what} unavailable")))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_user(&self, id: &str, email: &str, plan: PlanTier) -> User {
        self.seed_user_with_points(id, email, plan, 0)
    }

    pub fn seed_user_with_points(&self, id: &str, email: &str, plan: PlanTier, points: i32) -> User {
        let user = User {
            id: id.to_string(),
            email: email.to_string(),
            full_name: Some(email.split('@').next().unwrap_or(email).to_string()),
            avatar_url: None,
            plan,
            points,
            stripe_customer_id: None,
            stripe_subscription_id: None,
            created_at: Utc::now(),
        };
        self.tables.lock().unwrap().users.push(user.clone());
        user
    }

    pub fn seed_badge(&self, user_id: &str, badge_name: &str) {
        self.tables.lock().unwrap().badges.push((
            user_id.to_string(),
            UserBadge {
                badge_name: badge_name.to_string(),
                unlocked_at: Utc::now(),
            },
        ));
    }

    pub fn link_moodboard(&self, moodboard_id: Uuid, palette_id: Uuid) {
        self.tables
            .lock()
            .unwrap()
            .moodboard_links
            .push((moodboard_id, palette_id));
    }

    pub fn user(&self, id: &str) -> Option<User> {
        self.tables
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
    }

    pub fn user_by_email(&self, email: &str) -> Option<User> {
        self.tables
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned()
    }

    pub fn palette_count(&self) -> usize {
        self.tables.lock().unwrap().palettes.len()
    }

    pub fn moodboard_link_count(&self) -> usize {
        self.tables.lock().unwrap().moodboard_links.len()
    }

    pub fn collaboration_count(&self) -> usize {
        self.tables.lock().unwrap().collaborations.len()
    }

    pub fn notification_count(&self) -> usize {
        self.tables.lock().unwrap().notifications.len()
    }

    pub fn activity_for(&self, user_id: &str) -> Vec<ActivityLog> {
        self.tables
            .lock()
            .unwrap()
            .activity
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn fail_points(&self, fail: bool) {
        self.fail_points.store(fail, Ordering::SeqCst);
    }

    pub fn fail_notifications(&self, fail: bool) {
        self.fail_notifications.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn sync_identity_user(
        &self,
        profile: &IdentityProfile,
        signup_points: i32,
    ) -> Result<User, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        if let Some(index) = tables.users.iter().position(|u| u.id == profile.id) {
            if tables
                .users
                .iter()
                .any(|u| u.id != profile.id && u.email == profile.email)
            {
                return Err(StoreError::Constraint(format!(
                    "email {} already exists",
                    profile.email
                )));
            }
            let user = &mut tables.users[index];
            user.email = profile.email.clone();
            user.full_name = profile.full_name.clone();
            user.avatar_url = profile.avatar_url.clone();
            let user = user.clone();
            tables.refresh_author(&user);
            return Ok(user);
        }
        if let Some(index) = tables.users.iter().position(|u| u.email == profile.email) {
            let old_id = tables.users[index].id.clone();
            {
                let user = &mut tables.users[index];
                user.id = profile.id.clone();
                user.full_name = profile.full_name.clone();
                user.avatar_url = profile.avatar_url.clone();
            }
            tables.rekey_user(&old_id, &profile.id);
            let user = tables.users[index].clone();
            tables.refresh_author(&user);
            return Ok(user);
        }
        let user = User {
            id: profile.id.clone(),
            email: profile.email.clone(),
            full_name: profile.full_name.clone(),
            avatar_url: profile.avatar_url.clone(),
            plan: PlanTier::Free,
            points: signup_points,
            stripe_customer_id: None,
            stripe_subscription_id: None,
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn upsert_billing_user(
        &self,
        link: &BillingLink,
        signup_points: i32,
    ) -> Result<User, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        if let Some(user) = tables.users.iter_mut().find(|u| u.email == link.email) {
            user.plan = link.plan;
            user.stripe_customer_id = link.customer_id.clone();
            user.stripe_subscription_id = Some(link.subscription_id.clone());
            return Ok(user.clone());
        }
        let user = User {
            id: temp_user_id(),
            email: link.email.clone(),
            full_name: None,
            avatar_url: None,
            plan: link.plan,
            points: signup_points,
            stripe_customer_id: link.customer_id.clone(),
            stripe_subscription_id: Some(link.subscription_id.clone()),
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn downgrade_subscription(&self, subscription_id: &str) -> Result<u64, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let mut affected = 0;
        for user in tables
            .users
            .iter_mut()
            .filter(|u| u.stripe_subscription_id.as_deref() == Some(subscription_id))
        {
            user.plan = PlanTier::Free;
            affected += 1;
        }
        Ok(affected)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.user_by_email(email))
    }

    async fn add_points(&self, user_id: &str, points: i32) -> Result<(), StoreError> {
        if self.fail_points.load(Ordering::SeqCst) {
            return Err(unavailable("points ledger"));
        }
        let mut tables = self.tables.lock().unwrap();
        if let Some(user) = tables.users.iter_mut().find(|u| u.id == user_id) {
            user.points += points;
        }
        Ok(())
    }

    async fn log_activity(
        &self,
        user_id: &str,
        action_type: &str,
        points_earned: i32,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().unwrap();
        tables.user(user_id)?;
        tables.activity.push(ActivityLog {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            action_type: action_type.to_string(),
            points_earned,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn recent_activity(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<ActivityLog>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .activity
            .iter()
            .rev()
            .filter(|a| a.user_id == user_id)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn badges(&self, user_id: &str) -> Result<Vec<UserBadge>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .badges
            .iter()
            .filter(|(owner, _)| owner == user_id)
            .map(|(_, badge)| badge.clone())
            .collect())
    }

    async fn insert_palette(&self, palette: NewPalette) -> Result<Palette, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        tables.user(&palette.owner_id)?;
        let row = Palette {
            id: Uuid::new_v4(),
            name: palette.name,
            colors: palette.colors,
            owner_id: palette.owner_id,
            is_public: false,
            ai_generated: palette.ai_generated,
            tags: palette.tags,
            created_at: Utc::now(),
        };
        tables.palettes.push(row.clone());
        Ok(row)
    }

    async fn palettes_by_owner(&self, owner_id: &str) -> Result<Vec<Palette>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .palettes
            .iter()
            .rev()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn find_palette(&self, id: Uuid) -> Result<Option<Palette>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.palettes.iter().find(|p| p.id == id).cloned())
    }

    async fn delete_moodboard_links(&self, palette_id: Uuid) -> Result<u64, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.moodboard_links.len();
        tables.moodboard_links.retain(|(_, p)| *p != palette_id);
        Ok((before - tables.moodboard_links.len()) as u64)
    }

    async fn delete_collaborations(
        &self,
        resource_type: &str,
        resource_id: Uuid,
    ) -> Result<u64, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.collaborations.len();
        tables
            .collaborations
            .retain(|c| !(c.resource_type == resource_type && c.resource_id == resource_id));
        Ok((before - tables.collaborations.len()) as u64)
    }

    async fn delete_owned_palette(&self, id: Uuid, owner_id: &str) -> Result<u64, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let Some(index) = tables
            .palettes
            .iter()
            .position(|p| p.id == id && p.owner_id == owner_id)
        else {
            return Ok(0);
        };
        if tables.moodboard_links.iter().any(|(_, p)| *p == id) {
            return Err(StoreError::Constraint(format!(
                "palette {id} is still referenced"
            )));
        }
        tables.palettes.remove(index);
        Ok(1)
    }

    async fn insert_comment(&self, comment: NewComment) -> Result<CommentRecord, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let author = tables.user(&comment.user_id)?.clone();
        let record = CommentRecord {
            id: Uuid::new_v4(),
            resource_id: comment.resource_id,
            user_id: comment.user_id,
            content: comment.content,
            parent_comment_id: comment.parent_comment_id,
            created_at: Utc::now(),
            author_email: author.email,
            author_full_name: author.full_name,
            author_avatar_url: author.avatar_url,
        };
        tables.comments.push(record.clone());
        Ok(record)
    }

    async fn comments_for(&self, resource_id: Uuid) -> Result<Vec<CommentRecord>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .comments
            .iter()
            .filter(|c| c.resource_id == resource_id)
            .cloned()
            .collect())
    }

    async fn insert_collaboration(
        &self,
        collaboration: NewCollaboration,
    ) -> Result<Collaboration, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        tables.user(&collaboration.user_id)?;
        tables.user(&collaboration.invited_by_id)?;
        let row = Collaboration {
            id: Uuid::new_v4(),
            resource_type: collaboration.resource_type,
            resource_id: collaboration.resource_id,
            user_id: collaboration.user_id,
            role: collaboration.role,
            status: "PENDING".to_string(),
            invited_by_id: collaboration.invited_by_id,
            created_at: Utc::now(),
        };
        tables.collaborations.push(row.clone());
        Ok(row)
    }

    async fn collaborators(
        &self,
        resource_id: Uuid,
    ) -> Result<Vec<CollaboratorRecord>, StoreError> {
        let tables = self.tables.lock().unwrap();
        tables
            .collaborations
            .iter()
            .filter(|c| c.resource_id == resource_id)
            .map(|c| {
                let user = tables.user(&c.user_id)?;
                Ok(CollaboratorRecord {
                    collaboration: c.clone(),
                    user_email: user.email.clone(),
                    user_full_name: user.full_name.clone(),
                    user_avatar_url: user.avatar_url.clone(),
                })
            })
            .collect()
    }

    async fn insert_notification(
        &self,
        notification: NewNotification,
    ) -> Result<Notification, StoreError> {
        if self.fail_notifications.load(Ordering::SeqCst) {
            return Err(unavailable("notifications"));
        }
        let mut tables = self.tables.lock().unwrap();
        tables.user(&notification.user_id)?;
        let row = Notification {
            id: Uuid::new_v4(),
            user_id: notification.user_id,
            kind: notification.kind,
            title: notification.title,
            message: notification.message,
            read: false,
            link: notification.link,
            created_at: Utc::now(),
        };
        tables.notifications.push(row.clone());
        Ok(row)
    }

    async fn notifications_for(&self, user_id: &str) -> Result<Vec<Notification>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .notifications
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn mark_notification_read(&self, id: Uuid, user_id: &str) -> Result<u64, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let mut affected = 0;
        for notification in tables
            .notifications
            .iter_mut()
            .filter(|n| n.id == id && n.user_id == user_id)
        {
            notification.read = true;
            affected += 1;
        }
        Ok(affected)
    }

    async fn insert_font(&self, font: NewFont) -> Result<FontSummary, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        tables.user(&font.owner_id)?;
        let summary = FontSummary {
            id: Uuid::new_v4(),
            owner_id: font.owner_id,
            file_name: font.file_name,
            content_type: font.content_type,
            size_bytes: font.data.len() as i64,
            created_at: Utc::now(),
        };
        tables.fonts.push(summary.clone());
        Ok(summary)
    }

    async fn fonts_for(&self, owner_id: &str) -> Result<Vec<FontSummary>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .fonts
            .iter()
            .rev()
            .filter(|f| f.owner_id == owner_id)
            .cloned()
            .collect())
    }
}
