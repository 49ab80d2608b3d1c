//! Points and other secondary writes that must never fail the primary operation.
//!
//! Points and activity logs are written independently with no transaction:
//! a failure between them can leave extra points or a missing log entry.

use std::fmt::Display;
use std::future::Future;

use tracing::warn;

use crate::store::Store;

/// Points granted to a user row created on first login.
pub const SIGNUP_POINTS: i32 = 10;
/// Points granted to a user row created by a completed checkout.
pub const BILLING_SIGNUP_POINTS: i32 = 50;

/// A point-earning action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    GeneratePalette,
    SavePalette,
    AddComment,
}

impl Action {
    pub fn action_type(&self) -> &'static str {
        match self {
            Action::GeneratePalette => "palette_generate",
            Action::SavePalette => "palette_save",
            Action::AddComment => "comment_add",
        }
    }

    pub fn points(&self) -> i32 {
        match self {
            Action::GeneratePalette => 5,
            Action::SavePalette => 10,
            Action::AddComment => 2,
        }
    }
}

/// Awaits a secondary write and logs its failure instead of returning it.
pub async fn best_effort<T, E, F>(label: &str, write: F) -> Option<T>
where
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    match write.await {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(task = label, error = %e, "Best-effort write failed");
            None
        }
    }
}

/// Awards the action's points and appends an activity entry, both best-effort.
pub async fn reward(store: &dyn Store, user_id: &str, action: Action) {
    let points = action.points();
    best_effort("award_points", store.add_points(user_id, points)).await;
    best_effort(
        "log_activity",
        store.log_activity(user_id, action.action_type(), points),
    )
    .await;
}
