use axum::{Extension, Json};

use crate::identity::CurrentUser;
use crate::models::user::User;

/// GET /api/v1/me
///
/// The signed-in user, or `null` for anonymous callers.
pub async fn handle_me(Extension(current): Extension<CurrentUser>) -> Json<Option<User>> {
    Json(current.0)
}
