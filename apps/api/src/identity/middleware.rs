use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::models::user::User;
use crate::rewards::SIGNUP_POINTS;
use crate::state::AppState;

/// The local user behind the request, if any. Inserted by [`authenticate`].
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<User>);

impl CurrentUser {
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }

    /// Rejects anonymous requests before any work is done.
    pub fn require(&self) -> Result<&User, AppError> {
        self.0.as_ref().ok_or(AppError::Unauthorized)
    }
}

/// Resolves the bearer token (if any) and syncs the local user row by email.
///
/// A missing or rejected token leaves the request anonymous, and so does a
/// failed local sync; handlers that need a user reject it themselves.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let current = match bearer_token(req.headers()) {
        Some(token) => resolve_user(&state, token).await,
        None => CurrentUser::default(),
    };
    req.extensions_mut().insert(current);
    next.run(req).await
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

async fn resolve_user(state: &AppState, token: &str) -> CurrentUser {
    let profile = match state
        .identity
        .resolve(token)
        .await
        .and_then(|user| user.profile())
    {
        Ok(profile) => profile,
        Err(e) => {
            warn!(error = %e, "Identity provider did not accept token; continuing anonymously");
            return CurrentUser::default();
        }
    };

    match state.store.sync_identity_user(&profile, SIGNUP_POINTS).await {
        Ok(user) => {
            debug!(user_id = %user.id, email = %user.email, "Session active");
            CurrentUser(Some(user))
        }
        Err(e) => {
            warn!(error = %e, identity_id = %profile.id, "Local user sync failed; continuing anonymously");
            CurrentUser::default()
        }
    }
}
