pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};

use crate::billing::handlers as billing;
use crate::brand::{handlers as brand, MAX_FONT_BYTES};
use crate::community::handlers as community;
use crate::export::handlers as export;
use crate::generation::handlers as generation;
use crate::identity::{authenticate, handlers as identity};
use crate::palettes::handlers as palettes;
use crate::state::AppState;

/// Generation requests may carry a base64 reference image.
const GENERATE_BODY_LIMIT: usize = 12 * 1024 * 1024;
/// Headroom over the font size cap for multipart framing.
const FONT_BODY_LIMIT: usize = MAX_FONT_BYTES + 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/", get(health::banner_handler))
        .route("/health", get(health::health_handler))
        .route("/api/v1/me", get(identity::handle_me))
        // Palettes
        .route(
            "/api/v1/palettes/generate",
            post(generation::handle_generate).layer(DefaultBodyLimit::max(GENERATE_BODY_LIMIT)),
        )
        .route(
            "/api/v1/palettes",
            get(palettes::handle_list).post(palettes::handle_save),
        )
        .route(
            "/api/v1/palettes/:id",
            get(palettes::handle_get).delete(palettes::handle_delete),
        )
        // Community
        .route(
            "/api/v1/comments/:resource_id",
            get(community::handle_list_comments),
        )
        .route("/api/v1/comments", post(community::handle_add_comment))
        .route(
            "/api/v1/collaborations/:resource_id",
            get(community::handle_list_collaborators),
        )
        .route(
            "/api/v1/collaborations",
            post(community::handle_add_collaboration),
        )
        .route("/api/v1/notifications", get(community::handle_notifications))
        .route(
            "/api/v1/notifications/:id/read",
            post(community::handle_mark_read),
        )
        .route("/api/v1/activity", get(community::handle_activity))
        .route("/api/v1/badges", get(community::handle_badges))
        .route("/api/v1/users/search", get(community::handle_user_search))
        // Billing
        .route("/api/v1/billing/checkout", post(billing::handle_checkout))
        // Brand kit
        .route(
            "/api/v1/brand/fonts",
            get(brand::handle_list_fonts)
                .post(brand::handle_upload_font)
                .layer(DefaultBodyLimit::max(FONT_BODY_LIMIT)),
        )
        // Export
        .route("/export/:id/:format", get(export::handle_export))
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    // Signed by the billing provider, not by a user session.
    api.route("/stripe-webhook", post(billing::handle_webhook))
        .with_state(state)
}
