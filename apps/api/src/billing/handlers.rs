use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::signature::{verify_signature, SIGNATURE_HEADER};
use super::webhook::{reconcile, Event};
use crate::errors::AppError;
use crate::identity::CurrentUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub price_id: String,
}

/// POST /api/v1/billing/checkout
///
/// Anonymous callers may check out; the provider collects their email.
pub async fn handle_checkout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<Value>, AppError> {
    if request.price_id.trim().is_empty() {
        return Err(AppError::Validation("price_id cannot be empty".to_string()));
    }
    let email = current.user().map(|u| u.email.as_str());
    let url = state
        .billing
        .create_checkout_session(email, &request.price_id)
        .await?;
    Ok(Json(json!({ "url": url })))
}

fn webhook_error(reason: impl std::fmt::Display) -> Response {
    (StatusCode::BAD_REQUEST, format!("Webhook Error: {reason}")).into_response()
}

/// POST /stripe-webhook
///
/// Takes the raw body: the signature covers the exact bytes sent.
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let header = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());
    if let Err(e) = verify_signature(
        &body,
        header,
        &state.config.stripe_webhook_secret,
        Utc::now().timestamp(),
    ) {
        warn!(error = %e, "Rejected webhook signature");
        return Ok(webhook_error(e));
    }

    let event: Event = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => return Ok(webhook_error(e)),
    };
    info!(event_type = %event.kind, "Billing webhook received");

    reconcile(
        event,
        state.store.as_ref(),
        state.billing.as_ref(),
        &state.config.plan_prices(),
    )
    .await?;

    Ok(Json(json!({ "received": true })).into_response())
}
