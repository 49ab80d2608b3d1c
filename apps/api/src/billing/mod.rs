//! Billing provider (Stripe): checkout sessions and subscription lookups.
//! Webhook verification and plan reconciliation live in the submodules.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::models::user::PlanTier;

pub mod handlers;
pub mod signature;
pub mod webhook;

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

#[derive(Debug, Error)]
pub enum BillingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Stripe error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("malformed event payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("event is missing {0}")]
    MissingField(&'static str),
}

#[async_trait]
pub trait BillingProvider: Send + Sync {
    /// Creates a subscription checkout session and returns its hosted URL.
    async fn create_checkout_session(
        &self,
        customer_email: Option<&str>,
        price_id: &str,
    ) -> Result<String, BillingError>;

    /// Returns the price id of the subscription's first item.
    async fn subscription_price(&self, subscription_id: &str) -> Result<String, BillingError>;
}

/// Maps configured price ids onto plan tiers.
#[derive(Debug, Clone)]
pub struct PlanPrices {
    pub plus: String,
    pub pro: String,
}

impl PlanPrices {
    /// Unknown prices map to FREE.
    pub fn plan_for(&self, price_id: &str) -> PlanTier {
        if price_id == self.pro {
            PlanTier::Pro
        } else if price_id == self.plus {
            PlanTier::Plus
        } else {
            PlanTier::Free
        }
    }
}

#[derive(Debug, Deserialize)]
struct CheckoutSessionCreated {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionObject {
    items: SubscriptionItems,
}

#[derive(Debug, Deserialize)]
struct SubscriptionItems {
    data: Vec<SubscriptionItem>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionItem {
    price: Price,
}

#[derive(Debug, Deserialize)]
struct Price {
    id: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorBody,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    message: String,
}

/// Stripe REST client (form-encoded requests, bearer secret key).
#[derive(Clone)]
pub struct StripeClient {
    client: Client,
    secret_key: String,
    frontend_url: String,
}

impl StripeClient {
    pub fn new(secret_key: String, frontend_url: String) -> Result<Self, BillingError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()?,
            secret_key,
            frontend_url,
        })
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, BillingError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<StripeErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(BillingError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl BillingProvider for StripeClient {
    async fn create_checkout_session(
        &self,
        customer_email: Option<&str>,
        price_id: &str,
    ) -> Result<String, BillingError> {
        info!(price_id, has_email = customer_email.is_some(), "Creating checkout session");

        let mut form: Vec<(&str, String)> = vec![
            ("mode", "subscription".to_string()),
            ("payment_method_types[0]", "card".to_string()),
            ("allow_promotion_codes", "true".to_string()),
            ("line_items[0][price]", price_id.to_string()),
            ("line_items[0][quantity]", "1".to_string()),
            (
                "success_url",
                format!(
                    "{}/success?session_id={{CHECKOUT_SESSION_ID}}",
                    self.frontend_url
                ),
            ),
            ("cancel_url", format!("{}/pricing", self.frontend_url)),
        ];
        if let Some(email) = customer_email {
            form.push(("customer_email", email.to_string()));
        }

        let response = self
            .client
            .post(format!("{STRIPE_API_BASE}/checkout/sessions"))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await?;

        let session: CheckoutSessionCreated = Self::read_json(response).await?;
        session.url.ok_or(BillingError::MissingField("checkout url"))
    }

    async fn subscription_price(&self, subscription_id: &str) -> Result<String, BillingError> {
        let response = self
            .client
            .get(format!("{STRIPE_API_BASE}/subscriptions/{subscription_id}"))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;

        let subscription: SubscriptionObject = Self::read_json(response).await?;
        subscription
            .items
            .data
            .into_iter()
            .next()
            .map(|item| item.price.id)
            .ok_or(BillingError::MissingField("subscription price"))
    }
}
