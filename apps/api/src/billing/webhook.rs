//! Applies verified billing events to local plan state.

use serde::Deserialize;
use tracing::{info, warn};

use super::{BillingError, BillingProvider, PlanPrices};
use crate::errors::AppError;
use crate::models::user::{BillingLink, PlanTier};
use crate::rewards::BILLING_SIGNUP_POINTS;
use crate::store::Store;

pub const CHECKOUT_COMPLETED: &str = "checkout.session.completed";
pub const SUBSCRIPTION_DELETED: &str = "customer.subscription.deleted";

#[derive(Debug, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub data: EventData,
}

#[derive(Debug, Deserialize)]
pub struct EventData {
    pub object: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct CheckoutSession {
    customer: Option<String>,
    customer_email: Option<String>,
    customer_details: Option<CustomerDetails>,
    subscription: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CustomerDetails {
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Subscription {
    id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    PlanUpdated { user_id: String, plan: PlanTier },
    Downgraded { users: u64 },
    Ignored,
}

/// Dispatches one event. Unknown event types are acknowledged untouched.
pub async fn reconcile(
    event: Event,
    store: &dyn Store,
    billing: &dyn BillingProvider,
    prices: &PlanPrices,
) -> Result<Outcome, AppError> {
    match event.kind.as_str() {
        CHECKOUT_COMPLETED => {
            let session: CheckoutSession =
                serde_json::from_value(event.data.object).map_err(BillingError::from)?;
            checkout_completed(session, store, billing, prices).await
        }
        SUBSCRIPTION_DELETED => {
            let subscription: Subscription =
                serde_json::from_value(event.data.object).map_err(BillingError::from)?;
            let users = store.downgrade_subscription(&subscription.id).await?;
            info!(subscription_id = %subscription.id, users, "Subscription cancelled, downgraded to FREE");
            Ok(Outcome::Downgraded { users })
        }
        other => {
            info!(event_type = other, event_id = ?event.id, "Ignoring billing event");
            Ok(Outcome::Ignored)
        }
    }
}

async fn checkout_completed(
    session: CheckoutSession,
    store: &dyn Store,
    billing: &dyn BillingProvider,
    prices: &PlanPrices,
) -> Result<Outcome, AppError> {
    let email = session
        .customer_details
        .and_then(|details| details.email)
        .or(session.customer_email)
        .filter(|email| !email.is_empty())
        .ok_or(BillingError::MissingField("customer email"))?;
    let subscription_id = session
        .subscription
        .ok_or(BillingError::MissingField("subscription"))?;

    let price_id = billing.subscription_price(&subscription_id).await?;
    let plan = prices.plan_for(&price_id);
    if plan == PlanTier::Free {
        warn!(price_id = %price_id, "Checkout completed with an unrecognised price");
    }

    let link = BillingLink {
        email,
        plan,
        customer_id: session.customer,
        subscription_id,
    };
    let user = store
        .upsert_billing_user(&link, BILLING_SIGNUP_POINTS)
        .await?;
    info!(user_id = %user.id, email = %user.email, plan = %plan, "Plan updated from checkout");

    Ok(Outcome::PlanUpdated {
        user_id: user.id,
        plan,
    })
}
