use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;

/// Subscription level. Ordered so that `plan >= PlanTier::Plus` reads as a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlanTier {
    Free,
    Plus,
    Pro,
}

#[derive(Debug, Error)]
#[error("unknown plan tier: {0}")]
pub struct UnknownPlan(pub String);

impl PlanTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Free => "FREE",
            PlanTier::Plus => "PLUS",
            PlanTier::Pro => "PRO",
        }
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanTier {
    type Err = UnknownPlan;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FREE" => Ok(PlanTier::Free),
            "PLUS" => Ok(PlanTier::Plus),
            "PRO" => Ok(PlanTier::Pro),
            other => Err(UnknownPlan(other.to_string())),
        }
    }
}

impl TryFrom<String> for PlanTier {
    type Error = UnknownPlan;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    #[sqlx(try_from = "String")]
    pub plan: PlanTier,
    pub points: i32,
    #[serde(skip_serializing)]
    pub stripe_customer_id: Option<String>,
    #[serde(skip_serializing)]
    pub stripe_subscription_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Identity-provider view of a user, used to upsert the local row on login.
#[derive(Debug, Clone)]
pub struct IdentityProfile {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Billing-provider view of a user, used to upsert the local row from a webhook.
#[derive(Debug, Clone)]
pub struct BillingLink {
    pub email: String,
    pub plan: PlanTier,
    pub customer_id: Option<String>,
    pub subscription_id: String,
}
