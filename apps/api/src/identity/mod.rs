//! Identity provider (Supabase Auth) client and request authentication.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

pub mod handlers;
pub mod middleware;

pub use middleware::{authenticate, CurrentUser};

use crate::models::user::IdentityProfile;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("identity provider rejected token (status {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("identity provider returned a user without an email")]
    MissingEmail,
}

/// User as reported by the identity provider.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityUser {
    pub id: String,
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserMetadata {
    pub display_name: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub picture: Option<String>,
}

impl IdentityUser {
    /// Maps the provider user onto the local profile. Display name falls back
    /// from `display_name` to `full_name` to the email's local part.
    pub fn profile(&self) -> Result<IdentityProfile, IdentityError> {
        let email = self
            .email
            .clone()
            .filter(|e| !e.is_empty())
            .ok_or(IdentityError::MissingEmail)?;
        let meta = &self.user_metadata;
        let full_name = meta
            .display_name
            .clone()
            .or_else(|| meta.full_name.clone())
            .or_else(|| email.split('@').next().map(String::from));
        let avatar_url = meta.avatar_url.clone().or_else(|| meta.picture.clone());
        Ok(IdentityProfile {
            id: self.id.clone(),
            email,
            full_name,
            avatar_url,
        })
    }
}

/// Resolves a bearer token to the provider's user.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn resolve(&self, token: &str) -> Result<IdentityUser, IdentityError>;
}

#[derive(Debug, Deserialize)]
struct SupabaseError {
    #[serde(alias = "error_description", alias = "msg")]
    message: String,
}

/// Supabase Auth `GET /auth/v1/user` client.
#[derive(Clone)]
pub struct SupabaseAuth {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseAuth {
    pub fn new(base_url: &str, anon_key: String) -> Result<Self, IdentityError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(15))
                .build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
        })
    }
}

#[async_trait]
impl IdentityProvider for SupabaseAuth {
    async fn resolve(&self, token: &str) -> Result<IdentityUser, IdentityError> {
        let response = self
            .client
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<SupabaseError>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(IdentityError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}
