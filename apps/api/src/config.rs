use anyhow::{bail, Context, Result};

use crate::billing::PlanPrices;
use crate::generation::gateway::DEFAULT_MODELS;

const DEFAULT_FRONTEND_URL: &str = "https://chroma-sync-aura.vercel.app";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub gemini_api_key: String,
    /// Candidate generation models, highest priority first.
    pub gemini_models: Vec<String>,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub stripe_secret_key: String,
    pub stripe_webhook_secret: String,
    pub stripe_price_plus: String,
    pub stripe_price_pro: String,
    pub frontend_url: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let gemini_models = match std::env::var("GEMINI_MODELS") {
            Ok(raw) => parse_model_list(&raw)?,
            Err(_) => DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
        };

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            gemini_models,
            supabase_url: require_env("SUPABASE_URL")?,
            supabase_anon_key: require_env("SUPABASE_ANON_KEY")?,
            stripe_secret_key: require_env("STRIPE_SECRET_KEY")?,
            stripe_webhook_secret: require_env("STRIPE_WEBHOOK_SECRET")?,
            stripe_price_plus: require_env("STRIPE_PRICE_PLUS")?,
            stripe_price_pro: require_env("STRIPE_PRICE_PRO")?,
            frontend_url: std::env::var("FRONTEND_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_FRONTEND_URL.to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn plan_prices(&self) -> PlanPrices {
        PlanPrices {
            plus: self.stripe_price_plus.clone(),
            pro: self.stripe_price_pro.clone(),
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Parses a comma-separated model list, preserving order.
fn parse_model_list(raw: &str) -> Result<Vec<String>> {
    let models: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(String::from)
        .collect();
    if models.is_empty() {
        bail!("GEMINI_MODELS must name at least one model");
    }
    Ok(models)
}
