mod billing;
mod brand;
mod community;
mod config;
mod db;
mod errors;
mod export;
mod generation;
mod identity;
mod llm_client;
mod models;
mod palettes;
mod plans;
mod rewards;
mod routes;
mod state;
mod store;
#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::billing::StripeClient;
use crate::config::Config;
use crate::db::create_pool;
use crate::generation::gateway::PaletteGateway;
use crate::identity::SupabaseAuth;
use crate::llm_client::GeminiClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::PgStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Aura API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&db).await?;
    info!("Database migrations applied");
    let store = Arc::new(PgStore::new(db));

    // Generation models, tried in order
    let gemini = GeminiClient::new(config.gemini_api_key.clone())?;
    let gateway = PaletteGateway::new(config.gemini_models.clone(), Arc::new(gemini));
    info!(models = ?gateway.models(), "Palette gateway initialized");

    let identity = Arc::new(SupabaseAuth::new(
        &config.supabase_url,
        config.supabase_anon_key.clone(),
    )?);
    let billing = Arc::new(StripeClient::new(
        config.stripe_secret_key.clone(),
        config.frontend_url.clone(),
    )?);
    info!("Identity and billing clients initialized");

    // Build app state
    let state = AppState {
        store,
        gateway,
        identity,
        billing,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
