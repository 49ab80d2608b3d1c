use std::sync::Arc;

use crate::billing::BillingProvider;
use crate::config::Config;
use crate::generation::gateway::PaletteGateway;
use crate::identity::IdentityProvider;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Persistence. `PgStore` in production.
    pub store: Arc<dyn Store>,
    /// Palette generation with ordered model fallback.
    pub gateway: PaletteGateway,
    /// Resolves bearer tokens to identity-provider users.
    pub identity: Arc<dyn IdentityProvider>,
    pub billing: Arc<dyn BillingProvider>,
    pub config: Config,
}
