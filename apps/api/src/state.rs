use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::IdentityProvider;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Resolves bearer tokens to users. Default: `SupabaseIdentity`.
    pub identity: Arc<dyn IdentityProvider>,
}
