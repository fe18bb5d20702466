//! Shared application state

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::auth::TokenVerifier;
use crate::config::Config;

/// State cloned into every request
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub verifier: Arc<TokenVerifier>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(pool: PgPool, verifier: TokenVerifier, config: Config) -> Self {
        Self {
            pool,
            verifier: Arc::new(verifier),
            config: Arc::new(config),
        }
    }
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Arc<TokenVerifier> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.verifier)
    }
}
