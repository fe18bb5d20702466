//! Personal finance tracker
//!
//! REST backend for accounts, categories, budgets, transactions, savings
//! goals and spending reports. Callers authenticate with bearer tokens
//! issued by an external auth provider.

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    middleware, Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
mod error;
pub mod handlers;
pub mod repository;
pub mod state;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use state::AppState;

/// Browsers may cache a preflight answer this long
const CORS_MAX_AGE: Duration = Duration::from_secs(12 * 60 * 60);

/// Initialize tracing/logging. `LOG_FORMAT=json` switches to JSON lines.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "finance_tracker=debug,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// CORS policy for the configured frontend origins
pub fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
        .max_age(CORS_MAX_AGE)
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    // Layers wrap in reverse order: trace -> cors -> logging -> auth -> handler
    let protected_routes = api::create_router().route_layer(middleware::from_fn_with_state(
        state.clone(),
        api::middleware::require_auth,
    ));

    let public_routes = api::public_router().route_layer(middleware::from_fn_with_state(
        state.clone(),
        api::middleware::optional_auth,
    ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(middleware::from_fn(api::middleware::logging_middleware))
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
