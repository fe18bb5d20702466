//! Public health endpoints

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::db;
use crate::domain::OperationContext;
use crate::state::AppState;

pub const SERVICE_NAME: &str = "personal-finance-backend";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub service: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DatabaseTestResponse {
    pub success: bool,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Routes reachable without a token
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/health", get(health_check))
        .route("/db-test", get(database_test))
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn database_test(
    State(pool): State<PgPool>,
    context: Option<Extension<OperationContext>>,
) -> (StatusCode, Json<DatabaseTestResponse>) {
    let caller = context.and_then(|Extension(ctx)| ctx.user_id());
    tracing::debug!(user_id = ?caller, "Database connectivity test");

    match db::verify_connection(&pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(DatabaseTestResponse {
                success: true,
                message: "Database connection successful".to_string(),
                timestamp: Utc::now(),
            }),
        ),
        Err(err) => {
            tracing::error!(error = %err, "Database connectivity test failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(DatabaseTestResponse {
                    success: false,
                    message: format!("Database connection failed: {err}"),
                    timestamp: Utc::now(),
                }),
            )
        }
    }
}
