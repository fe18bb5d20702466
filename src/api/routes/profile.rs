//! Identity and profile endpoints

use axum::{
    extract::{rejection::JsonRejection, Extension, State},
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::domain::{AuthenticatedUser, OperationContext, Profile, User};
use crate::error::AppError;
use crate::handlers::ProfileHandler;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    #[serde(flatten)]
    pub identity: AuthenticatedUser,
    /// Auth account row, absent when the provider has none for this subject
    pub user: Option<User>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub currency_preference: Option<String>,
}

/// GET /api/me
pub async fn me(
    State(pool): State<PgPool>,
    Extension(identity): Extension<AuthenticatedUser>,
    Extension(context): Extension<OperationContext>,
) -> Result<Json<MeResponse>, AppError> {
    let handler = ProfileHandler::new(pool);
    let user = handler.account(&context).await?;

    Ok(Json(MeResponse { identity, user }))
}

/// GET /api/profile
pub async fn get_profile(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
) -> Result<Json<Profile>, AppError> {
    let handler = ProfileHandler::new(pool);
    Ok(Json(handler.get(&context).await?))
}

/// PUT /api/profile
pub async fn update_profile(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    body: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<Profile>, AppError> {
    let Json(request) = body?;
    let handler = ProfileHandler::new(pool);

    Ok(Json(
        handler
            .update(request.full_name, request.currency_preference, &context)
            .await?,
    ))
}
