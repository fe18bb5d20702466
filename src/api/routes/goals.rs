//! Goal endpoints

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::domain::{Goal, GoalProgress, OperationContext};
use crate::error::AppError;
use crate::handlers::{CreateGoalCommand, GoalHandler, UpdateGoalCommand, UpdateGoalProgressCommand};

use super::{optional_date, parse_id, MessageResponse};

const ENTITY: &str = "Goal";

#[derive(Debug, Deserialize)]
pub struct CreateGoalRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub target_amount: Decimal,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub target_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateGoalRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub target_amount: Option<Decimal>,
    #[serde(default)]
    pub current_amount: Option<Decimal>,
    /// `YYYY-MM-DD`, or empty to clear
    #[serde(default)]
    pub target_date: Option<String>,
    #[serde(default)]
    pub is_completed: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProgressRequest {
    pub amount: Decimal,
    #[serde(default)]
    pub set_absolute: bool,
}

#[derive(Debug, Serialize)]
pub struct GoalsResponse {
    pub goals: Vec<Goal>,
}

// =========================================================================
// GET /api/goals
// =========================================================================

pub async fn list_goals(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
) -> Result<Json<GoalsResponse>, AppError> {
    let handler = GoalHandler::new(pool);
    let goals = handler.list(&context).await?;

    Ok(Json(GoalsResponse { goals }))
}

// =========================================================================
// POST /api/goals
// =========================================================================

pub async fn create_goal(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    body: Result<Json<CreateGoalRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Goal>), AppError> {
    let Json(request) = body?;
    let handler = GoalHandler::new(pool);

    let command = CreateGoalCommand::new(request.name, request.target_amount)
        .with_description(request.description)
        .with_target_date(optional_date(request.target_date.as_deref(), "target_date")?);

    let goal = handler.create(command, &context).await?;

    Ok((StatusCode::CREATED, Json(goal)))
}

// =========================================================================
// GET /api/goals/:id
// =========================================================================

pub async fn get_goal(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Path(id): Path<String>,
) -> Result<Json<Goal>, AppError> {
    let goal_id = parse_id(&id, ENTITY)?;
    let handler = GoalHandler::new(pool);

    Ok(Json(handler.get(goal_id, &context).await?))
}

// =========================================================================
// PUT /api/goals/:id
// =========================================================================

pub async fn update_goal(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Path(id): Path<String>,
    body: Result<Json<UpdateGoalRequest>, JsonRejection>,
) -> Result<Json<Goal>, AppError> {
    let goal_id = parse_id(&id, ENTITY)?;
    let Json(request) = body?;

    let target_date = match request.target_date {
        Some(raw) => Some(optional_date(Some(&raw), "target_date")?),
        None => None,
    };

    let command = UpdateGoalCommand {
        name: request.name,
        description: request.description,
        target_amount: request.target_amount,
        current_amount: request.current_amount,
        target_date,
        is_completed: request.is_completed,
    };

    let handler = GoalHandler::new(pool);
    Ok(Json(handler.update(goal_id, command, &context).await?))
}

// =========================================================================
// DELETE /api/goals/:id
// =========================================================================

pub async fn delete_goal(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let goal_id = parse_id(&id, ENTITY)?;
    let handler = GoalHandler::new(pool);
    handler.delete(goal_id, &context).await?;

    Ok(Json(MessageResponse::new("Goal deleted successfully")))
}

// =========================================================================
// GET /api/goals/:id/progress
// =========================================================================

pub async fn get_goal_progress(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Path(id): Path<String>,
) -> Result<Json<GoalProgress>, AppError> {
    let goal_id = parse_id(&id, ENTITY)?;
    let handler = GoalHandler::new(pool);
    let today = Utc::now().date_naive();

    Ok(Json(handler.progress(goal_id, today, &context).await?))
}

// =========================================================================
// PATCH /api/goals/:id/progress
// =========================================================================

pub async fn update_goal_progress(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Path(id): Path<String>,
    body: Result<Json<UpdateProgressRequest>, JsonRejection>,
) -> Result<Json<Goal>, AppError> {
    let goal_id = parse_id(&id, ENTITY)?;
    let Json(request) = body?;

    let command = UpdateGoalProgressCommand::new(request.amount).absolute(request.set_absolute);
    let handler = GoalHandler::new(pool);

    Ok(Json(handler.update_progress(goal_id, command, &context).await?))
}
