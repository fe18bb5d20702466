//! Budget endpoints

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::period::parse_date;
use crate::domain::{Budget, BudgetPeriod, OperationContext};
use crate::error::AppError;
use crate::handlers::{BudgetHandler, CreateBudgetCommand, UpdateBudgetCommand};

use super::{optional_date, parse_id, MessageResponse};

const ENTITY: &str = "Budget";

#[derive(Debug, Deserialize)]
pub struct CreateBudgetRequest {
    pub name: String,
    pub category_id: Uuid,
    pub amount: Decimal,
    #[serde(default)]
    pub period: Option<BudgetPeriod>,
    /// `YYYY-MM-DD`
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBudgetRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub period: Option<BudgetPeriod>,
    #[serde(default)]
    pub start_date: Option<String>,
    /// Empty string removes the end date
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BudgetsResponse {
    pub budgets: Vec<Budget>,
}

pub async fn list_budgets(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
) -> Result<Json<BudgetsResponse>, AppError> {
    let handler = BudgetHandler::new(pool);
    let budgets = handler.list(&context).await?;

    Ok(Json(BudgetsResponse { budgets }))
}

pub async fn create_budget(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    body: Result<Json<CreateBudgetRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Budget>), AppError> {
    let Json(request) = body?;

    let command = CreateBudgetCommand {
        name: request.name,
        category_id: request.category_id,
        amount: request.amount,
        period: request.period.unwrap_or_default(),
        start_date: parse_date(&request.start_date, "start_date")?,
        end_date: optional_date(request.end_date.as_deref(), "end_date")?,
        description: request.description,
    };

    let handler = BudgetHandler::new(pool);
    let budget = handler.create(command, &context).await?;

    Ok((StatusCode::CREATED, Json(budget)))
}

pub async fn get_budget(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Path(id): Path<String>,
) -> Result<Json<Budget>, AppError> {
    let budget_id = parse_id(&id, ENTITY)?;
    let handler = BudgetHandler::new(pool);

    Ok(Json(handler.get(budget_id, &context).await?))
}

pub async fn update_budget(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Path(id): Path<String>,
    body: Result<Json<UpdateBudgetRequest>, JsonRejection>,
) -> Result<Json<Budget>, AppError> {
    let budget_id = parse_id(&id, ENTITY)?;
    let Json(request) = body?;

    let start_date = match request.start_date.as_deref() {
        Some(raw) => Some(parse_date(raw, "start_date")?),
        None => None,
    };
    let end_date = match request.end_date.as_deref() {
        Some(raw) => Some(optional_date(Some(raw), "end_date")?),
        None => None,
    };

    let command = UpdateBudgetCommand {
        name: request.name,
        category_id: request.category_id,
        amount: request.amount,
        period: request.period,
        start_date,
        end_date,
        description: request.description,
    };

    let handler = BudgetHandler::new(pool);
    Ok(Json(handler.update(budget_id, command, &context).await?))
}

pub async fn delete_budget(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let budget_id = parse_id(&id, ENTITY)?;
    let handler = BudgetHandler::new(pool);
    handler.delete(budget_id, &context).await?;

    Ok(Json(MessageResponse::new("Budget deleted successfully")))
}
