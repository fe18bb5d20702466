//! Account endpoints

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::domain::{Account, AccountType, OperationContext};
use crate::error::AppError;
use crate::handlers::{AccountHandler, CreateAccountCommand, UpdateAccountCommand};

use super::{parse_id, MessageResponse};

const ENTITY: &str = "Account";

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub name: String,
    pub account_type: AccountType,
    #[serde(default)]
    pub balance: Option<Decimal>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AccountsResponse {
    pub accounts: Vec<Account>,
}

pub async fn list_accounts(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
) -> Result<Json<AccountsResponse>, AppError> {
    let handler = AccountHandler::new(pool);
    let accounts = handler.list(&context).await?;

    Ok(Json(AccountsResponse { accounts }))
}

pub async fn create_account(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    body: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Account>), AppError> {
    let Json(request) = body?;

    let command = CreateAccountCommand {
        name: request.name,
        account_type: request.account_type,
        balance: request.balance.unwrap_or(Decimal::ZERO),
        description: request.description,
    };

    let handler = AccountHandler::new(pool);
    let account = handler.create(command, &context).await?;

    Ok((StatusCode::CREATED, Json(account)))
}

pub async fn get_account(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Path(id): Path<String>,
) -> Result<Json<Account>, AppError> {
    let account_id = parse_id(&id, ENTITY)?;
    let handler = AccountHandler::new(pool);

    Ok(Json(handler.get(account_id, &context).await?))
}

pub async fn update_account(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Path(id): Path<String>,
    body: Result<Json<UpdateAccountCommand>, JsonRejection>,
) -> Result<Json<Account>, AppError> {
    let account_id = parse_id(&id, ENTITY)?;
    let Json(command) = body?;
    let handler = AccountHandler::new(pool);

    Ok(Json(handler.update(account_id, command, &context).await?))
}

pub async fn delete_account(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let account_id = parse_id(&id, ENTITY)?;
    let handler = AccountHandler::new(pool);
    handler.delete(account_id, &context).await?;

    Ok(Json(MessageResponse::new("Account deleted successfully")))
}
