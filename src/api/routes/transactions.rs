//! Transaction endpoints

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{OperationContext, Transaction, TransactionType};
use crate::error::AppError;
use crate::handlers::{CreateTransactionCommand, TransactionHandler, UpdateTransactionCommand};
use crate::repository::{TransactionFilter, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

use super::{optional_date, optional_uuid, parse_id};

const ENTITY: &str = "Transaction";

#[derive(Debug, Default, Deserialize)]
pub struct TransactionsQuery {
    pub account_id: Option<String>,
    pub category_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl TransactionsQuery {
    fn into_filter(self) -> Result<TransactionFilter, AppError> {
        // Unparseable paging values fall back to the defaults
        let limit = self
            .limit
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .filter(|limit| *limit > 0)
            .map_or(DEFAULT_PAGE_SIZE, |limit| limit.min(MAX_PAGE_SIZE));
        let offset = self
            .offset
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .map_or(0, |offset| offset.max(0));

        Ok(TransactionFilter {
            account_id: optional_uuid(self.account_id.as_deref(), "account_id")?,
            category_id: optional_uuid(self.category_id.as_deref(), "category_id")?,
            start_date: optional_date(self.start_date.as_deref(), "start_date")?,
            end_date: optional_date(self.end_date.as_deref(), "end_date")?,
            limit,
            offset,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    pub account_id: Uuid,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub description: Option<String>,
    /// `YYYY-MM-DD`, defaults to today
    #[serde(default)]
    pub transaction_date: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTransactionRequest {
    #[serde(default)]
    pub account_id: Option<Uuid>,
    /// Empty string removes the category
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub transaction_type: Option<TransactionType>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub transaction_date: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TransactionsResponse {
    pub transactions: Vec<Transaction>,
    pub limit: i64,
    pub offset: i64,
}

pub async fn list_transactions(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Query(query): Query<TransactionsQuery>,
) -> Result<Json<TransactionsResponse>, AppError> {
    let filter = query.into_filter()?;
    let handler = TransactionHandler::new(pool);
    let transactions = handler.list(&filter, &context).await?;

    Ok(Json(TransactionsResponse {
        transactions,
        limit: filter.limit,
        offset: filter.offset,
    }))
}

pub async fn create_transaction(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    body: Result<Json<CreateTransactionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Transaction>), AppError> {
    let Json(request) = body?;

    let command =
        CreateTransactionCommand::new(request.account_id, request.amount, request.transaction_type)
            .with_category(request.category_id)
            .with_description(request.description)
            .with_date(optional_date(
                request.transaction_date.as_deref(),
                "transaction_date",
            )?)
            .with_notes(request.notes);

    let handler = TransactionHandler::new(pool);
    let transaction = handler.create(command, &context).await?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

pub async fn get_transaction(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Path(id): Path<String>,
) -> Result<Json<Transaction>, AppError> {
    let transaction_id = parse_id(&id, ENTITY)?;
    let handler = TransactionHandler::new(pool);

    Ok(Json(handler.get(transaction_id, &context).await?))
}

pub async fn update_transaction(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Path(id): Path<String>,
    body: Result<Json<UpdateTransactionRequest>, JsonRejection>,
) -> Result<Json<Transaction>, AppError> {
    let transaction_id = parse_id(&id, ENTITY)?;
    let Json(request) = body?;

    let category_id = match request.category_id.as_deref() {
        Some(raw) => Some(optional_uuid(Some(raw), "category_id")?),
        None => None,
    };

    let command = UpdateTransactionCommand {
        account_id: request.account_id,
        category_id,
        amount: request.amount,
        transaction_type: request.transaction_type,
        description: request.description,
        transaction_date: optional_date(request.transaction_date.as_deref(), "transaction_date")?,
        notes: request.notes,
    };

    let handler = TransactionHandler::new(pool);
    Ok(Json(handler.update(transaction_id, command, &context).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_defaults() {
        let filter = TransactionsQuery::default().into_filter().unwrap();
        assert_eq!(filter.limit, DEFAULT_PAGE_SIZE);
        assert_eq!(filter.offset, 0);
        assert!(filter.account_id.is_none());
    }

    #[test]
    fn test_query_clamps_paging() {
        let query = TransactionsQuery {
            limit: Some("5000".to_string()),
            offset: Some("-3".to_string()),
            ..Default::default()
        };
        let filter = query.into_filter().unwrap();
        assert_eq!(filter.limit, MAX_PAGE_SIZE);
        assert_eq!(filter.offset, 0);

        let query = TransactionsQuery {
            limit: Some("abc".to_string()),
            ..Default::default()
        };
        assert_eq!(query.into_filter().unwrap().limit, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_query_rejects_bad_filters() {
        let query = TransactionsQuery {
            account_id: Some("xyz".to_string()),
            ..Default::default()
        };
        assert!(matches!(query.into_filter(), Err(AppError::Validation(_))));

        let query = TransactionsQuery {
            start_date: Some("2024-13-01".to_string()),
            ..Default::default()
        };
        assert!(matches!(query.into_filter(), Err(AppError::Period(_))));
    }
}
