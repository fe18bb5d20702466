//! Category endpoints

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use sqlx::PgPool;

use crate::domain::{Category, OperationContext};
use crate::error::AppError;
use crate::handlers::{CategoryHandler, CreateCategoryCommand, UpdateCategoryCommand};

use super::{parse_id, MessageResponse};

const ENTITY: &str = "Category";

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<Category>,
}

pub async fn list_categories(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
) -> Result<Json<CategoriesResponse>, AppError> {
    let handler = CategoryHandler::new(pool);
    let categories = handler.list(&context).await?;

    Ok(Json(CategoriesResponse { categories }))
}

pub async fn create_category(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    body: Result<Json<CreateCategoryCommand>, JsonRejection>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let Json(command) = body?;
    let handler = CategoryHandler::new(pool);
    let category = handler.create(command, &context).await?;

    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn get_category(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Path(id): Path<String>,
) -> Result<Json<Category>, AppError> {
    let category_id = parse_id(&id, ENTITY)?;
    let handler = CategoryHandler::new(pool);

    Ok(Json(handler.get(category_id, &context).await?))
}

pub async fn update_category(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Path(id): Path<String>,
    body: Result<Json<UpdateCategoryCommand>, JsonRejection>,
) -> Result<Json<Category>, AppError> {
    let category_id = parse_id(&id, ENTITY)?;
    let Json(command) = body?;
    let handler = CategoryHandler::new(pool);

    Ok(Json(handler.update(category_id, command, &context).await?))
}

pub async fn delete_category(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let category_id = parse_id(&id, ENTITY)?;
    let handler = CategoryHandler::new(pool);
    handler.delete(category_id, &context).await?;

    Ok(Json(MessageResponse::new("Category deleted successfully")))
}
