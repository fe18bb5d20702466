//! Category Handler

use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Category, OperationContext};
use crate::error::AppError;
use crate::repository::{CategoryRepository, NewCategory, DEFAULT_CATEGORY_COLOR};

use super::{authorize, caller, non_blank_name};
use super::{CreateCategoryCommand, UpdateCategoryCommand};

pub struct CategoryHandler {
    categories: CategoryRepository,
}

impl CategoryHandler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            categories: CategoryRepository::new(pool),
        }
    }

    pub async fn list(&self, context: &OperationContext) -> Result<Vec<Category>, AppError> {
        let user = caller(context)?;
        self.categories
            .list_active(user.user_id)
            .await
            .map_err(AppError::storage("Failed to get categories"))
    }

    pub async fn get(
        &self,
        category_id: Uuid,
        context: &OperationContext,
    ) -> Result<Category, AppError> {
        let user = caller(context)?;
        let category = self
            .categories
            .find(category_id)
            .await
            .map_err(AppError::storage("Failed to get category"))?;

        authorize(category, user)
    }

    pub async fn create(
        &self,
        command: CreateCategoryCommand,
        context: &OperationContext,
    ) -> Result<Category, AppError> {
        let user = caller(context)?;

        let new_category = NewCategory {
            user_id: user.user_id,
            name: non_blank_name(&command.name)?,
            description: command.description,
            color: command
                .color
                .filter(|color| !color.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CATEGORY_COLOR.to_string()),
            icon: command.icon,
        };

        let category = self
            .categories
            .insert(&new_category)
            .await
            .map_err(AppError::storage("Failed to create category"))?;

        tracing::info!(category_id = %category.id, user_id = %user.user_id, "Category created");
        Ok(category)
    }

    pub async fn update(
        &self,
        category_id: Uuid,
        command: UpdateCategoryCommand,
        context: &OperationContext,
    ) -> Result<Category, AppError> {
        let mut category = self.get(category_id, context).await?;

        if let Some(name) = command.name {
            category.name = non_blank_name(&name)?;
        }
        if let Some(description) = command.description {
            category.description = Some(description);
        }
        if let Some(color) = command.color.filter(|color| !color.trim().is_empty()) {
            category.color = color;
        }
        if let Some(icon) = command.icon {
            category.icon = Some(icon);
        }

        self.categories
            .update(&category)
            .await
            .map_err(AppError::storage("Failed to update category"))
    }

    pub async fn delete(
        &self,
        category_id: Uuid,
        context: &OperationContext,
    ) -> Result<(), AppError> {
        let category = self.get(category_id, context).await?;

        self.categories
            .soft_delete(category.id, category.user_id)
            .await
            .map_err(AppError::storage("Failed to delete category"))?;

        tracing::info!(category_id = %category.id, "Category deleted");
        Ok(())
    }
}
