//! Category storage

use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::Category;

const CATEGORY_COLUMNS: &str =
    "id, user_id, name, description, color, icon, is_active, created_at, updated_at";

pub const DEFAULT_CATEGORY_COLOR: &str = "#3b82f6";

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub icon: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Active categories of a user, alphabetical
    pub async fn list_active(&self, user_id: Uuid) -> Result<Vec<Category>, sqlx::Error> {
        let sql = format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories \
             WHERE user_id = $1 AND is_active = true \
             ORDER BY name"
        );
        sqlx::query_as(&sql).bind(user_id).fetch_all(&self.pool).await
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Category>, sqlx::Error> {
        let sql =
            format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1 AND is_active = true");
        sqlx::query_as(&sql).bind(id).fetch_optional(&self.pool).await
    }

    pub async fn insert(&self, category: &NewCategory) -> Result<Category, sqlx::Error> {
        let sql = format!(
            "INSERT INTO categories (user_id, name, description, color, icon) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {CATEGORY_COLUMNS}"
        );
        sqlx::query_as(&sql)
            .bind(category.user_id)
            .bind(&category.name)
            .bind(&category.description)
            .bind(&category.color)
            .bind(&category.icon)
            .fetch_one(&self.pool)
            .await
    }

    pub async fn update(&self, category: &Category) -> Result<Category, sqlx::Error> {
        let sql = format!(
            "UPDATE categories SET name = $3, description = $4, color = $5, icon = $6, updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {CATEGORY_COLUMNS}"
        );
        sqlx::query_as(&sql)
            .bind(category.id)
            .bind(category.user_id)
            .bind(&category.name)
            .bind(&category.description)
            .bind(&category.color)
            .bind(&category.icon)
            .fetch_one(&self.pool)
            .await
    }

    pub async fn soft_delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE categories SET is_active = false, updated_at = NOW() WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
