//! Budget storage

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Budget, BudgetPeriod};

const BUDGET_SELECT: &str = "SELECT b.id, b.user_id, b.category_id, b.name, b.amount, b.period, \
            b.start_date, b.end_date, b.description, b.is_active, b.created_at, b.updated_at, \
            c.name AS category_name, c.color AS category_color, c.icon AS category_icon \
     FROM budgets b \
     LEFT JOIN categories c ON c.id = b.category_id";

#[derive(Debug, Clone)]
pub struct NewBudget {
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub amount: Decimal,
    pub period: BudgetPeriod,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BudgetRepository {
    pool: PgPool,
}

impl BudgetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Active budgets of a user, newest first
    pub async fn list_active(&self, user_id: Uuid) -> Result<Vec<Budget>, sqlx::Error> {
        let sql = format!(
            "{BUDGET_SELECT} WHERE b.user_id = $1 AND b.is_active = true ORDER BY b.created_at DESC"
        );
        sqlx::query_as(&sql).bind(user_id).fetch_all(&self.pool).await
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Budget>, sqlx::Error> {
        let sql = format!("{BUDGET_SELECT} WHERE b.id = $1 AND b.is_active = true");
        sqlx::query_as(&sql).bind(id).fetch_optional(&self.pool).await
    }

    pub async fn insert(&self, budget: &NewBudget) -> Result<Budget, sqlx::Error> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO budgets (user_id, category_id, name, amount, period, start_date, end_date, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(budget.user_id)
        .bind(budget.category_id)
        .bind(&budget.name)
        .bind(budget.amount)
        .bind(budget.period)
        .bind(budget.start_date)
        .bind(budget.end_date)
        .bind(&budget.description)
        .fetch_one(&self.pool)
        .await?;

        self.find(id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn update(&self, budget: &Budget) -> Result<Budget, sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE budgets SET
                category_id = $3, name = $4, amount = $5, period = $6,
                start_date = $7, end_date = $8, description = $9, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(budget.id)
        .bind(budget.user_id)
        .bind(budget.category_id)
        .bind(&budget.name)
        .bind(budget.amount)
        .bind(budget.period)
        .bind(budget.start_date)
        .bind(budget.end_date)
        .bind(&budget.description)
        .execute(&self.pool)
        .await?;

        self.find(budget.id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn soft_delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE budgets SET is_active = false, updated_at = NOW() WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
