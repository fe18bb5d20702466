//! Goal storage

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::Goal;

const GOAL_COLUMNS: &str = "id, user_id, name, description, target_amount, current_amount, \
     target_date, is_completed, is_active, created_at, updated_at";

/// Fields supplied when creating a goal
#[derive(Debug, Clone)]
pub struct NewGoal {
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub target_amount: Decimal,
    pub target_date: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct GoalRepository {
    pool: PgPool,
}

impl GoalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Active goals of a user, newest first
    pub async fn list_active(&self, user_id: Uuid) -> Result<Vec<Goal>, sqlx::Error> {
        let sql = format!(
            "SELECT {GOAL_COLUMNS} FROM goals \
             WHERE user_id = $1 AND is_active = true \
             ORDER BY created_at DESC"
        );
        sqlx::query_as(&sql).bind(user_id).fetch_all(&self.pool).await
    }

    /// Active goal by id, regardless of owner
    pub async fn find(&self, id: Uuid) -> Result<Option<Goal>, sqlx::Error> {
        let sql = format!("SELECT {GOAL_COLUMNS} FROM goals WHERE id = $1 AND is_active = true");
        sqlx::query_as(&sql).bind(id).fetch_optional(&self.pool).await
    }

    pub async fn insert(&self, goal: &NewGoal) -> Result<Goal, sqlx::Error> {
        let sql = format!(
            "INSERT INTO goals (user_id, name, description, target_amount, current_amount, target_date) \
             VALUES ($1, $2, $3, $4, 0, $5) \
             RETURNING {GOAL_COLUMNS}"
        );
        sqlx::query_as(&sql)
            .bind(goal.user_id)
            .bind(&goal.name)
            .bind(&goal.description)
            .bind(goal.target_amount)
            .bind(goal.target_date)
            .fetch_one(&self.pool)
            .await
    }

    /// Lock the caller's active goal, apply `change` to it and store the
    /// result in one database transaction.
    ///
    /// Returns `None` when no such goal exists. Overlapping updates of the
    /// same goal see each other's writes.
    pub async fn update_locked<F>(
        &self,
        id: Uuid,
        user_id: Uuid,
        change: F,
    ) -> Result<Option<Goal>, sqlx::Error>
    where
        F: FnOnce(&mut Goal),
    {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "SELECT {GOAL_COLUMNS} FROM goals \
             WHERE id = $1 AND user_id = $2 AND is_active = true \
             FOR UPDATE"
        );
        let goal: Option<Goal> = sqlx::query_as(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(mut goal) = goal else {
            return Ok(None);
        };

        change(&mut goal);

        let sql = format!(
            "UPDATE goals SET \
                name = $3, description = $4, target_amount = $5, current_amount = $6, \
                target_date = $7, is_completed = $8, updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {GOAL_COLUMNS}"
        );
        let stored = sqlx::query_as(&sql)
            .bind(goal.id)
            .bind(goal.user_id)
            .bind(&goal.name)
            .bind(&goal.description)
            .bind(goal.target_amount)
            .bind(goal.current_amount)
            .bind(goal.target_date)
            .bind(goal.is_completed)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(stored))
    }

    /// Mark a goal inactive. Returns false when nothing matched.
    pub async fn soft_delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE goals SET is_active = false, updated_at = NOW() WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
