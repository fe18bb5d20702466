//! Account storage

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::{Account, AccountType};

const ACCOUNT_COLUMNS: &str =
    "id, user_id, name, account_type, balance, description, is_active, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub user_id: Uuid,
    pub name: String,
    pub account_type: AccountType,
    pub balance: Decimal,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AccountRepository {
    pool: PgPool,
}

impl AccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_active(&self, user_id: Uuid) -> Result<Vec<Account>, sqlx::Error> {
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts \
             WHERE user_id = $1 AND is_active = true \
             ORDER BY created_at DESC"
        );
        sqlx::query_as(&sql).bind(user_id).fetch_all(&self.pool).await
    }

    /// Active account by id, regardless of owner
    pub async fn find(&self, id: Uuid) -> Result<Option<Account>, sqlx::Error> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1 AND is_active = true");
        sqlx::query_as(&sql).bind(id).fetch_optional(&self.pool).await
    }

    pub async fn insert(&self, account: &NewAccount) -> Result<Account, sqlx::Error> {
        let sql = format!(
            "INSERT INTO accounts (user_id, name, account_type, balance, description) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {ACCOUNT_COLUMNS}"
        );
        sqlx::query_as(&sql)
            .bind(account.user_id)
            .bind(&account.name)
            .bind(account.account_type)
            .bind(account.balance)
            .bind(&account.description)
            .fetch_one(&self.pool)
            .await
    }

    /// Persist name, type and description. The balance only moves through
    /// [`AccountRepository::adjust_balance`].
    pub async fn update(&self, account: &Account) -> Result<Account, sqlx::Error> {
        let sql = format!(
            "UPDATE accounts SET name = $3, account_type = $4, description = $5, updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {ACCOUNT_COLUMNS}"
        );
        sqlx::query_as(&sql)
            .bind(account.id)
            .bind(account.user_id)
            .bind(&account.name)
            .bind(account.account_type)
            .bind(&account.description)
            .fetch_one(&self.pool)
            .await
    }

    pub async fn soft_delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE accounts SET is_active = false, updated_at = NOW() WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Add `delta` to an account balance inside an open transaction
    pub async fn adjust_balance(
        tx: &mut Transaction<'_, Postgres>,
        account_id: Uuid,
        delta: Decimal,
    ) -> Result<(), sqlx::Error> {
        if delta.is_zero() {
            return Ok(());
        }

        let rows_affected = sqlx::query(
            "UPDATE accounts SET balance = balance + $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(account_id)
        .bind(delta)
        .execute(&mut **tx)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        Ok(())
    }
}
