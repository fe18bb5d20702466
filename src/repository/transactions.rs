//! Transaction storage
//!
//! Writes go through a database transaction that also moves the balance of
//! the affected accounts, so a stored transaction and its balance effect
//! never diverge.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{DateRange, ReportTransaction, Transaction, TransactionType};

use super::AccountRepository;

const TRANSACTION_SELECT: &str = "SELECT t.id, t.user_id, t.account_id, t.category_id, t.amount, \
            t.transaction_type, t.description, t.transaction_date, t.notes, t.transfer_id, \
            t.created_at, t.updated_at, \
            a.name AS account_name, a.account_type, \
            c.name AS category_name, c.color AS category_color \
     FROM transactions t \
     LEFT JOIN accounts a ON a.id = t.account_id \
     LEFT JOIN categories c ON c.id = t.category_id";

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 1000;

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub user_id: Uuid,
    pub account_id: Uuid,
    pub category_id: Option<Uuid>,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub description: Option<String>,
    pub transaction_date: NaiveDate,
    pub notes: Option<String>,
    pub transfer_id: Option<Uuid>,
}

/// Optional filters for listing transactions
#[derive(Debug, Clone)]
pub struct TransactionFilter {
    pub account_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for TransactionFilter {
    fn default() -> Self {
        Self {
            account_id: None,
            category_id: None,
            start_date: None,
            end_date: None,
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: PgPool,
}

impl TransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Transactions of a user, most recent first
    pub async fn list(
        &self,
        user_id: Uuid,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, sqlx::Error> {
        let sql = format!(
            "{TRANSACTION_SELECT} \
             WHERE t.user_id = $1 \
               AND ($2::uuid IS NULL OR t.account_id = $2) \
               AND ($3::uuid IS NULL OR t.category_id = $3) \
               AND ($4::date IS NULL OR t.transaction_date >= $4) \
               AND ($5::date IS NULL OR t.transaction_date <= $5) \
             ORDER BY t.transaction_date DESC, t.created_at DESC \
             LIMIT $6 OFFSET $7"
        );
        sqlx::query_as(&sql)
            .bind(user_id)
            .bind(filter.account_id)
            .bind(filter.category_id)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .bind(filter.limit.clamp(1, MAX_PAGE_SIZE))
            .bind(filter.offset.max(0))
            .fetch_all(&self.pool)
            .await
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Transaction>, sqlx::Error> {
        let sql = format!("{TRANSACTION_SELECT} WHERE t.id = $1");
        sqlx::query_as(&sql).bind(id).fetch_optional(&self.pool).await
    }

    /// Store a transaction and apply its effect to the account balance
    pub async fn insert(&self, new: &NewTransaction) -> Result<Transaction, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO transactions (
                user_id, account_id, category_id, amount, transaction_type,
                description, transaction_date, notes, transfer_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(new.user_id)
        .bind(new.account_id)
        .bind(new.category_id)
        .bind(new.amount)
        .bind(new.transaction_type)
        .bind(&new.description)
        .bind(new.transaction_date)
        .bind(&new.notes)
        .bind(new.transfer_id)
        .fetch_one(&mut *tx)
        .await?;

        AccountRepository::adjust_balance(
            &mut tx,
            new.account_id,
            new.transaction_type.balance_effect(new.amount),
        )
        .await?;

        tx.commit().await?;

        tracing::debug!(
            transaction_id = %id,
            account_id = %new.account_id,
            amount = %new.amount,
            "Transaction recorded"
        );

        self.find(id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    /// Lock the caller's transaction, apply `change` to it and store the
    /// result, reversing the old balance effect and applying the new one.
    ///
    /// The row is read `FOR UPDATE` inside the write transaction, so
    /// overlapping updates of the same transaction are serialized and each
    /// one reverses the effect the previous one stored.
    pub async fn update_locked<F>(
        &self,
        id: Uuid,
        user_id: Uuid,
        change: F,
    ) -> Result<Option<Transaction>, sqlx::Error>
    where
        F: FnOnce(&mut Transaction),
    {
        let mut tx = self.pool.begin().await?;

        let sql = format!("{TRANSACTION_SELECT} WHERE t.id = $1 AND t.user_id = $2 FOR UPDATE OF t");
        let previous: Option<Transaction> = sqlx::query_as(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(previous) = previous else {
            return Ok(None);
        };

        let mut updated = previous.clone();
        change(&mut updated);

        sqlx::query(
            r#"
            UPDATE transactions SET
                account_id = $3, category_id = $4, amount = $5, transaction_type = $6,
                description = $7, transaction_date = $8, notes = $9, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(previous.id)
        .bind(previous.user_id)
        .bind(updated.account_id)
        .bind(updated.category_id)
        .bind(updated.amount)
        .bind(updated.transaction_type)
        .bind(&updated.description)
        .bind(updated.transaction_date)
        .bind(&updated.notes)
        .execute(&mut *tx)
        .await?;

        AccountRepository::adjust_balance(
            &mut tx,
            previous.account_id,
            -previous.transaction_type.balance_effect(previous.amount),
        )
        .await?;
        AccountRepository::adjust_balance(
            &mut tx,
            updated.account_id,
            updated.transaction_type.balance_effect(updated.amount),
        )
        .await?;

        tx.commit().await?;

        self.find(id).await
    }

    /// Rows needed by report aggregation within `range`
    pub async fn report_rows(
        &self,
        user_id: Uuid,
        range: DateRange,
    ) -> Result<Vec<ReportTransaction>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT t.category_id, c.name AS category_name, t.amount,
                   t.transaction_type, t.transaction_date
            FROM transactions t
            LEFT JOIN categories c ON c.id = t.category_id
            WHERE t.user_id = $1
              AND t.transaction_date >= $2
              AND t.transaction_date <= $3
            ORDER BY t.transaction_date
            "#,
        )
        .bind(user_id)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await
    }

    /// Expense rows dated `since` or later, optionally for one category
    pub async fn expense_rows_since(
        &self,
        user_id: Uuid,
        since: NaiveDate,
        category_id: Option<Uuid>,
    ) -> Result<Vec<ReportTransaction>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT t.category_id, c.name AS category_name, t.amount,
                   t.transaction_type, t.transaction_date
            FROM transactions t
            LEFT JOIN categories c ON c.id = t.category_id
            WHERE t.user_id = $1
              AND t.transaction_type = 'expense'
              AND t.transaction_date >= $2
              AND ($3::uuid IS NULL OR t.category_id = $3)
            ORDER BY t.transaction_date
            "#,
        )
        .bind(user_id)
        .bind(since)
        .bind(category_id)
        .fetch_all(&self.pool)
        .await
    }
}
