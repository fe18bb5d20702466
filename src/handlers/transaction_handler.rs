//! Transaction Handler
//!
//! Records income, expenses and transfers against the caller's accounts and
//! keeps account balances in step.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::amount::signed_non_zero;
use crate::domain::{AuthenticatedUser, DomainError, OperationContext, Transaction};
use crate::error::AppError;
use crate::repository::{
    AccountRepository, CategoryRepository, NewTransaction, TransactionFilter,
    TransactionRepository,
};

use super::{authorize, caller};
use super::{CreateTransactionCommand, UpdateTransactionCommand};

pub struct TransactionHandler {
    transactions: TransactionRepository,
    accounts: AccountRepository,
    categories: CategoryRepository,
}

impl TransactionHandler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            transactions: TransactionRepository::new(pool.clone()),
            accounts: AccountRepository::new(pool.clone()),
            categories: CategoryRepository::new(pool),
        }
    }

    pub async fn list(
        &self,
        filter: &TransactionFilter,
        context: &OperationContext,
    ) -> Result<Vec<Transaction>, AppError> {
        let user = caller(context)?;
        self.transactions
            .list(user.user_id, filter)
            .await
            .map_err(AppError::storage("Failed to get transactions"))
    }

    pub async fn get(
        &self,
        transaction_id: Uuid,
        context: &OperationContext,
    ) -> Result<Transaction, AppError> {
        let user = caller(context)?;
        let transaction = self
            .transactions
            .find(transaction_id)
            .await
            .map_err(AppError::storage("Failed to get transaction"))?;

        authorize(transaction, user)
    }

    pub async fn create(
        &self,
        command: CreateTransactionCommand,
        context: &OperationContext,
    ) -> Result<Transaction, AppError> {
        let user = caller(context)?;

        let amount = signed_non_zero(command.amount).map_err(DomainError::from)?;
        self.check_account(command.account_id, user).await?;
        if let Some(category_id) = command.category_id {
            self.check_category(category_id, user).await?;
        }

        let new_transaction = NewTransaction {
            user_id: user.user_id,
            account_id: command.account_id,
            category_id: command.category_id,
            amount,
            transaction_type: command.transaction_type,
            description: command.description,
            transaction_date: command
                .transaction_date
                .unwrap_or_else(|| Utc::now().date_naive()),
            notes: command.notes,
            transfer_id: None,
        };

        let transaction = self
            .transactions
            .insert(&new_transaction)
            .await
            .map_err(AppError::storage("Failed to create transaction"))?;

        tracing::info!(
            transaction_id = %transaction.id,
            account_id = %transaction.account_id,
            kind = ?transaction.transaction_type,
            "Transaction created"
        );

        Ok(transaction)
    }

    pub async fn update(
        &self,
        transaction_id: Uuid,
        command: UpdateTransactionCommand,
        context: &OperationContext,
    ) -> Result<Transaction, AppError> {
        let user = caller(context)?;
        let current = self.get(transaction_id, context).await?;

        // References and amount are validated up front; the stored row is
        // re-read under lock when the change is applied
        if let Some(account_id) = command.account_id {
            if account_id != current.account_id {
                self.check_account(account_id, user).await?;
            }
        }
        if let Some(Some(category_id)) = command.category_id {
            self.check_category(category_id, user).await?;
        }
        let amount = command
            .amount
            .map(|amount| signed_non_zero(amount).map_err(DomainError::from))
            .transpose()?;

        let updated = self
            .transactions
            .update_locked(transaction_id, user.user_id, |transaction| {
                command.apply_to(transaction, amount)
            })
            .await
            .map_err(AppError::storage("Failed to update transaction"))?;

        updated.ok_or(AppError::NotFound("Transaction"))
    }

    /// The account must be active and belong to the caller
    async fn check_account(&self, account_id: Uuid, user: &AuthenticatedUser) -> Result<(), AppError> {
        let account = self
            .accounts
            .find(account_id)
            .await
            .map_err(AppError::storage("Failed to get account"))?;

        authorize(account, user).map(|_| ())
    }

    async fn check_category(
        &self,
        category_id: Uuid,
        user: &AuthenticatedUser,
    ) -> Result<(), AppError> {
        let category = self
            .categories
            .find(category_id)
            .await
            .map_err(AppError::storage("Failed to get category"))?;

        authorize(category, user).map(|_| ())
    }
}
