//! Account Handler

use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::amount::non_negative;
use crate::domain::{Account, DomainError, OperationContext};
use crate::error::AppError;
use crate::repository::{AccountRepository, NewAccount};

use super::{authorize, caller, non_blank_name};
use super::{CreateAccountCommand, UpdateAccountCommand};

pub struct AccountHandler {
    accounts: AccountRepository,
}

impl AccountHandler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            accounts: AccountRepository::new(pool),
        }
    }

    pub async fn list(&self, context: &OperationContext) -> Result<Vec<Account>, AppError> {
        let user = caller(context)?;
        self.accounts
            .list_active(user.user_id)
            .await
            .map_err(AppError::storage("Failed to get accounts"))
    }

    pub async fn get(
        &self,
        account_id: Uuid,
        context: &OperationContext,
    ) -> Result<Account, AppError> {
        let user = caller(context)?;
        let account = self
            .accounts
            .find(account_id)
            .await
            .map_err(AppError::storage("Failed to get account"))?;

        authorize(account, user)
    }

    /// Opening balance may be zero but not negative
    pub async fn create(
        &self,
        command: CreateAccountCommand,
        context: &OperationContext,
    ) -> Result<Account, AppError> {
        let user = caller(context)?;

        let new_account = NewAccount {
            user_id: user.user_id,
            name: non_blank_name(&command.name)?,
            account_type: command.account_type,
            balance: non_negative(command.balance).map_err(DomainError::from)?,
            description: command.description,
        };

        let account = self
            .accounts
            .insert(&new_account)
            .await
            .map_err(AppError::storage("Failed to create account"))?;

        tracing::info!(account_id = %account.id, user_id = %user.user_id, "Account created");
        Ok(account)
    }

    /// The balance only moves through transactions
    pub async fn update(
        &self,
        account_id: Uuid,
        command: UpdateAccountCommand,
        context: &OperationContext,
    ) -> Result<Account, AppError> {
        let mut account = self.get(account_id, context).await?;

        if let Some(name) = command.name {
            account.name = non_blank_name(&name)?;
        }
        if let Some(account_type) = command.account_type {
            account.account_type = account_type;
        }
        if let Some(description) = command.description {
            account.description = Some(description);
        }

        self.accounts
            .update(&account)
            .await
            .map_err(AppError::storage("Failed to update account"))
    }

    pub async fn delete(
        &self,
        account_id: Uuid,
        context: &OperationContext,
    ) -> Result<(), AppError> {
        let account = self.get(account_id, context).await?;

        self.accounts
            .soft_delete(account.id, account.user_id)
            .await
            .map_err(AppError::storage("Failed to delete account"))?;

        tracing::info!(account_id = %account.id, "Account deleted");
        Ok(())
    }
}
