//! Budget Handler
//!
//! Budgets are spending limits tied to one of the caller's categories.

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Amount, AuthenticatedUser, Budget, DomainError, OperationContext};
use crate::error::AppError;
use crate::repository::{BudgetRepository, CategoryRepository, NewBudget};

use super::{authorize, caller, non_blank_name};
use super::{CreateBudgetCommand, UpdateBudgetCommand};

pub struct BudgetHandler {
    budgets: BudgetRepository,
    categories: CategoryRepository,
}

impl BudgetHandler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            budgets: BudgetRepository::new(pool.clone()),
            categories: CategoryRepository::new(pool),
        }
    }

    pub async fn list(&self, context: &OperationContext) -> Result<Vec<Budget>, AppError> {
        let user = caller(context)?;
        self.budgets
            .list_active(user.user_id)
            .await
            .map_err(AppError::storage("Failed to get budgets"))
    }

    pub async fn get(&self, budget_id: Uuid, context: &OperationContext) -> Result<Budget, AppError> {
        let user = caller(context)?;
        let budget = self
            .budgets
            .find(budget_id)
            .await
            .map_err(AppError::storage("Failed to get budget"))?;

        authorize(budget, user)
    }

    pub async fn create(
        &self,
        command: CreateBudgetCommand,
        context: &OperationContext,
    ) -> Result<Budget, AppError> {
        let user = caller(context)?;

        let name = non_blank_name(&command.name)?;
        let amount = Amount::new(command.amount).map_err(DomainError::from)?;
        check_dates(command.start_date, command.end_date)?;
        self.check_category(command.category_id, user).await?;

        let new_budget = NewBudget {
            user_id: user.user_id,
            category_id: command.category_id,
            name,
            amount: amount.value(),
            period: command.period,
            start_date: command.start_date,
            end_date: command.end_date,
            description: command.description,
        };

        let budget = self
            .budgets
            .insert(&new_budget)
            .await
            .map_err(AppError::storage("Failed to create budget"))?;

        tracing::info!(budget_id = %budget.id, user_id = %user.user_id, "Budget created");
        Ok(budget)
    }

    pub async fn update(
        &self,
        budget_id: Uuid,
        command: UpdateBudgetCommand,
        context: &OperationContext,
    ) -> Result<Budget, AppError> {
        let user = caller(context)?;
        let mut budget = self.get(budget_id, context).await?;

        if let Some(name) = command.name {
            budget.name = non_blank_name(&name)?;
        }
        if let Some(category_id) = command.category_id {
            if category_id != budget.category_id {
                self.check_category(category_id, user).await?;
            }
            budget.category_id = category_id;
        }
        if let Some(amount) = command.amount {
            budget.amount = Amount::new(amount).map_err(DomainError::from)?.value();
        }
        if let Some(period) = command.period {
            budget.period = period;
        }
        if let Some(start_date) = command.start_date {
            budget.start_date = start_date;
        }
        if let Some(end_date) = command.end_date {
            budget.end_date = end_date;
        }
        if let Some(description) = command.description {
            budget.description = Some(description);
        }
        check_dates(budget.start_date, budget.end_date)?;

        self.budgets
            .update(&budget)
            .await
            .map_err(AppError::storage("Failed to update budget"))
    }

    pub async fn delete(&self, budget_id: Uuid, context: &OperationContext) -> Result<(), AppError> {
        let budget = self.get(budget_id, context).await?;

        self.budgets
            .soft_delete(budget.id, budget.user_id)
            .await
            .map_err(AppError::storage("Failed to delete budget"))?;

        tracing::info!(budget_id = %budget.id, "Budget deleted");
        Ok(())
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

fn check_dates(start: NaiveDate, end: Option<NaiveDate>) -> Result<(), AppError> {
    match end {
        Some(end) if end < start => Err(DomainError::InvalidDateRange(
            "end_date cannot be before start_date".to_string(),
        )
        .into()),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_ended_budget_is_valid() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(check_dates(start, None).is_ok());
        assert!(check_dates(start, Some(start)).is_ok());
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let err = check_dates(start, Some(end)).unwrap_err();
        assert!(matches!(
            err,
            AppError::Domain(DomainError::InvalidDateRange(_))
        ));
    }
}
