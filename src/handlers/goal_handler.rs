//! Goal Handler
//!
//! Goal CRUD and progress tracking for the calling user.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Goal, GoalProgress, OperationContext, ProgressUpdate};
use crate::error::AppError;
use crate::repository::{GoalRepository, NewGoal};

use super::{authorize, caller, non_blank_name};
use super::{CreateGoalCommand, UpdateGoalCommand, UpdateGoalProgressCommand};

pub struct GoalHandler {
    goals: GoalRepository,
}

impl GoalHandler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            goals: GoalRepository::new(pool),
        }
    }

    pub async fn list(&self, context: &OperationContext) -> Result<Vec<Goal>, AppError> {
        let user = caller(context)?;
        self.goals
            .list_active(user.user_id)
            .await
            .map_err(AppError::storage("Failed to get goals"))
    }

    /// Goal owned by the caller
    pub async fn get(&self, goal_id: Uuid, context: &OperationContext) -> Result<Goal, AppError> {
        let user = caller(context)?;
        let goal = self
            .goals
            .find(goal_id)
            .await
            .map_err(AppError::storage("Failed to get goal"))?;

        authorize(goal, user)
    }

    pub async fn create(
        &self,
        command: CreateGoalCommand,
        context: &OperationContext,
    ) -> Result<Goal, AppError> {
        let user = caller(context)?;

        if command.target_amount <= Decimal::ZERO {
            return Err(AppError::validation("Target amount must be greater than 0"));
        }

        let new_goal = NewGoal {
            user_id: user.user_id,
            name: non_blank_name(&command.name)?,
            description: command.description,
            target_amount: command.target_amount,
            target_date: command.target_date,
        };

        let goal = self
            .goals
            .insert(&new_goal)
            .await
            .map_err(AppError::storage("Failed to create goal"))?;

        tracing::info!(goal_id = %goal.id, user_id = %user.user_id, "Goal created");
        Ok(goal)
    }

    pub async fn update(
        &self,
        goal_id: Uuid,
        command: UpdateGoalCommand,
        context: &OperationContext,
    ) -> Result<Goal, AppError> {
        let goal = self.get(goal_id, context).await?;

        let name = command.name.as_deref().map(non_blank_name).transpose()?;
        if command.target_amount.is_some_and(|amount| amount <= Decimal::ZERO) {
            return Err(AppError::validation("Target amount must be greater than 0"));
        }
        if command.current_amount.is_some_and(|amount| amount < Decimal::ZERO) {
            return Err(AppError::validation("Current amount cannot be negative"));
        }

        let updated = self
            .goals
            .update_locked(goal.id, goal.user_id, |goal| {
                if let Some(name) = name {
                    goal.name = name;
                }
                if let Some(description) = command.description {
                    goal.description = Some(description);
                }
                if let Some(target_amount) = command.target_amount {
                    goal.target_amount = target_amount;
                }
                if let Some(current_amount) = command.current_amount {
                    goal.current_amount = current_amount;
                }
                if let Some(target_date) = command.target_date {
                    goal.target_date = target_date;
                }
                if let Some(is_completed) = command.is_completed {
                    goal.is_completed = is_completed;
                }
            })
            .await
            .map_err(AppError::storage("Failed to update goal"))?;

        updated.ok_or(AppError::NotFound("Goal"))
    }

    pub async fn delete(&self, goal_id: Uuid, context: &OperationContext) -> Result<(), AppError> {
        let goal = self.get(goal_id, context).await?;

        self.goals
            .soft_delete(goal.id, goal.user_id)
            .await
            .map_err(AppError::storage("Failed to delete goal"))?;

        tracing::info!(goal_id = %goal.id, "Goal deleted");
        Ok(())
    }

    /// Progress snapshot as of `today`
    pub async fn progress(
        &self,
        goal_id: Uuid,
        today: NaiveDate,
        context: &OperationContext,
    ) -> Result<GoalProgress, AppError> {
        let goal = self.get(goal_id, context).await?;
        Ok(GoalProgress::for_goal(&goal, today))
    }

    /// Move the current amount of a goal.
    ///
    /// The update is applied to the row as locked for writing, so
    /// concurrent deposits add up.
    pub async fn update_progress(
        &self,
        goal_id: Uuid,
        command: UpdateGoalProgressCommand,
        context: &OperationContext,
    ) -> Result<Goal, AppError> {
        let goal = self.get(goal_id, context).await?;
        let update = ProgressUpdate::new(command.amount, command.set_absolute);

        let mut newly_completed = false;
        let updated = self
            .goals
            .update_locked(goal.id, goal.user_id, |goal| {
                let (current_amount, is_completed) =
                    update.apply(goal.current_amount, goal.target_amount, goal.is_completed);
                newly_completed = is_completed && !goal.is_completed;
                goal.current_amount = current_amount;
                goal.is_completed = is_completed;
            })
            .await
            .map_err(AppError::storage("Failed to update goal progress"))?
            .ok_or(AppError::NotFound("Goal"))?;

        if newly_completed {
            tracing::info!(goal_id = %updated.id, "Goal reached its target");
        }
        Ok(updated)
    }
}
