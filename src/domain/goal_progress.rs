//! Goal progress
//!
//! Percentage, remaining amount and status of a savings goal, and the rules
//! for moving its current amount.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::amount::percentage;
use super::models::Goal;

const TARGET_REACHED: Decimal = Decimal::ONE_HUNDRED;
const ON_TRACK: Decimal = Decimal::from_parts(75, 0, 0, false, 0);
const MAKING_PROGRESS: Decimal = Decimal::from_parts(25, 0, 0, false, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Completed,
    TargetReached,
    OnTrack,
    MakingProgress,
    JustStarted,
}

impl GoalStatus {
    /// Status of a goal at `progress` percent
    pub fn classify(is_completed: bool, progress: Decimal) -> Self {
        if is_completed {
            GoalStatus::Completed
        } else if progress >= TARGET_REACHED {
            GoalStatus::TargetReached
        } else if progress >= ON_TRACK {
            GoalStatus::OnTrack
        } else if progress >= MAKING_PROGRESS {
            GoalStatus::MakingProgress
        } else {
            GoalStatus::JustStarted
        }
    }
}

/// Progress snapshot returned by `GET /goals/:id/progress`
#[derive(Debug, Clone, Serialize)]
pub struct GoalProgress {
    pub goal_id: Uuid,
    pub name: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub progress_percentage: Decimal,
    pub remaining_amount: Decimal,
    pub is_completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_remaining: Option<i64>,
    pub status: GoalStatus,
}

impl GoalProgress {
    pub fn for_goal(goal: &Goal, today: NaiveDate) -> Self {
        let progress_percentage = percentage(goal.current_amount, goal.target_amount);

        // Past target dates report no remaining days
        let days_remaining = goal
            .target_date
            .map(|target| (target - today).num_days())
            .filter(|days| *days >= 0);

        Self {
            goal_id: goal.id,
            name: goal.name.clone(),
            target_amount: goal.target_amount,
            current_amount: goal.current_amount,
            progress_percentage,
            remaining_amount: goal.target_amount - goal.current_amount,
            is_completed: goal.is_completed,
            target_date: goal.target_date,
            days_remaining,
            status: GoalStatus::classify(goal.is_completed, progress_percentage),
        }
    }
}

/// How a progress update moves the current amount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressUpdate {
    /// Replace the current amount
    Set(Decimal),
    /// Add to the current amount (negative values withdraw)
    Add(Decimal),
}

impl ProgressUpdate {
    pub fn new(amount: Decimal, set_absolute: bool) -> Self {
        if set_absolute {
            ProgressUpdate::Set(amount)
        } else {
            ProgressUpdate::Add(amount)
        }
    }

    /// New `(current_amount, is_completed)` after applying this update.
    ///
    /// The amount never drops below zero and completion is never revoked.
    pub fn apply(
        self,
        current: Decimal,
        target: Decimal,
        is_completed: bool,
    ) -> (Decimal, bool) {
        let next = match self {
            ProgressUpdate::Set(amount) => amount,
            ProgressUpdate::Add(delta) => current + delta,
        }
        .max(Decimal::ZERO);

        (next, is_completed || next >= target)
    }
}
