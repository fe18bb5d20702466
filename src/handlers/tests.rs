//! Unit tests for handler helpers and commands
//!
//! Handlers themselves hit the database; see `tests/` for the
//! database-backed scenarios.

use chrono::{NaiveDate, Utc};
use rust_decimal_macros::dec;
use uuid::Uuid;

use super::*;
use crate::domain::{AuthenticatedUser, Goal, OperationContext, Transaction, TransactionType};
use crate::error::AppError;

fn goal_owned_by(user_id: Uuid) -> Goal {
    Goal {
        id: Uuid::new_v4(),
        user_id,
        name: "Emergency fund".to_string(),
        description: None,
        target_amount: dec!(1000),
        current_amount: dec!(250),
        target_date: None,
        is_completed: false,
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

// =========================================================================
// Caller and ownership
// =========================================================================

#[test]
fn test_caller_requires_user() {
    let context = OperationContext::new();
    assert!(matches!(
        caller(&context),
        Err(AppError::Unauthenticated(_))
    ));

    let user = AuthenticatedUser::new(Uuid::new_v4());
    let context = OperationContext::new().with_user(user.clone());
    assert_eq!(caller(&context).unwrap(), &user);
}

#[test]
fn test_authorize_missing_is_not_found() {
    let user = AuthenticatedUser::new(Uuid::new_v4());
    let err = authorize::<Goal>(None, &user).unwrap_err();

    assert!(matches!(err, AppError::NotFound("Goal")));
    assert_eq!(err.to_string(), "Goal not found");
}

#[test]
fn test_authorize_other_owner_is_forbidden() {
    let user = AuthenticatedUser::new(Uuid::new_v4());
    let goal = goal_owned_by(Uuid::new_v4());

    assert!(matches!(
        authorize(Some(goal), &user),
        Err(AppError::Forbidden)
    ));
}

#[test]
fn test_authorize_owner_gets_record() {
    let user = AuthenticatedUser::new(Uuid::new_v4());
    let goal = goal_owned_by(user.user_id);
    let goal_id = goal.id;

    let found = authorize(Some(goal), &user).unwrap();
    assert_eq!(found.id, goal_id);
}

#[test]
fn test_non_blank_name() {
    assert_eq!(non_blank_name("  Groceries ").unwrap(), "Groceries");
    assert!(matches!(
        non_blank_name("   "),
        Err(AppError::InvalidBody(_))
    ));
}

// =========================================================================
// Commands
// =========================================================================

#[test]
fn test_create_goal_command_builder() {
    let date = NaiveDate::from_ymd_opt(2025, 12, 31);
    let cmd = CreateGoalCommand::new("Vacation".to_string(), dec!(2500))
        .with_description(Some("Japan".to_string()))
        .with_target_date(date);

    assert_eq!(cmd.name, "Vacation");
    assert_eq!(cmd.target_amount, dec!(2500));
    assert_eq!(cmd.description.as_deref(), Some("Japan"));
    assert_eq!(cmd.target_date, date);
}

#[test]
fn test_progress_command_defaults_to_additive() {
    let cmd = UpdateGoalProgressCommand::new(dec!(50));
    assert!(!cmd.set_absolute);

    let cmd = cmd.absolute(true);
    assert!(cmd.set_absolute);
}

#[test]
fn test_create_transaction_command_builder() {
    let account_id = Uuid::new_v4();
    let category_id = Uuid::new_v4();
    let cmd = CreateTransactionCommand::new(account_id, dec!(-42.10), TransactionType::Expense)
        .with_category(Some(category_id))
        .with_description(Some("Groceries".to_string()));

    assert_eq!(cmd.account_id, account_id);
    assert_eq!(cmd.category_id, Some(category_id));
    assert!(cmd.transaction_date.is_none());
    assert!(cmd.notes.is_none());
}

#[test]
fn test_update_commands_default_to_no_change() {
    let goal = UpdateGoalCommand::default();
    assert!(goal.target_date.is_none());
    assert!(goal.is_completed.is_none());

    let transaction = UpdateTransactionCommand::default();
    assert!(transaction.category_id.is_none());
    assert!(transaction.amount.is_none());
}

fn expense(amount: rust_decimal::Decimal) -> Transaction {
    Transaction {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        account_id: Uuid::new_v4(),
        category_id: Some(Uuid::new_v4()),
        amount,
        transaction_type: TransactionType::Expense,
        description: Some("Groceries".to_string()),
        transaction_date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
        notes: None,
        transfer_id: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        account_name: None,
        account_type: None,
        category_name: None,
        category_color: None,
    }
}

#[test]
fn test_update_transaction_applies_only_set_fields() {
    let stored = expense(dec!(100));
    let mut updated = stored.clone();

    let command = UpdateTransactionCommand {
        category_id: Some(None),
        amount: Some(dec!(999)),
        transaction_type: Some(TransactionType::Income),
        ..Default::default()
    };
    command.apply_to(&mut updated, Some(dec!(70)));

    // The validated amount wins over the raw one
    assert_eq!(updated.amount, dec!(70));
    assert_eq!(updated.transaction_type, TransactionType::Income);
    assert!(updated.category_id.is_none());
    assert_eq!(updated.account_id, stored.account_id);
    assert_eq!(updated.description, stored.description);
    assert_eq!(updated.transaction_date, stored.transaction_date);
}
