//! Command definitions
//!
//! Commands represent intentions to change the system state. They carry
//! parsed values; range and ownership checks happen in the handlers.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{AccountType, BudgetPeriod, Transaction, TransactionType};

// =========================================================================
// Goals
// =========================================================================

/// Command to create a savings goal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGoalCommand {
    pub name: String,
    pub description: Option<String>,
    pub target_amount: Decimal,
    pub target_date: Option<NaiveDate>,
}

impl CreateGoalCommand {
    pub fn new(name: String, target_amount: Decimal) -> Self {
        Self {
            name,
            description: None,
            target_amount,
            target_date: None,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_target_date(mut self, target_date: Option<NaiveDate>) -> Self {
        self.target_date = target_date;
        self
    }
}

/// Partial update of a goal. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateGoalCommand {
    pub name: Option<String>,
    pub description: Option<String>,
    pub target_amount: Option<Decimal>,
    pub current_amount: Option<Decimal>,
    /// `Some(None)` clears the target date
    pub target_date: Option<Option<NaiveDate>>,
    pub is_completed: Option<bool>,
}

/// Command to move the current amount of a goal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateGoalProgressCommand {
    pub amount: Decimal,
    pub set_absolute: bool,
}

impl UpdateGoalProgressCommand {
    pub fn new(amount: Decimal) -> Self {
        Self {
            amount,
            set_absolute: false,
        }
    }

    pub fn absolute(mut self, set_absolute: bool) -> Self {
        self.set_absolute = set_absolute;
        self
    }
}

// =========================================================================
// Accounts and categories
// =========================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccountCommand {
    pub name: String,
    pub account_type: AccountType,
    pub balance: Decimal,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAccountCommand {
    pub name: Option<String>,
    pub account_type: Option<AccountType>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategoryCommand {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCategoryCommand {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

// =========================================================================
// Budgets
// =========================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBudgetCommand {
    pub name: String,
    pub category_id: Uuid,
    pub amount: Decimal,
    pub period: BudgetPeriod,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBudgetCommand {
    pub name: Option<String>,
    pub category_id: Option<Uuid>,
    pub amount: Option<Decimal>,
    pub period: Option<BudgetPeriod>,
    pub start_date: Option<NaiveDate>,
    /// `Some(None)` clears the end date
    pub end_date: Option<Option<NaiveDate>>,
    pub description: Option<String>,
}

// =========================================================================
// Transactions
// =========================================================================

/// Command to record a transaction against an account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransactionCommand {
    pub account_id: Uuid,
    pub category_id: Option<Uuid>,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub description: Option<String>,
    /// Defaults to today
    pub transaction_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl CreateTransactionCommand {
    pub fn new(account_id: Uuid, amount: Decimal, transaction_type: TransactionType) -> Self {
        Self {
            account_id,
            category_id: None,
            amount,
            transaction_type,
            description: None,
            transaction_date: None,
            notes: None,
        }
    }

    pub fn with_category(mut self, category_id: Option<Uuid>) -> Self {
        self.category_id = category_id;
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_date(mut self, transaction_date: Option<NaiveDate>) -> Self {
        self.transaction_date = transaction_date;
        self
    }

    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTransactionCommand {
    pub account_id: Option<Uuid>,
    /// `Some(None)` removes the category
    pub category_id: Option<Option<Uuid>>,
    pub amount: Option<Decimal>,
    pub transaction_type: Option<TransactionType>,
    pub description: Option<String>,
    pub transaction_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl UpdateTransactionCommand {
    /// Overwrite the fields this command sets. `amount` is the validated
    /// form of `self.amount`.
    pub fn apply_to(self, transaction: &mut Transaction, amount: Option<Decimal>) {
        if let Some(account_id) = self.account_id {
            transaction.account_id = account_id;
        }
        if let Some(category_id) = self.category_id {
            transaction.category_id = category_id;
        }
        if let Some(amount) = amount {
            transaction.amount = amount;
        }
        if let Some(transaction_type) = self.transaction_type {
            transaction.transaction_type = transaction_type;
        }
        if let Some(description) = self.description {
            transaction.description = Some(description);
        }
        if let Some(transaction_date) = self.transaction_date {
            transaction.transaction_date = transaction_date;
        }
        if let Some(notes) = self.notes {
            transaction.notes = Some(notes);
        }
    }
}
