//! Repository module
//!
//! Parameterized SQL against the finance schema. Repositories return raw
//! `sqlx::Error`s; callers decide how a failure is reported.

mod accounts;
mod budgets;
mod categories;
mod goals;
mod transactions;
mod users;

pub use accounts::{AccountRepository, NewAccount};
pub use budgets::{BudgetRepository, NewBudget};
pub use categories::{CategoryRepository, NewCategory, DEFAULT_CATEGORY_COLOR};
pub use goals::{GoalRepository, NewGoal};
pub use transactions::{
    NewTransaction, TransactionFilter, TransactionRepository, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
pub use users::UserRepository;
