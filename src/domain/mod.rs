//! Domain module
//!
//! Core domain types and business logic.

pub mod amount;
pub mod context;
pub mod error;
pub mod goal_progress;
pub mod models;
pub mod period;
pub mod reports;

pub use amount::{Amount, AmountError};
pub use context::{AuthenticatedUser, OperationContext};
pub use error::DomainError;
pub use goal_progress::{GoalProgress, GoalStatus, ProgressUpdate};
pub use models::{
    Account, AccountType, Budget, BudgetPeriod, Category, Goal, Owned, Profile, ReportTransaction,
    Transaction, TransactionType, User,
};
pub use period::{DateRange, PeriodError, YearMonth};
pub use reports::{
    BudgetPerformance, BudgetStatus, CashFlow, MonthlySummary, ReportSummary, SpendingTrends,
};
