//! Handlers module
//!
//! Business operations behind the HTTP routes. Each handler owns the
//! repositories it needs and checks that the caller owns what it touches.

mod account_handler;
mod budget_handler;
mod category_handler;
mod commands;
mod goal_handler;
mod profile_handler;
mod report_handler;
mod transaction_handler;

#[cfg(test)]
mod tests;

pub use account_handler::AccountHandler;
pub use budget_handler::BudgetHandler;
pub use category_handler::CategoryHandler;
pub use commands::*;
pub use goal_handler::GoalHandler;
pub use profile_handler::ProfileHandler;
pub use report_handler::ReportHandler;
pub use transaction_handler::TransactionHandler;

use crate::auth::AuthError;
use crate::domain::{AuthenticatedUser, OperationContext, Owned};
use crate::error::AppError;

/// The authenticated caller of an operation
pub(crate) fn caller(context: &OperationContext) -> Result<&AuthenticatedUser, AppError> {
    context
        .user
        .as_ref()
        .ok_or(AppError::Unauthenticated(AuthError::MissingHeader))
}

/// Resolve a lookup result against the caller.
///
/// A missing row is `NotFound`, a row owned by someone else is `Forbidden`.
pub(crate) fn authorize<T: Owned>(
    found: Option<T>,
    user: &AuthenticatedUser,
) -> Result<T, AppError> {
    let entity = found.ok_or(AppError::NotFound(T::ENTITY))?;
    if !user.owns(entity.owner_id()) {
        tracing::warn!(
            user_id = %user.user_id,
            entity = T::ENTITY,
            "Access to another user's record denied"
        );
        return Err(AppError::Forbidden);
    }
    Ok(entity)
}

pub(crate) fn non_blank_name(name: &str) -> Result<String, AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidBody("name is required".to_string()));
    }
    Ok(trimmed.to_string())
}
