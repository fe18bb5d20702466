//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;

use super::amount::AmountError;

/// Domain-specific errors
///
/// These errors represent business rule violations and domain invariant failures.
/// They are independent of the web/infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Invalid amount (zero, negative, too precise or too large)
    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    /// Date range where the end precedes the start
    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    /// Business rule violation
    #[error("Business rule violation: {0}")]
    BusinessRuleViolation(String),
}

impl DomainError {
    /// Create a business rule violation
    pub fn rule(message: impl Into<String>) -> Self {
        Self::BusinessRuleViolation(message.into())
    }

    /// Check if this is a client error (user's fault)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidAmount(_) | Self::InvalidDateRange(_))
    }
}
