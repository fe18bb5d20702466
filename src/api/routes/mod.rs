//! API Routes
//!
//! HTTP endpoint definitions. Every route here sits behind bearer token
//! authentication; the public health routes live in `health`.

use axum::{routing::get, Router};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::period::parse_date;
use crate::error::AppError;
use crate::state::AppState;

mod accounts;
mod budgets;
mod categories;
mod goals;
pub mod health;
mod profile;
mod reports;
mod transactions;

// =========================================================================
// Shared request/response helpers
// =========================================================================

/// Body of delete responses
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Parse a path id. Malformed ids cannot match a row, so they read as missing.
pub fn parse_id(raw: &str, entity: &'static str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::NotFound(entity))
}

/// Parse an optional `YYYY-MM-DD` body field; blank means absent
pub(crate) fn optional_date(
    raw: Option<&str>,
    field: &'static str,
) -> Result<Option<chrono::NaiveDate>, AppError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => Ok(Some(parse_date(value, field)?)),
        None => Ok(None),
    }
}

/// Parse an optional UUID query value; blank means absent
pub(crate) fn optional_uuid(raw: Option<&str>, field: &str) -> Result<Option<Uuid>, AppError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => Uuid::parse_str(value)
            .map(Some)
            .map_err(|_| AppError::validation(format!("Invalid {field} parameter"))),
        None => Ok(None),
    }
}

// =========================================================================
// API Router
// =========================================================================

/// Create the authenticated API router
pub fn create_router() -> Router<AppState> {
    Router::new()
        // Identity
        .route("/api/me", get(profile::me))
        .route("/api/profile", get(profile::get_profile).put(profile::update_profile))
        // Reports
        .route("/api/reports/monthly-summary", get(reports::monthly_summary))
        .route("/api/reports/spending-trends", get(reports::spending_trends))
        .route("/api/reports/cash-flow", get(reports::cash_flow))
        .route("/api/reports/summary", get(reports::summary))
        .route("/api/reports/budget-performance", get(reports::budget_performance))
        // Goals
        .route("/api/goals", get(goals::list_goals).post(goals::create_goal))
        .route(
            "/api/goals/:id",
            get(goals::get_goal)
                .put(goals::update_goal)
                .delete(goals::delete_goal),
        )
        .route(
            "/api/goals/:id/progress",
            get(goals::get_goal_progress).patch(goals::update_goal_progress),
        )
        // Accounts
        .route("/api/accounts", get(accounts::list_accounts).post(accounts::create_account))
        .route(
            "/api/accounts/:id",
            get(accounts::get_account)
                .put(accounts::update_account)
                .delete(accounts::delete_account),
        )
        // Categories
        .route(
            "/api/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route(
            "/api/categories/:id",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
        // Budgets
        .route("/api/budgets", get(budgets::list_budgets).post(budgets::create_budget))
        .route(
            "/api/budgets/:id",
            get(budgets::get_budget)
                .put(budgets::update_budget)
                .delete(budgets::delete_budget),
        )
        // Transactions
        .route(
            "/api/transactions",
            get(transactions::list_transactions).post(transactions::create_transaction),
        )
        .route(
            "/api/transactions/:id",
            get(transactions::get_transaction).put(transactions::update_transaction),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_malformed_is_not_found() {
        let err = parse_id("not-a-uuid", "Goal").unwrap_err();
        assert_eq!(err.to_string(), "Goal not found");

        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string(), "Goal").unwrap(), id);
    }

    #[test]
    fn test_optional_date() {
        assert_eq!(optional_date(None, "target_date").unwrap(), None);
        assert_eq!(optional_date(Some("  "), "target_date").unwrap(), None);
        assert_eq!(
            optional_date(Some("2025-06-30"), "target_date").unwrap(),
            chrono::NaiveDate::from_ymd_opt(2025, 6, 30)
        );

        let err = optional_date(Some("30/06/2025"), "target_date").unwrap_err();
        assert_eq!(err.to_string(), "Invalid target_date format. Use YYYY-MM-DD");
    }

    #[test]
    fn test_optional_uuid() {
        assert_eq!(optional_uuid(Some(""), "category_id").unwrap(), None);
        let err = optional_uuid(Some("nope"), "category_id").unwrap_err();
        assert_eq!(err.to_string(), "Invalid category_id parameter");
    }
}
