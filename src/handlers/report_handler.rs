//! Report Handler
//!
//! Loads the transactions of a reporting window and hands them to the pure
//! aggregations in `domain::reports`.

use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::period::{trend_window_start, DateRange, YearMonth};
use crate::domain::{
    BudgetPerformance, CashFlow, MonthlySummary, OperationContext, ReportSummary, SpendingTrends,
};
use crate::error::AppError;
use crate::repository::{BudgetRepository, TransactionRepository};

use super::caller;

/// Months covered by the trends section of the combined summary
const SUMMARY_TREND_MONTHS: u32 = 6;

pub struct ReportHandler {
    transactions: TransactionRepository,
    budgets: BudgetRepository,
}

impl ReportHandler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            transactions: TransactionRepository::new(pool.clone()),
            budgets: BudgetRepository::new(pool),
        }
    }

    pub async fn monthly_summary(
        &self,
        period: YearMonth,
        context: &OperationContext,
    ) -> Result<MonthlySummary, AppError> {
        let user = caller(context)?;
        let rows = self
            .transactions
            .report_rows(user.user_id, period.as_range())
            .await
            .map_err(AppError::storage("Failed to get monthly summary"))?;

        Ok(MonthlySummary::build(user.user_id, period, &rows, Utc::now()))
    }

    /// Expenses from `months` months before `today` onwards
    pub async fn spending_trends(
        &self,
        months: u32,
        category_id: Option<Uuid>,
        today: NaiveDate,
        context: &OperationContext,
    ) -> Result<SpendingTrends, AppError> {
        let user = caller(context)?;
        let rows = self
            .transactions
            .expense_rows_since(user.user_id, trend_window_start(today, months), category_id)
            .await
            .map_err(AppError::storage("Failed to get spending trends"))?;

        Ok(SpendingTrends::build(user.user_id, category_id, &rows, Utc::now()))
    }

    pub async fn cash_flow(
        &self,
        range: DateRange,
        context: &OperationContext,
    ) -> Result<CashFlow, AppError> {
        let user = caller(context)?;
        let rows = self
            .transactions
            .report_rows(user.user_id, range)
            .await
            .map_err(AppError::storage("Failed to get cash flow"))?;

        Ok(CashFlow::build(user.user_id, range, &rows, Utc::now()))
    }

    /// Current month summary, recent trends and current month cash flow
    pub async fn summary(
        &self,
        today: NaiveDate,
        context: &OperationContext,
    ) -> Result<ReportSummary, AppError> {
        let user = caller(context)?;
        let month = YearMonth::containing(today);

        let current_month = self.monthly_summary(month, context).await?;
        let spending_trends = self
            .spending_trends(SUMMARY_TREND_MONTHS, None, today, context)
            .await?;
        let cash_flow = self.cash_flow(month.as_range(), context).await?;

        Ok(ReportSummary {
            user_id: user.user_id,
            current_month,
            spending_trends,
            cash_flow,
            generated_at: Utc::now(),
        })
    }

    /// Spend against every active budget for one month.
    ///
    /// The month's transactions are loaded once and matched to budgets in memory.
    pub async fn budget_performance(
        &self,
        period: YearMonth,
        context: &OperationContext,
    ) -> Result<BudgetPerformance, AppError> {
        let user = caller(context)?;

        let budgets = self
            .budgets
            .list_active(user.user_id)
            .await
            .map_err(AppError::storage("Failed to get budgets"))?;

        let rows = self
            .transactions
            .report_rows(user.user_id, period.as_range())
            .await
            .map_err(AppError::storage("Failed to get budget spending"))?;

        tracing::debug!(
            user_id = %user.user_id,
            budgets = budgets.len(),
            transactions = rows.len(),
            "Computing budget performance"
        );

        Ok(BudgetPerformance::build(
            user.user_id,
            period,
            &budgets,
            &rows,
            Utc::now(),
        ))
    }
}
