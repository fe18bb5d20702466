//! Report endpoints
//!
//! Query values arrive as raw strings so that malformed numbers produce the
//! same messages as out-of-range ones.

use axum::{
    extract::{Extension, Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use sqlx::PgPool;

use crate::domain::period::{trend_months, DateRange, YearMonth};
use crate::domain::{
    BudgetPerformance, CashFlow, MonthlySummary, OperationContext, ReportSummary, SpendingTrends,
};
use crate::error::AppError;
use crate::handlers::ReportHandler;

use super::optional_uuid;

#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    pub month: Option<String>,
    pub year: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TrendsQuery {
    pub months: Option<String>,
    pub category_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CashFlowQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

fn month_from(query: &MonthQuery) -> Result<YearMonth, AppError> {
    let today = Utc::now().date_naive();
    Ok(YearMonth::from_query(
        query.month.as_deref(),
        query.year.as_deref(),
        today,
    )?)
}

/// GET /api/reports/monthly-summary
pub async fn monthly_summary(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<MonthlySummary>, AppError> {
    let period = month_from(&query)?;
    let handler = ReportHandler::new(pool);

    Ok(Json(handler.monthly_summary(period, &context).await?))
}

/// GET /api/reports/spending-trends
pub async fn spending_trends(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Query(query): Query<TrendsQuery>,
) -> Result<Json<SpendingTrends>, AppError> {
    let months = trend_months(query.months.as_deref())?;
    let category_id = optional_uuid(query.category_id.as_deref(), "category_id")?;
    let handler = ReportHandler::new(pool);
    let today = Utc::now().date_naive();

    Ok(Json(
        handler
            .spending_trends(months, category_id, today, &context)
            .await?,
    ))
}

/// GET /api/reports/cash-flow
pub async fn cash_flow(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Query(query): Query<CashFlowQuery>,
) -> Result<Json<CashFlow>, AppError> {
    let today = Utc::now().date_naive();
    let range = DateRange::from_query(
        query.start_date.as_deref(),
        query.end_date.as_deref(),
        today,
    )?;
    let handler = ReportHandler::new(pool);

    Ok(Json(handler.cash_flow(range, &context).await?))
}

/// GET /api/reports/summary
pub async fn summary(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
) -> Result<Json<ReportSummary>, AppError> {
    let handler = ReportHandler::new(pool);
    let today = Utc::now().date_naive();

    Ok(Json(handler.summary(today, &context).await?))
}

/// GET /api/reports/budget-performance
pub async fn budget_performance(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<BudgetPerformance>, AppError> {
    let period = month_from(&query)?;
    let handler = ReportHandler::new(pool);

    Ok(Json(handler.budget_performance(period, &context).await?))
}
