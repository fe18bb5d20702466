//! Report aggregation
//!
//! Pure folds over a user's transactions. The repository loads the rows for
//! the requested window; everything here is deterministic and database-free.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::amount::percentage;
use super::models::{Budget, BudgetPeriod, ReportTransaction, TransactionType};
use super::period::{DateRange, YearMonth};

/// Display name for expenses without a category
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Spend share at which a budget is reported as at risk
const AT_RISK_PERCENTAGE: Decimal = Decimal::from_parts(80, 0, 0, false, 0);

// =========================================================================
// Monthly summary
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySpending {
    /// Empty for uncategorized spending
    pub category_id: String,
    pub category_name: String,
    pub total_amount: Decimal,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlySummary {
    pub user_id: Uuid,
    pub month: u32,
    pub year: i32,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub net_amount: Decimal,
    pub categories: Vec<CategorySpending>,
    pub generated_at: DateTime<Utc>,
}

impl MonthlySummary {
    /// Summarize the transactions of one month.
    ///
    /// Expenses count by magnitude so that sign conventions in the stored
    /// amounts do not matter. Income is summed as stored.
    pub fn build(
        user_id: Uuid,
        period: YearMonth,
        rows: &[ReportTransaction],
        generated_at: DateTime<Utc>,
    ) -> Self {
        let mut total_income = Decimal::ZERO;
        let mut total_expenses = Decimal::ZERO;
        let mut by_category: HashMap<(String, String), (Decimal, i64)> = HashMap::new();

        for row in rows {
            match row.transaction_type {
                TransactionType::Income => total_income += row.amount,
                TransactionType::Expense => {
                    let spent = row.amount.abs();
                    total_expenses += spent;

                    let key = (
                        row.category_id.map(|id| id.to_string()).unwrap_or_default(),
                        row.category_name
                            .clone()
                            .unwrap_or_else(|| UNCATEGORIZED.to_string()),
                    );
                    let entry = by_category.entry(key).or_insert((Decimal::ZERO, 0));
                    entry.0 += spent;
                    entry.1 += 1;
                }
                TransactionType::Transfer => {}
            }
        }

        let mut categories: Vec<CategorySpending> = by_category
            .into_iter()
            .map(|((category_id, category_name), (total_amount, count))| {
                CategorySpending {
                    category_id,
                    category_name,
                    total_amount,
                    count,
                }
            })
            .collect();

        // Largest first; ties fall back to name so output is stable
        categories.sort_by(|a, b| {
            b.total_amount
                .cmp(&a.total_amount)
                .then_with(|| a.category_name.cmp(&b.category_name))
        });

        Self {
            user_id,
            month: period.month,
            year: period.year,
            total_income,
            total_expenses,
            net_amount: total_income - total_expenses,
            categories,
            generated_at,
        }
    }
}

// =========================================================================
// Spending trends
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub month: u32,
    pub year: i32,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpendingTrends {
    pub user_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
    pub period: &'static str,
    pub trends: Vec<TrendPoint>,
    pub generated_at: DateTime<Utc>,
}

impl SpendingTrends {
    /// Bucket expenses by calendar month, oldest first.
    pub fn build(
        user_id: Uuid,
        category_id: Option<Uuid>,
        rows: &[ReportTransaction],
        generated_at: DateTime<Utc>,
    ) -> Self {
        let mut by_month: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();

        for row in rows {
            if row.transaction_type != TransactionType::Expense {
                continue;
            }
            if category_id.is_some() && row.category_id != category_id {
                continue;
            }
            let date = row.transaction_date;
            *by_month.entry((date.year(), date.month())).or_default() += row.amount.abs();
        }

        let trends = by_month
            .into_iter()
            .map(|((year, month), amount)| TrendPoint {
                month,
                year,
                amount,
            })
            .collect();

        Self {
            user_id,
            category_id,
            period: "monthly",
            trends,
            generated_at,
        }
    }
}

// =========================================================================
// Cash flow
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyCashFlow {
    pub date: NaiveDate,
    pub income: Decimal,
    pub expenses: Decimal,
    pub net_flow: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct CashFlow {
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// One entry per day with activity
    pub items: Vec<DailyCashFlow>,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub net_cash_flow: Decimal,
    pub generated_at: DateTime<Utc>,
}

impl CashFlow {
    /// Bucket income and expenses by day. Only days with activity appear.
    pub fn build(
        user_id: Uuid,
        range: DateRange,
        rows: &[ReportTransaction],
        generated_at: DateTime<Utc>,
    ) -> Self {
        let mut by_day: BTreeMap<NaiveDate, (Decimal, Decimal)> = BTreeMap::new();

        for row in rows.iter().filter(|r| range.contains(r.transaction_date)) {
            let day = by_day.entry(row.transaction_date).or_default();
            match row.transaction_type {
                TransactionType::Income => day.0 += row.amount,
                TransactionType::Expense => day.1 += row.amount.abs(),
                TransactionType::Transfer => {}
            }
        }

        let mut total_income = Decimal::ZERO;
        let mut total_expense = Decimal::ZERO;
        let items = by_day
            .into_iter()
            .map(|(date, (income, expenses))| {
                total_income += income;
                total_expense += expenses;
                DailyCashFlow {
                    date,
                    income,
                    expenses,
                    net_flow: income - expenses,
                }
            })
            .collect();

        Self {
            user_id,
            start_date: range.start,
            end_date: range.end,
            items,
            total_income,
            total_expense,
            net_cash_flow: total_income - total_expense,
            generated_at,
        }
    }
}

// =========================================================================
// Budget performance
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    OverBudget,
    AtRisk,
    UnderBudget,
}

impl BudgetStatus {
    pub fn classify(budgeted: Decimal, spent: Decimal) -> Self {
        if spent > budgeted {
            BudgetStatus::OverBudget
        } else if percentage(spent, budgeted) >= AT_RISK_PERCENTAGE {
            BudgetStatus::AtRisk
        } else {
            BudgetStatus::UnderBudget
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetUsage {
    pub budget_id: Uuid,
    pub budget_name: String,
    pub category_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    pub budgeted_amount: Decimal,
    pub spent_amount: Decimal,
    pub remaining: Decimal,
    pub percentage_used: Decimal,
    pub status: BudgetStatus,
    pub is_over_budget: bool,
    pub period: BudgetPeriod,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallPerformance {
    pub total_budgeted: Decimal,
    pub total_spent: Decimal,
    pub total_remaining: Decimal,
    pub overall_percentage: Decimal,
    pub budgets_count: usize,
    pub over_budget_count: usize,
    pub on_track_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetPerformance {
    pub user_id: Uuid,
    pub month: u32,
    pub year: i32,
    pub budget_performance: Vec<BudgetUsage>,
    pub overall_performance: OverallPerformance,
    pub generated_at: DateTime<Utc>,
}

impl BudgetPerformance {
    /// Compare each budget against the month's expenses in its category.
    ///
    /// Spend is summed as stored, matching how budgets are entered.
    pub fn build(
        user_id: Uuid,
        period: YearMonth,
        budgets: &[Budget],
        rows: &[ReportTransaction],
        generated_at: DateTime<Utc>,
    ) -> Self {
        let mut spent_by_category: HashMap<Uuid, Decimal> = HashMap::new();
        for row in rows {
            if row.transaction_type != TransactionType::Expense {
                continue;
            }
            if let Some(category_id) = row.category_id {
                *spent_by_category.entry(category_id).or_default() += row.amount;
            }
        }

        let budget_performance: Vec<BudgetUsage> = budgets
            .iter()
            .map(|budget| {
                let spent = spent_by_category
                    .get(&budget.category_id)
                    .copied()
                    .unwrap_or_default();
                let status = BudgetStatus::classify(budget.amount, spent);

                BudgetUsage {
                    budget_id: budget.id,
                    budget_name: budget.name.clone(),
                    category_id: budget.category_id,
                    category_name: budget.category_name.clone(),
                    budgeted_amount: budget.amount,
                    spent_amount: spent,
                    remaining: budget.amount - spent,
                    percentage_used: percentage(spent, budget.amount),
                    status,
                    is_over_budget: status == BudgetStatus::OverBudget,
                    period: budget.period,
                }
            })
            .collect();

        let overall_performance = OverallPerformance::from_usages(&budget_performance);

        Self {
            user_id,
            month: period.month,
            year: period.year,
            budget_performance,
            overall_performance,
            generated_at,
        }
    }
}

impl OverallPerformance {
    fn from_usages(usages: &[BudgetUsage]) -> Self {
        let total_budgeted: Decimal = usages.iter().map(|u| u.budgeted_amount).sum();
        let total_spent: Decimal = usages.iter().map(|u| u.spent_amount).sum();
        let over_budget_count = usages.iter().filter(|u| u.is_over_budget).count();

        Self {
            total_budgeted,
            total_spent,
            total_remaining: total_budgeted - total_spent,
            overall_percentage: percentage(total_spent, total_budgeted),
            budgets_count: usages.len(),
            over_budget_count,
            on_track_count: usages.len() - over_budget_count,
        }
    }
}

// =========================================================================
// Combined summary
// =========================================================================

/// Dashboard view combining the other reports
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub user_id: Uuid,
    pub current_month: MonthlySummary,
    pub spending_trends: SpendingTrends,
    pub cash_flow: CashFlow,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(
        kind: TransactionType,
        amount: Decimal,
        category: Option<(Uuid, &str)>,
        day: NaiveDate,
    ) -> ReportTransaction {
        ReportTransaction {
            category_id: category.map(|(id, _)| id),
            category_name: category.map(|(_, name)| name.to_string()),
            amount,
            transaction_type: kind,
            transaction_date: day,
        }
    }

    fn budget(category_id: Uuid, amount: Decimal) -> Budget {
        let now = Utc::now();
        Budget {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            category_id,
            name: "Food".to_string(),
            amount,
            period: BudgetPeriod::Monthly,
            start_date: date(2024, 1, 1),
            end_date: None,
            description: None,
            is_active: true,
            created_at: now,
            updated_at: now,
            category_name: None,
            category_color: None,
            category_icon: None,
        }
    }

    #[test]
    fn test_monthly_summary_groups_expenses() {
        let food = Uuid::new_v4();
        let rent = Uuid::new_v4();
        let day = date(2024, 3, 5);
        let rows = vec![
            row(TransactionType::Income, dec!(3000), None, day),
            row(TransactionType::Expense, dec!(-40), Some((food, "Food")), day),
            row(TransactionType::Expense, dec!(60), Some((food, "Food")), day),
            row(TransactionType::Expense, dec!(1200), Some((rent, "Rent")), day),
            row(TransactionType::Expense, dec!(15), None, day),
            row(TransactionType::Transfer, dec!(500), None, day),
        ];

        let summary = MonthlySummary::build(
            Uuid::new_v4(),
            YearMonth { year: 2024, month: 3 },
            &rows,
            Utc::now(),
        );

        assert_eq!(summary.total_income, dec!(3000));
        assert_eq!(summary.total_expenses, dec!(1315));
        assert_eq!(summary.net_amount, dec!(1685));

        let names: Vec<&str> = summary
            .categories
            .iter()
            .map(|c| c.category_name.as_str())
            .collect();
        assert_eq!(names, vec!["Rent", "Food", UNCATEGORIZED]);

        assert_eq!(summary.categories[1].total_amount, dec!(100));
        assert_eq!(summary.categories[1].count, 2);
        assert_eq!(summary.categories[2].category_id, "");
    }

    #[test]
    fn test_monthly_summary_empty_month() {
        let summary = MonthlySummary::build(
            Uuid::new_v4(),
            YearMonth { year: 2024, month: 3 },
            &[],
            Utc::now(),
        );

        assert!(summary.categories.is_empty());
        assert_eq!(summary.net_amount, Decimal::ZERO);
    }

    #[test]
    fn test_trends_ordered_oldest_first() {
        let food = Uuid::new_v4();
        let rows = vec![
            row(TransactionType::Expense, dec!(10), Some((food, "Food")), date(2024, 2, 3)),
            row(TransactionType::Expense, dec!(-5), Some((food, "Food")), date(2023, 12, 30)),
            row(TransactionType::Expense, dec!(7), None, date(2024, 2, 20)),
            row(TransactionType::Income, dec!(900), None, date(2024, 1, 1)),
        ];

        let trends = SpendingTrends::build(Uuid::new_v4(), None, &rows, Utc::now());

        assert_eq!(trends.period, "monthly");
        assert_eq!(
            trends.trends,
            vec![
                TrendPoint { month: 12, year: 2023, amount: dec!(5) },
                TrendPoint { month: 2, year: 2024, amount: dec!(17) },
            ]
        );
    }

    #[test]
    fn test_trends_category_filter() {
        let food = Uuid::new_v4();
        let rows = vec![
            row(TransactionType::Expense, dec!(10), Some((food, "Food")), date(2024, 2, 3)),
            row(TransactionType::Expense, dec!(7), None, date(2024, 2, 20)),
        ];

        let trends = SpendingTrends::build(Uuid::new_v4(), Some(food), &rows, Utc::now());
        assert_eq!(trends.trends.len(), 1);
        assert_eq!(trends.trends[0].amount, dec!(10));
    }

    #[test]
    fn test_cash_flow_by_day() {
        let range = DateRange {
            start: date(2024, 3, 1),
            end: date(2024, 3, 31),
        };
        let rows = vec![
            row(TransactionType::Income, dec!(100), None, date(2024, 3, 2)),
            row(TransactionType::Expense, dec!(-30), None, date(2024, 3, 2)),
            row(TransactionType::Expense, dec!(50), None, date(2024, 3, 10)),
            row(TransactionType::Income, dec!(999), None, date(2024, 4, 1)),
        ];

        let flow = CashFlow::build(Uuid::new_v4(), range, &rows, Utc::now());

        assert_eq!(flow.items.len(), 2);
        assert_eq!(flow.items[0].date, date(2024, 3, 2));
        assert_eq!(flow.items[0].net_flow, dec!(70));
        assert_eq!(flow.items[1].net_flow, dec!(-50));
        assert_eq!(flow.total_income, dec!(100));
        assert_eq!(flow.total_expense, dec!(80));
        assert_eq!(flow.net_cash_flow, dec!(20));
    }

    #[test]
    fn test_budget_status_boundaries() {
        assert_eq!(BudgetStatus::classify(dec!(100), dec!(79.99)), BudgetStatus::UnderBudget);
        assert_eq!(BudgetStatus::classify(dec!(100), dec!(80)), BudgetStatus::AtRisk);
        assert_eq!(BudgetStatus::classify(dec!(100), dec!(100)), BudgetStatus::AtRisk);
        assert_eq!(BudgetStatus::classify(dec!(100), dec!(120)), BudgetStatus::OverBudget);
    }

    #[test]
    fn test_budget_performance_rollup() {
        let food = Uuid::new_v4();
        let fun = Uuid::new_v4();
        let day = date(2024, 3, 5);
        let budgets = vec![budget(food, dec!(200)), budget(fun, dec!(50))];
        let rows = vec![
            row(TransactionType::Expense, dec!(120), Some((food, "Food")), day),
            row(TransactionType::Expense, dec!(60), Some((fun, "Fun")), day),
            row(TransactionType::Income, dec!(60), Some((fun, "Fun")), day),
        ];

        let report = BudgetPerformance::build(
            Uuid::new_v4(),
            YearMonth { year: 2024, month: 3 },
            &budgets,
            &rows,
            Utc::now(),
        );

        let food_usage = &report.budget_performance[0];
        assert_eq!(food_usage.spent_amount, dec!(120));
        assert_eq!(food_usage.remaining, dec!(80));
        assert_eq!(food_usage.percentage_used, dec!(60));
        assert_eq!(food_usage.status, BudgetStatus::UnderBudget);

        let fun_usage = &report.budget_performance[1];
        assert!(fun_usage.is_over_budget);
        assert_eq!(fun_usage.remaining, dec!(-10));

        let overall = &report.overall_performance;
        assert_eq!(overall.total_budgeted, dec!(250));
        assert_eq!(overall.total_spent, dec!(180));
        assert_eq!(overall.total_remaining, dec!(70));
        assert_eq!(overall.overall_percentage, dec!(72));
        assert_eq!(overall.budgets_count, 2);
        assert_eq!(overall.over_budget_count, 1);
        assert_eq!(overall.on_track_count, 1);
    }

    #[test]
    fn test_zero_budget_reports_zero_percent() {
        let food = Uuid::new_v4();
        let report = BudgetPerformance::build(
            Uuid::new_v4(),
            YearMonth { year: 2024, month: 3 },
            &[budget(food, Decimal::ZERO)],
            &[],
            Utc::now(),
        );

        assert_eq!(report.budget_performance[0].percentage_used, Decimal::ZERO);
        assert_eq!(report.budget_performance[0].status, BudgetStatus::UnderBudget);
        assert_eq!(report.overall_performance.overall_percentage, Decimal::ZERO);
    }

    fn keys(value: &serde_json::Value) -> Vec<&str> {
        let mut keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        keys.sort_unstable();
        keys
    }

    #[test]
    fn test_report_json_keys() {
        let user_id = Uuid::new_v4();
        let month = YearMonth { year: 2024, month: 3 };
        let food = Uuid::new_v4();
        let rows = vec![
            row(TransactionType::Income, dec!(100), None, date(2024, 3, 2)),
            row(TransactionType::Expense, dec!(30), Some((food, "Food")), date(2024, 3, 2)),
        ];

        let summary = MonthlySummary::build(user_id, month, &rows, Utc::now());
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(
            keys(&json["categories"][0]),
            vec!["category_id", "category_name", "count", "total_amount"]
        );
        assert_eq!(json["categories"][0]["count"], 1);

        let flow = CashFlow::build(user_id, month.as_range(), &rows, Utc::now());
        let json = serde_json::to_value(&flow).unwrap();
        assert_eq!(json["items"].as_array().unwrap().len(), 1);
        assert!(json.get("cash_flow").is_none());
        assert_eq!(
            keys(&json["items"][0]),
            vec!["date", "expenses", "income", "net_flow"]
        );

        let combined = ReportSummary {
            user_id,
            current_month: summary,
            spending_trends: SpendingTrends::build(user_id, None, &rows, Utc::now()),
            cash_flow: flow,
            generated_at: Utc::now(),
        };
        let json = serde_json::to_value(&combined).unwrap();
        assert_eq!(
            keys(&json),
            vec!["cash_flow", "current_month", "generated_at", "spending_trends", "user_id"]
        );
    }
}
