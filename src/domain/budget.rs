use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use super::{Cents, UserId, YearMonth};

pub type BudgetId = Uuid;

/// A spending ceiling for one calendar month.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: BudgetId,
    pub user_id: UserId,
    #[serde(with = "super::units")]
    pub total: Cents,
    #[serde(flatten)]
    pub period: YearMonth,
}

impl Budget {
    pub fn new(user_id: UserId, total: Cents, period: YearMonth) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            total,
            period,
        }
    }

    /// Half-open date range `[first day, first day of next month)` covered
    /// by this budget. `None` when the month is the last the calendar holds.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.period.bounds()
    }
}

/// Spending against a budget for its month.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStatus {
    pub budget: Budget,
    #[serde(with = "super::units")]
    pub spent: Cents,
    #[serde(with = "super::units")]
    pub remaining: Cents,
    /// Share of the total already spent, in percent. Zero-total budgets
    /// report 0 when nothing is spent and 100 otherwise.
    pub percent_used: f64,
    /// Spending exceeds the total.
    pub over_budget: bool,
}

impl BudgetStatus {
    pub fn new(budget: Budget, spent: Cents) -> Self {
        let remaining = budget.total.saturating_sub(spent);
        let percent_used = if budget.total > 0 {
            spent as f64 / budget.total as f64 * 100.0
        } else if spent > 0 {
            100.0
        } else {
            0.0
        };
        Self {
            budget,
            spent,
            remaining,
            percent_used,
            over_budget: remaining < 0,
        }
    }
}
