//! Forward-looking balance projection from recurring transactions.
//!
//! Starting from the current net balance, each future month applies every
//! active recurrence whose date range covers that month. The balance is
//! cumulative: month `i` includes the contributions of months `0..=i`.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use super::{Cents, Frequency, Recurrence, YearMonth};

/// Horizon used when the caller does not ask for one.
pub const DEFAULT_HORIZON_MONTHS: i64 = 12;

/// Longest horizon accepted (50 years).
pub const MAX_HORIZON_MONTHS: i64 = 600;

/// Weekly recurrences are approximated as four occurrences per month,
/// regardless of how many weeks the calendar month actually spans.
pub const WEEKS_PER_MONTH: Cents = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    #[error("months must be a positive number, got {0}")]
    NonPositiveHorizon(i64),

    #[error("months must be at most {max}, got {0}", max = MAX_HORIZON_MONTHS)]
    HorizonTooLong(i64),

    #[error("projection runs past the last representable date")]
    BeyondCalendar,
}

/// Projected balance at the end of one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectionPoint {
    /// `M/YYYY`, e.g. `7/2025`.
    #[serde(rename = "month")]
    pub month_label: String,
    #[serde(with = "super::units")]
    pub balance: Cents,
}

/// Validate a requested horizon and return it as a month count.
pub fn validate_horizon(months: i64) -> Result<u32, ProjectionError> {
    if months <= 0 {
        return Err(ProjectionError::NonPositiveHorizon(months));
    }
    if months > MAX_HORIZON_MONTHS {
        return Err(ProjectionError::HorizonTooLong(months));
    }
    Ok(months as u32)
}

/// Project month-end balances for `months` consecutive months starting with
/// the month containing `today`.
///
/// Inactive rules are ignored. A rule with an unreadable start or end date is
/// skipped (and logged once) rather than failing the whole projection.
pub fn project_balance(
    base_balance: Cents,
    rules: &[Recurrence],
    months: i64,
    today: NaiveDate,
) -> Result<Vec<ProjectionPoint>, ProjectionError> {
    let months = validate_horizon(months)?;
    let current = YearMonth::of(today);

    let schedules: Vec<Schedule> = rules
        .iter()
        .filter(|rule| rule.active)
        .filter_map(|rule| match Schedule::from_rule(rule) {
            Ok(schedule) => Some(schedule),
            Err(err) => {
                tracing::warn!(
                    recurrence_id = %rule.id,
                    name = %rule.name,
                    error = %err,
                    "skipping recurrence with malformed date"
                );
                None
            }
        })
        .collect();

    let mut balance = base_balance;
    let mut points = Vec::with_capacity(months as usize);

    for offset in 0..months {
        let target = current
            .plus_months(offset)
            .ok_or(ProjectionError::BeyondCalendar)?;
        for schedule in &schedules {
            balance = balance.saturating_add(schedule.contribution(target));
        }
        points.push(ProjectionPoint {
            month_label: target.to_string(),
            balance,
        });
    }

    Ok(points)
}

/// A recurrence with its dates resolved to calendar months.
struct Schedule<'a> {
    rule: &'a Recurrence,
    start: YearMonth,
    end: Option<YearMonth>,
}

impl<'a> Schedule<'a> {
    fn from_rule(rule: &'a Recurrence) -> Result<Self, super::MalformedDate> {
        Ok(Self {
            rule,
            start: rule.start_month()?,
            end: rule.end_month()?,
        })
    }

    fn covers(&self, target: YearMonth) -> bool {
        self.start <= target && self.end.is_none_or(|end| target <= end)
    }

    /// Signed amount this rule adds to `target`'s balance.
    fn contribution(&self, target: YearMonth) -> Cents {
        if !self.covers(target) {
            return 0;
        }
        let kind = self.rule.kind;
        let amount = self.rule.amount;

        match self.rule.frequency {
            Frequency::Monthly => kind.signed(amount),
            Frequency::Yearly if target.month() == self.start.month() => kind.signed(amount),
            Frequency::Yearly => 0,
            // Applies in every covered month with no further gating.
            Frequency::Weekly => kind.signed(amount.saturating_mul(WEEKS_PER_MONTH)),
            Frequency::Custom => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EntryKind;
    use uuid::Uuid;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 16).unwrap()
    }

    fn rule(kind: EntryKind, amount: Cents, frequency: Frequency, start: &str) -> Recurrence {
        Recurrence::new(
            Uuid::new_v4(),
            "rule".to_string(),
            amount,
            kind,
            frequency,
            start.to_string(),
        )
    }

    fn balances(points: &[ProjectionPoint]) -> Vec<Cents> {
        points.iter().map(|p| p.balance).collect()
    }

    #[test]
    fn test_no_rules_keeps_balance_constant() {
        let points = project_balance(100000, &[], 6, today()).unwrap();
        assert_eq!(points.len(), 6);
        assert!(points.iter().all(|p| p.balance == 100000));
    }

    #[test]
    fn test_monthly_income_example() {
        let rules = [rule(EntryKind::Income, 50000, Frequency::Monthly, "2025-07-01")];
        let points = project_balance(100000, &rules, 3, today()).unwrap();

        assert_eq!(balances(&points), vec![150000, 200000, 250000]);
        let labels: Vec<&str> = points.iter().map(|p| p.month_label.as_str()).collect();
        assert_eq!(labels, vec!["7/2025", "8/2025", "9/2025"]);
    }

    #[test]
    fn test_monthly_rule_grows_linearly() {
        let rules = [rule(EntryKind::Income, 1234, Frequency::Monthly, "2025-07-31")];
        let points = project_balance(-500, &rules, 24, today()).unwrap();
        for (i, point) in points.iter().enumerate() {
            assert_eq!(point.balance, -500 + 1234 * (i as Cents + 1));
        }
    }

    #[test]
    fn test_weekly_expense_is_four_times_amount_every_month() {
        let rules = [rule(EntryKind::Expense, 2500, Frequency::Weekly, "2025-01-10")];
        let points = project_balance(0, &rules, 4, today()).unwrap();
        assert_eq!(balances(&points), vec![-10000, -20000, -30000, -40000]);
    }

    #[test]
    fn test_yearly_rule_hits_once_per_cycle() {
        // Start month is September.
        let rules = [rule(EntryKind::Income, 100000, Frequency::Yearly, "2024-09-05")];
        let points = project_balance(0, &rules, 24, today()).unwrap();

        let changes: Vec<&str> = points
            .windows(2)
            .filter(|w| w[1].balance != w[0].balance)
            .map(|w| w[1].month_label.as_str())
            .collect();
        assert_eq!(changes, vec!["9/2025", "9/2026"]);
        assert_eq!(points.last().unwrap().balance, 200000);
    }

    #[test]
    fn test_yearly_rule_starting_in_future_waits_for_start() {
        let rules = [rule(EntryKind::Income, 100000, Frequency::Yearly, "2026-07-01")];
        let points = project_balance(0, &rules, 13, today()).unwrap();
        assert_eq!(points[11].balance, 0);
        assert_eq!(points[12].month_label, "7/2026");
        assert_eq!(points[12].balance, 100000);
    }

    #[test]
    fn test_ended_rule_contributes_nothing() {
        let rules = [rule(EntryKind::Expense, 9900, Frequency::Monthly, "2024-01-01")
            .with_end_date("2025-06-30")];
        let points = project_balance(5000, &rules, 12, today()).unwrap();
        assert!(points.iter().all(|p| p.balance == 5000));
    }

    #[test]
    fn test_end_month_is_inclusive() {
        let rules = [rule(EntryKind::Expense, 100, Frequency::Monthly, "2025-01-01")
            .with_end_date("2025-08-01")];
        let points = project_balance(0, &rules, 4, today()).unwrap();
        assert_eq!(balances(&points), vec![-100, -200, -200, -200]);
    }

    #[test]
    fn test_custom_and_inactive_rules_are_ignored() {
        let rules = [
            rule(EntryKind::Income, 100, Frequency::Custom, "2025-01-01"),
            rule(EntryKind::Income, 100, Frequency::Monthly, "2025-01-01").with_active(false),
        ];
        let points = project_balance(42, &rules, 3, today()).unwrap();
        assert!(points.iter().all(|p| p.balance == 42));
    }

    #[test]
    fn test_malformed_rule_is_skipped_not_fatal() {
        let rules = [
            rule(EntryKind::Income, 100, Frequency::Monthly, "not-a-date"),
            rule(EntryKind::Income, 100, Frequency::Monthly, "2025-01-01").with_end_date("soon"),
            rule(EntryKind::Income, 300, Frequency::Monthly, "2025-07-01"),
        ];
        let points = project_balance(0, &rules, 2, today()).unwrap();
        assert_eq!(balances(&points), vec![300, 600]);
    }

    #[test]
    fn test_mixed_rules_accumulate() {
        let rules = [
            rule(EntryKind::Income, 500000, Frequency::Monthly, "2025-01-01"),
            rule(EntryKind::Expense, 120000, Frequency::Monthly, "2025-01-01"),
            rule(EntryKind::Expense, 5000, Frequency::Weekly, "2025-08-01"),
        ];
        let points = project_balance(0, &rules, 3, today()).unwrap();
        assert_eq!(balances(&points), vec![380000, 740000, 1100000]);
    }

    #[test]
    fn test_labels_wrap_into_next_year() {
        let december = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        let points = project_balance(0, &[], 14, december).unwrap();
        assert_eq!(points[0].month_label, "12/2025");
        assert_eq!(points[1].month_label, "1/2026");
        assert_eq!(points[12].month_label, "12/2026");
        assert_eq!(points[13].month_label, "1/2027");
    }

    #[test]
    fn test_horizon_validation() {
        assert_eq!(
            project_balance(0, &[], 0, today()),
            Err(ProjectionError::NonPositiveHorizon(0))
        );
        assert_eq!(
            project_balance(0, &[], -3, today()),
            Err(ProjectionError::NonPositiveHorizon(-3))
        );
        assert_eq!(
            validate_horizon(MAX_HORIZON_MONTHS + 1),
            Err(ProjectionError::HorizonTooLong(MAX_HORIZON_MONTHS + 1))
        );
        assert_eq!(validate_horizon(DEFAULT_HORIZON_MONTHS), Ok(12));
    }

    #[test]
    fn test_projection_past_calendar_end_is_an_error() {
        assert_eq!(
            project_balance(0, &[], 2, NaiveDate::MAX),
            Err(ProjectionError::BeyondCalendar)
        );
        assert_eq!(project_balance(0, &[], 1, NaiveDate::MAX).unwrap().len(), 1);
    }

    #[test]
    fn test_serializes_like_dashboard_expects() {
        let point = ProjectionPoint {
            month_label: "7/2025".to_string(),
            balance: 123456,
        };
        assert_eq!(
            serde_json::to_string(&point).unwrap(),
            r#"{"month":"7/2025","balance":1234.56}"#
        );
    }
}
