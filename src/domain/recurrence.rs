use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::{Cents, EntryKind, UserId, YearMonth, parse_calendar_date};

pub type RecurrenceId = Uuid;

/// How often a recurring transaction repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Monthly,
    Weekly,
    Yearly,
    /// User-managed cadence; never contributes to projections.
    Custom,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Monthly => "monthly",
            Frequency::Weekly => "weekly",
            Frequency::Yearly => "yearly",
            Frequency::Custom => "custom",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "monthly" => Some(Frequency::Monthly),
            "weekly" => Some(Frequency::Weekly),
            "yearly" => Some(Frequency::Yearly),
            "custom" => Some(Frequency::Custom),
            _ => None,
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored date on a recurrence could not be read as a calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} '{value}' is not a valid date")]
pub struct MalformedDate {
    pub field: &'static str,
    pub value: String,
}

/// A template for a repeating income or expense (salary, rent, subscriptions).
///
/// Dates are kept as the text the client sent. They are validated on write,
/// but rows written by older clients may still hold unreadable values, so
/// readers go through [`Recurrence::start_month`] and [`Recurrence::end_month`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recurrence {
    pub id: RecurrenceId,
    pub user_id: UserId,
    pub name: String,
    #[serde(with = "super::units")]
    pub amount: Cents,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub category: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub frequency: Frequency,
    pub active: bool,
}

impl Recurrence {
    pub fn new(
        user_id: UserId,
        name: String,
        amount: Cents,
        kind: EntryKind,
        frequency: Frequency,
        start_date: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            amount,
            kind,
            category: String::new(),
            start_date,
            end_date: None,
            frequency,
            active: true,
        }
    }

    pub fn with_end_date(mut self, end_date: impl Into<String>) -> Self {
        self.end_date = Some(end_date.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Calendar month of the first occurrence.
    pub fn start_month(&self) -> Result<YearMonth, MalformedDate> {
        parse_calendar_date(&self.start_date)
            .map(YearMonth::of)
            .ok_or_else(|| MalformedDate {
                field: "startDate",
                value: self.start_date.clone(),
            })
    }

    /// Calendar month of the last occurrence, if the recurrence ends.
    /// An empty string counts as "no end date".
    pub fn end_month(&self) -> Result<Option<YearMonth>, MalformedDate> {
        match self.end_date.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => parse_calendar_date(raw)
                .map(|date| Some(YearMonth::of(date)))
                .ok_or_else(|| MalformedDate {
                    field: "endDate",
                    value: raw.to_string(),
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(start: &str) -> Recurrence {
        Recurrence::new(
            Uuid::new_v4(),
            "rent".to_string(),
            120000,
            EntryKind::Expense,
            Frequency::Monthly,
            start.to_string(),
        )
    }

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    #[test]
    fn test_frequency_parse() {
        assert_eq!(Frequency::from_str("Weekly"), Some(Frequency::Weekly));
        assert_eq!(Frequency::from_str("custom"), Some(Frequency::Custom));
        assert_eq!(Frequency::from_str("daily"), None);
    }

    #[test]
    fn test_months_ignore_day_of_month() {
        let r = rule("2025-07-15").with_end_date("2025-09-02T08:00:00Z");
        assert_eq!(r.start_month(), Ok(ym(2025, 7)));
        assert_eq!(r.end_month(), Ok(Some(ym(2025, 9))));
    }

    #[test]
    fn test_blank_end_date_is_open_ended() {
        let r = rule("2020-01-01").with_end_date("  ");
        assert_eq!(r.end_month(), Ok(None));
        assert_eq!(rule("2020-01-01").end_month(), Ok(None));
    }

    #[test]
    fn test_malformed_dates_are_reported() {
        let bad_start = rule("next tuesday");
        assert_eq!(
            bad_start.start_month(),
            Err(MalformedDate {
                field: "startDate",
                value: "next tuesday".to_string(),
            })
        );

        let bad_end = rule("2025-01-01").with_end_date("2025-13-01");
        assert_eq!(bad_end.end_month().unwrap_err().field, "endDate");
    }

    #[test]
    fn test_wire_shape() {
        let r = rule("2025-07-01").with_category("housing");
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["type"], "expense");
        assert_eq!(json["frequency"], "monthly");
        assert_eq!(json["startDate"], "2025-07-01");
        assert_eq!(json["amount"], 1200.0);
        assert_eq!(json["active"], true);
    }
}
