use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fmt;

/// A calendar month. Ordering is chronological (year first, then month).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct YearMonth {
    year: i32,
    /// 1..=12
    month: u32,
}

impl YearMonth {
    /// `None` unless `month` is 1..=12 and the month is representable as a
    /// calendar date.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The month `offset` months after this one, wrapping December into the
    /// next year. `None` past the end of the calendar.
    pub fn plus_months(&self, offset: u32) -> Option<Self> {
        let zero_based = (self.month - 1).checked_add(offset)?;
        let years = i32::try_from(zero_based / 12).ok()?;
        Self::new(self.year.checked_add(years)?, zero_based % 12 + 1)
    }

    /// First and first-of-next-month dates, as a half-open range.
    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let next = self.plus_months(1)?;
        Some((
            NaiveDate::from_ymd_opt(self.year, self.month, 1)?,
            NaiveDate::from_ymd_opt(next.year, next.month, 1)?,
        ))
    }
}

/// Renders as `M/YYYY`, e.g. `7/2025`.
impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.month, self.year)
    }
}

/// Parse a calendar date as clients send it: either a plain `YYYY-MM-DD`
/// or a full timestamp (RFC 3339, or ISO 8601 without offset).
pub fn parse_calendar_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Some(ts.date_naive());
    }
    NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|ts| ts.date())
}

/// Serde adapter for `NaiveDate` fields that accepts anything
/// [`parse_calendar_date`] does and serializes as `YYYY-MM-DD`.
pub mod calendar_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format("%Y-%m-%d"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_calendar_date(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid date '{}'", raw)))
    }
}
