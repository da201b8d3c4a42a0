use std::fmt;

/// Money is represented as integer cents to avoid floating-point drift.
/// 1 unit = 100 cents, so 50.00 = 5000 cents.
pub type Cents = i64;

/// Format cents as a human-readable amount.
/// Example: 5000 -> "50.00", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.unsigned_abs();
    let units = abs_cents / 100;
    let remainder = abs_cents % 100;
    format!("{}{}.{:02}", sign, units, remainder)
}

/// Convert a decimal amount (as carried in JSON) into cents, rounding to the
/// nearest cent.
pub fn cents_from_units(units: f64) -> Result<Cents, MoneyError> {
    if !units.is_finite() {
        return Err(MoneyError::NotFinite);
    }
    let cents = (units * 100.0).round();
    if cents.abs() > i64::MAX as f64 {
        return Err(MoneyError::OutOfRange);
    }
    Ok(cents as Cents)
}

/// Convert cents back into a decimal amount for the wire.
pub fn cents_to_units(cents: Cents) -> f64 {
    cents as f64 / 100.0
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    NotFinite,
    OutOfRange,
}

impl fmt::Display for MoneyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoneyError::NotFinite => write!(f, "amount must be a finite number"),
            MoneyError::OutOfRange => write!(f, "amount is out of range"),
        }
    }
}

impl std::error::Error for MoneyError {}

/// Serde adapter: `Cents` fields travel as decimal numbers (`12.34`).
///
/// Use with `#[serde(with = "crate::domain::units")]`.
pub mod units {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    use super::{Cents, cents_from_units, cents_to_units};

    pub fn serialize<S: Serializer>(cents: &Cents, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(cents_to_units(*cents))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Cents, D::Error> {
        let units = f64::deserialize(deserializer)?;
        cents_from_units(units).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(5000), "50.00");
        assert_eq!(format_cents(1234), "12.34");
        assert_eq!(format_cents(1), "0.01");
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(-5000), "-50.00");
        assert_eq!(format_cents(i64::MIN), "-92233720368547758.08");
        assert_eq!(format_cents(-1), "-0.01");
    }

    #[test]
    fn test_cents_from_units_rounds_to_nearest_cent() {
        assert_eq!(cents_from_units(12.34), Ok(1234));
        assert_eq!(cents_from_units(0.1 + 0.2), Ok(30));
        assert_eq!(cents_from_units(1500.0), Ok(150000));
    }

    #[test]
    fn test_cents_from_units_rejects_non_finite() {
        assert_eq!(cents_from_units(f64::NAN), Err(MoneyError::NotFinite));
        assert_eq!(cents_from_units(f64::INFINITY), Err(MoneyError::NotFinite));
        assert_eq!(cents_from_units(1e300), Err(MoneyError::OutOfRange));
    }

    #[test]
    fn test_units_serde_adapter() {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Row {
            #[serde(with = "units")]
            amount: Cents,
        }

        let row: Row = serde_json::from_str(r#"{"amount": 1234.56}"#).unwrap();
        assert_eq!(row.amount, 123456);
        assert_eq!(
            serde_json::to_string(&Row { amount: -2500 }).unwrap(),
            r#"{"amount":-25.0}"#
        );
    }
}
