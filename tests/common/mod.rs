// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::NaiveDate;
use cyberfinance::application::{FinanceService, RecurrenceInput, TransactionInput};
use cyberfinance::domain::{Cents, EntryKind, Frequency, User};
use cyberfinance::storage::Repository;
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(FinanceService, TempDir)> {
    let (repo, temp_dir) = test_repository().await?;
    Ok((FinanceService::new(repo), temp_dir))
}

/// Helper to create a migrated repository in a temporary database, for tests
/// that need to write rows the service would reject
pub async fn test_repository() -> Result<(Repository, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let url = format!("sqlite:{}?mode=rwc", db_path.to_str().unwrap());
    let repo = Repository::init(&url).await?;
    Ok((repo, temp_dir))
}

/// Helper to parse a date string
pub fn date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

/// Register a user with a throwaway address derived from `name`
pub async fn register(service: &FinanceService, name: &str) -> Result<User> {
    let email = format!("{}@example.com", name.to_lowercase());
    Ok(service.register_user(name.to_string(), email).await?)
}

pub fn transaction(
    description: &str,
    amount: Cents,
    kind: EntryKind,
    date_str: &str,
) -> TransactionInput {
    TransactionInput {
        description: description.to_string(),
        amount,
        date: date(date_str),
        kind,
        category: "General".to_string(),
        is_future: false,
    }
}

pub fn recurrence(
    name: &str,
    amount: Cents,
    kind: EntryKind,
    frequency: Frequency,
    start_date: &str,
) -> RecurrenceInput {
    RecurrenceInput {
        name: name.to_string(),
        amount,
        kind,
        category: "General".to_string(),
        start_date: start_date.to_string(),
        end_date: None,
        frequency,
        active: true,
    }
}
