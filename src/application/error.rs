use thiserror::Error;

use crate::domain::ProjectionError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Email already registered: {0}")]
    EmailAlreadyRegistered(String),

    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    #[error("Goal not found: {0}")]
    GoalNotFound(String),

    #[error("Budget not found: {0}")]
    BudgetNotFound(String),

    #[error("Recurrence not found: {0}")]
    RecurrenceNotFound(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid projection: {0}")]
    InvalidProjection(#[from] ProjectionError),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}
