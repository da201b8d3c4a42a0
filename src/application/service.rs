use chrono::NaiveDate;
use serde::Deserialize;

use crate::domain::{
    Budget, BudgetId, BudgetStatus, Category, CategoryId, Cents, DEFAULT_GOAL_CATEGORY, EntryKind,
    Frequency, Goal, GoalId, ProjectionPoint, Recurrence, RecurrenceId, Transaction,
    TransactionId, User, UserId, YearMonth, normalize_email, parse_calendar_date, project_balance,
    validate_horizon,
};
use crate::storage::Repository;

use super::AppError;

/// Application service providing high-level operations over a user's
/// finances. This is the interface for every client (HTTP API, CLI).
#[derive(Clone)]
pub struct FinanceService {
    repo: Repository,
}

/// Fields a client supplies when creating or replacing a transaction.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInput {
    pub description: String,
    #[serde(with = "crate::domain::units")]
    pub amount: Cents,
    #[serde(with = "crate::domain::calendar_date")]
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub category: String,
    #[serde(default)]
    pub is_future: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalInput {
    pub name: String,
    #[serde(with = "crate::domain::units")]
    pub current: Cents,
    #[serde(with = "crate::domain::units")]
    pub target: Cents,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetInput {
    #[serde(with = "crate::domain::units")]
    pub total: Cents,
    pub month: u32,
    pub year: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceInput {
    pub name: String,
    #[serde(with = "crate::domain::units")]
    pub amount: Cents,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub category: String,
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
    pub frequency: Frequency,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Fields of the profile a user may change.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInput {
    pub name: String,
    #[serde(default)]
    pub profile_picture_url: Option<String>,
}

impl FinanceService {
    /// Create a new finance service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Open (creating if needed) and migrate the database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        tracing::debug!(database = database_path, "database ready");
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    // ========================
    // User operations
    // ========================

    /// Register a new user. Emails are unique (case-insensitive).
    pub async fn register_user(&self, name: String, email: String) -> Result<User, AppError> {
        let name = require_text("name", name)?;
        let email = normalize_email(&email);
        if !email.contains('@') {
            return Err(AppError::InvalidInput(format!(
                "'{}' is not an email address",
                email
            )));
        }

        if self.repo.get_user_by_email(&email).await?.is_some() {
            return Err(AppError::EmailAlreadyRegistered(email));
        }

        let user = User::new(name, email);
        self.repo.save_user(&user).await?;
        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    pub async fn get_user(&self, id: UserId) -> Result<User, AppError> {
        self.repo
            .get_user(id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(id.to_string()))
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<User, AppError> {
        let email = normalize_email(email);
        self.repo
            .get_user_by_email(&email)
            .await?
            .ok_or_else(|| AppError::UserNotFound(email.clone()))
    }

    pub async fn update_profile(&self, id: UserId, input: ProfileInput) -> Result<User, AppError> {
        let mut user = self.get_user(id).await?;
        user.name = require_text("name", input.name)?;
        user.profile_picture_url = input
            .profile_picture_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        self.repo.update_user(&user).await?;
        Ok(user)
    }

    // ========================
    // Transaction operations
    // ========================

    pub async fn create_transaction(
        &self,
        user_id: UserId,
        input: TransactionInput,
    ) -> Result<Transaction, AppError> {
        let tx = build_transaction(user_id, input)?;
        self.repo.save_transaction(&tx).await?;
        Ok(tx)
    }

    pub async fn list_transactions(&self, user_id: UserId) -> Result<Vec<Transaction>, AppError> {
        Ok(self.repo.list_transactions(user_id).await?)
    }

    /// Replace every editable field of a transaction.
    pub async fn update_transaction(
        &self,
        user_id: UserId,
        id: TransactionId,
        input: TransactionInput,
    ) -> Result<Transaction, AppError> {
        let mut tx = build_transaction(user_id, input)?;
        tx.id = id;

        if !self.repo.update_transaction(&tx).await? {
            return Err(AppError::TransactionNotFound(id.to_string()));
        }
        Ok(tx)
    }

    pub async fn delete_transaction(
        &self,
        user_id: UserId,
        id: TransactionId,
    ) -> Result<Transaction, AppError> {
        let tx = self
            .repo
            .get_transaction(user_id, id)
            .await?
            .ok_or_else(|| AppError::TransactionNotFound(id.to_string()))?;
        self.repo.delete_transaction(user_id, id).await?;
        Ok(tx)
    }

    /// Net of all recorded transactions: income minus expense.
    pub async fn net_balance(&self, user_id: UserId) -> Result<Cents, AppError> {
        Ok(self.repo.compute_net_balance(user_id).await?)
    }

    // ========================
    // Category operations
    // ========================

    pub async fn create_category(
        &self,
        user_id: UserId,
        input: CategoryInput,
    ) -> Result<Category, AppError> {
        let category = Category::new(
            user_id,
            require_text("name", input.name)?,
            require_text("color", input.color)?,
        );
        self.repo.save_category(&category).await?;
        Ok(category)
    }

    pub async fn list_categories(&self, user_id: UserId) -> Result<Vec<Category>, AppError> {
        Ok(self.repo.list_categories(user_id).await?)
    }

    pub async fn update_category(
        &self,
        user_id: UserId,
        id: CategoryId,
        input: CategoryInput,
    ) -> Result<Category, AppError> {
        let mut category = Category::new(
            user_id,
            require_text("name", input.name)?,
            require_text("color", input.color)?,
        );
        category.id = id;

        if !self.repo.update_category(&category).await? {
            return Err(AppError::CategoryNotFound(id.to_string()));
        }
        Ok(category)
    }

    pub async fn delete_category(
        &self,
        user_id: UserId,
        id: CategoryId,
    ) -> Result<Category, AppError> {
        let category = self
            .repo
            .get_category(user_id, id)
            .await?
            .ok_or_else(|| AppError::CategoryNotFound(id.to_string()))?;
        self.repo.delete_category(user_id, id).await?;
        Ok(category)
    }

    // ========================
    // Goal operations
    // ========================

    pub async fn create_goal(&self, user_id: UserId, input: GoalInput) -> Result<Goal, AppError> {
        let goal = build_goal(user_id, input)?;
        self.repo.save_goal(&goal).await?;
        Ok(goal)
    }

    pub async fn list_goals(&self, user_id: UserId) -> Result<Vec<Goal>, AppError> {
        Ok(self.repo.list_goals(user_id).await?)
    }

    pub async fn update_goal(
        &self,
        user_id: UserId,
        id: GoalId,
        input: GoalInput,
    ) -> Result<Goal, AppError> {
        let mut goal = build_goal(user_id, input)?;
        goal.id = id;

        if !self.repo.update_goal(&goal).await? {
            return Err(AppError::GoalNotFound(id.to_string()));
        }
        Ok(goal)
    }

    pub async fn delete_goal(&self, user_id: UserId, id: GoalId) -> Result<Goal, AppError> {
        let goal = self
            .repo
            .get_goal(user_id, id)
            .await?
            .ok_or_else(|| AppError::GoalNotFound(id.to_string()))?;
        self.repo.delete_goal(user_id, id).await?;
        Ok(goal)
    }

    // ========================
    // Budget operations
    // ========================

    pub async fn create_budget(
        &self,
        user_id: UserId,
        input: BudgetInput,
    ) -> Result<Budget, AppError> {
        let budget = build_budget(user_id, input)?;
        self.repo.save_budget(&budget).await?;
        Ok(budget)
    }

    pub async fn list_budgets(&self, user_id: UserId) -> Result<Vec<Budget>, AppError> {
        Ok(self.repo.list_budgets(user_id).await?)
    }

    pub async fn get_budget(&self, user_id: UserId, id: BudgetId) -> Result<Budget, AppError> {
        self.repo
            .get_budget(user_id, id)
            .await?
            .ok_or_else(|| AppError::BudgetNotFound(id.to_string()))
    }

    pub async fn update_budget(
        &self,
        user_id: UserId,
        id: BudgetId,
        input: BudgetInput,
    ) -> Result<Budget, AppError> {
        let mut budget = build_budget(user_id, input)?;
        budget.id = id;

        if !self.repo.update_budget(&budget).await? {
            return Err(AppError::BudgetNotFound(id.to_string()));
        }
        Ok(budget)
    }

    pub async fn delete_budget(&self, user_id: UserId, id: BudgetId) -> Result<Budget, AppError> {
        let budget = self.get_budget(user_id, id).await?;
        self.repo.delete_budget(user_id, id).await?;
        Ok(budget)
    }

    /// Spending vs. limit for the budget's month.
    pub async fn budget_status(
        &self,
        user_id: UserId,
        id: BudgetId,
    ) -> Result<BudgetStatus, AppError> {
        let budget = self.get_budget(user_id, id).await?;
        let (from, to) = budget.date_range().ok_or_else(|| {
            AppError::InvalidDate(format!("budget period {} is out of range", budget.period))
        })?;
        let spent = self.repo.sum_expenses_between(user_id, from, to).await?;
        Ok(BudgetStatus::new(budget, spent))
    }

    // ========================
    // Recurrence operations
    // ========================

    pub async fn create_recurrence(
        &self,
        user_id: UserId,
        input: RecurrenceInput,
    ) -> Result<Recurrence, AppError> {
        let recurrence = build_recurrence(user_id, input)?;
        self.repo.save_recurrence(&recurrence).await?;
        Ok(recurrence)
    }

    pub async fn list_recurrences(&self, user_id: UserId) -> Result<Vec<Recurrence>, AppError> {
        Ok(self.repo.list_recurrences(user_id, false).await?)
    }

    pub async fn update_recurrence(
        &self,
        user_id: UserId,
        id: RecurrenceId,
        input: RecurrenceInput,
    ) -> Result<Recurrence, AppError> {
        let mut recurrence = build_recurrence(user_id, input)?;
        recurrence.id = id;

        if !self.repo.update_recurrence(&recurrence).await? {
            return Err(AppError::RecurrenceNotFound(id.to_string()));
        }
        Ok(recurrence)
    }

    pub async fn delete_recurrence(
        &self,
        user_id: UserId,
        id: RecurrenceId,
    ) -> Result<Recurrence, AppError> {
        let recurrence = self
            .repo
            .get_recurrence(user_id, id)
            .await?
            .ok_or_else(|| AppError::RecurrenceNotFound(id.to_string()))?;
        self.repo.delete_recurrence(user_id, id).await?;
        Ok(recurrence)
    }

    // ========================
    // Projection
    // ========================

    /// Project the user's balance over the next `months` months, starting
    /// with the month containing `today`.
    pub async fn project_balance(
        &self,
        user_id: UserId,
        months: i64,
        today: NaiveDate,
    ) -> Result<Vec<ProjectionPoint>, AppError> {
        // Reject bad horizons before touching the database.
        validate_horizon(months)?;

        let base_balance = self.repo.compute_net_balance(user_id).await?;
        let rules = self.repo.list_recurrences(user_id, true).await?;
        tracing::debug!(
            user_id = %user_id,
            base_balance,
            rules = rules.len(),
            months,
            "projecting balance"
        );

        Ok(project_balance(base_balance, &rules, months, today)?)
    }
}

fn require_text(field: &str, value: String) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}

fn require_positive(field: &str, amount: Cents) -> Result<Cents, AppError> {
    if amount <= 0 {
        return Err(AppError::InvalidAmount(format!("{} must be positive", field)));
    }
    Ok(amount)
}

fn require_non_negative(field: &str, amount: Cents) -> Result<Cents, AppError> {
    if amount < 0 {
        return Err(AppError::InvalidAmount(format!(
            "{} must not be negative",
            field
        )));
    }
    Ok(amount)
}

fn build_transaction(user_id: UserId, input: TransactionInput) -> Result<Transaction, AppError> {
    let tx = Transaction::new(
        user_id,
        require_text("description", input.description)?,
        require_positive("amount", input.amount)?,
        input.date,
        input.kind,
        require_text("category", input.category)?,
    );
    Ok(tx.with_future(input.is_future))
}

fn build_goal(user_id: UserId, input: GoalInput) -> Result<Goal, AppError> {
    let goal = Goal::new(
        user_id,
        require_text("name", input.name)?,
        require_non_negative("current", input.current)?,
        require_positive("target", input.target)?,
    );
    let category = input
        .category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_GOAL_CATEGORY.to_string());
    Ok(goal.with_category(category))
}

fn build_budget(user_id: UserId, input: BudgetInput) -> Result<Budget, AppError> {
    if !(1..=12).contains(&input.month) {
        return Err(AppError::InvalidInput(format!(
            "month must be between 1 and 12, got {}",
            input.month
        )));
    }
    // The status query needs the following month to exist as well.
    let period = YearMonth::new(input.year, input.month)
        .filter(|period| period.bounds().is_some())
        .ok_or_else(|| AppError::InvalidInput(format!("year {} is out of range", input.year)))?;
    Ok(Budget::new(
        user_id,
        require_non_negative("total", input.total)?,
        period,
    ))
}

/// Validate dates on the way in so newly written rules always project.
fn build_recurrence(user_id: UserId, input: RecurrenceInput) -> Result<Recurrence, AppError> {
    let start_date = input.start_date.trim().to_string();
    let start = parse_calendar_date(&start_date)
        .ok_or_else(|| AppError::InvalidDate(format!("startDate '{}'", start_date)))?;

    let end_date = input
        .end_date
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());
    if let Some(raw) = &end_date {
        let end = parse_calendar_date(raw)
            .ok_or_else(|| AppError::InvalidDate(format!("endDate '{}'", raw)))?;
        if end < start {
            return Err(AppError::InvalidDate(format!(
                "endDate '{}' is before startDate '{}'",
                raw, start_date
            )));
        }
    }

    let mut recurrence = Recurrence::new(
        user_id,
        require_text("name", input.name)?,
        require_non_negative("amount", input.amount)?,
        input.kind,
        input.frequency,
        start_date,
    )
    .with_category(input.category.trim())
    .with_active(input.active);
    recurrence.end_date = end_date;

    Ok(recurrence)
}
