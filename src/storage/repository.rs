use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::domain::{
    Budget, BudgetId, Category, CategoryId, Cents, EntryKind, Frequency, Goal, GoalId, Recurrence,
    RecurrenceId, Transaction, TransactionId, User, UserId, YearMonth,
};

use super::MIGRATION_001_INITIAL;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Repository for persisting and querying a user's finance records.
///
/// Every read and write past the user table is scoped by `user_id`, so a
/// record id belonging to someone else behaves exactly like a missing one.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database URL (e.g. `sqlite:finance.db?mode=rwc`).
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations. Safe to call on an already migrated database.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // User operations
    // ========================

    pub async fn save_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, profile_picture_url, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.id.to_string())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.profile_picture_url)
        .bind(user.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save user")?;
        Ok(())
    }

    pub async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, name, email, profile_picture_url, created_at FROM users WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch user")?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, name, email, profile_picture_url, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch user by email")?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    pub async fn update_user(&self, user: &User) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET name = ?, profile_picture_url = ? WHERE id = ?")
            .bind(&user.name)
            .bind(&user.profile_picture_url)
            .bind(user.id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to update user")?;
        Ok(result.rows_affected() > 0)
    }

    fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
        let id_str: String = row.get("id");
        let created_at_str: String = row.get("created_at");

        Ok(User {
            id: Uuid::parse_str(&id_str).context("Invalid user ID")?,
            name: row.get("name"),
            email: row.get("email"),
            profile_picture_url: row.get("profile_picture_url"),
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
        })
    }

    // ========================
    // Transaction operations
    // ========================

    pub async fn save_transaction(&self, tx: &Transaction) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO transactions (id, user_id, description, amount_cents, date, kind, category, is_future)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(tx.id.to_string())
        .bind(tx.user_id.to_string())
        .bind(&tx.description)
        .bind(tx.amount)
        .bind(tx.date.format(DATE_FORMAT).to_string())
        .bind(tx.kind.as_str())
        .bind(&tx.category)
        .bind(tx.is_future)
        .execute(&self.pool)
        .await
        .context("Failed to save transaction")?;
        Ok(())
    }

    pub async fn get_transaction(
        &self,
        user_id: UserId,
        id: TransactionId,
    ) -> Result<Option<Transaction>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, description, amount_cents, date, kind, category, is_future
            FROM transactions
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch transaction")?;

        row.as_ref().map(Self::row_to_transaction).transpose()
    }

    /// List a user's transactions, oldest first.
    pub async fn list_transactions(&self, user_id: UserId) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, description, amount_cents, date, kind, category, is_future
            FROM transactions
            WHERE user_id = ?
            ORDER BY date, rowid
            "#,
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list transactions")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    pub async fn update_transaction(&self, tx: &Transaction) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE transactions
            SET description = ?, amount_cents = ?, date = ?, kind = ?, category = ?, is_future = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(&tx.description)
        .bind(tx.amount)
        .bind(tx.date.format(DATE_FORMAT).to_string())
        .bind(tx.kind.as_str())
        .bind(&tx.category)
        .bind(tx.is_future)
        .bind(tx.id.to_string())
        .bind(tx.user_id.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to update transaction")?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_transaction(&self, user_id: UserId, id: TransactionId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete transaction")?;
        Ok(result.rows_affected() > 0)
    }

    /// Net balance using SQL aggregation: income minus expense over every
    /// transaction the user has recorded.
    pub async fn compute_net_balance(&self, user_id: UserId) -> Result<Cents> {
        let row = sqlx::query(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN kind = 'income' THEN amount_cents ELSE -amount_cents END), 0) as balance
            FROM transactions
            WHERE user_id = ?
            "#,
        )
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await
        .context("Failed to compute balance")?;

        Ok(row.get("balance"))
    }

    /// Sum of expenses dated within `[from, to)`.
    pub async fn sum_expenses_between(
        &self,
        user_id: UserId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Cents> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(amount_cents), 0) as total
            FROM transactions
            WHERE user_id = ? AND kind = 'expense' AND date >= ? AND date < ?
            "#,
        )
        .bind(user_id.to_string())
        .bind(from.format(DATE_FORMAT).to_string())
        .bind(to.format(DATE_FORMAT).to_string())
        .fetch_one(&self.pool)
        .await
        .context("Failed to sum expenses")?;

        Ok(row.get("total"))
    }

    fn row_to_transaction(row: &sqlx::sqlite::SqliteRow) -> Result<Transaction> {
        let id_str: String = row.get("id");
        let user_id_str: String = row.get("user_id");
        let date_str: String = row.get("date");
        let kind_str: String = row.get("kind");

        Ok(Transaction {
            id: Uuid::parse_str(&id_str).context("Invalid transaction ID")?,
            user_id: Uuid::parse_str(&user_id_str).context("Invalid user ID")?,
            description: row.get("description"),
            amount: row.get("amount_cents"),
            date: NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
                .context("Invalid transaction date")?,
            kind: EntryKind::from_str(&kind_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid transaction type: {}", kind_str))?,
            category: row.get("category"),
            is_future: row.get::<i32, _>("is_future") != 0,
        })
    }

    // ========================
    // Category operations
    // ========================

    pub async fn save_category(&self, category: &Category) -> Result<()> {
        sqlx::query("INSERT INTO categories (id, user_id, name, color) VALUES (?, ?, ?, ?)")
            .bind(category.id.to_string())
            .bind(category.user_id.to_string())
            .bind(&category.name)
            .bind(&category.color)
            .execute(&self.pool)
            .await
            .context("Failed to save category")?;
        Ok(())
    }

    pub async fn get_category(&self, user_id: UserId, id: CategoryId) -> Result<Option<Category>> {
        let row = sqlx::query(
            "SELECT id, user_id, name, color FROM categories WHERE id = ? AND user_id = ?",
        )
        .bind(id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch category")?;

        row.as_ref().map(Self::row_to_category).transpose()
    }

    pub async fn list_categories(&self, user_id: UserId) -> Result<Vec<Category>> {
        let rows = sqlx::query(
            "SELECT id, user_id, name, color FROM categories WHERE user_id = ? ORDER BY name",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list categories")?;

        rows.iter().map(Self::row_to_category).collect()
    }

    pub async fn update_category(&self, category: &Category) -> Result<bool> {
        let result =
            sqlx::query("UPDATE categories SET name = ?, color = ? WHERE id = ? AND user_id = ?")
                .bind(&category.name)
                .bind(&category.color)
                .bind(category.id.to_string())
                .bind(category.user_id.to_string())
                .execute(&self.pool)
                .await
                .context("Failed to update category")?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_category(&self, user_id: UserId, id: CategoryId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete category")?;
        Ok(result.rows_affected() > 0)
    }

    fn row_to_category(row: &sqlx::sqlite::SqliteRow) -> Result<Category> {
        let id_str: String = row.get("id");
        let user_id_str: String = row.get("user_id");

        Ok(Category {
            id: Uuid::parse_str(&id_str).context("Invalid category ID")?,
            user_id: Uuid::parse_str(&user_id_str).context("Invalid user ID")?,
            name: row.get("name"),
            color: row.get("color"),
        })
    }

    // ========================
    // Goal operations
    // ========================

    pub async fn save_goal(&self, goal: &Goal) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO goals (id, user_id, name, current_cents, target_cents, category)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(goal.id.to_string())
        .bind(goal.user_id.to_string())
        .bind(&goal.name)
        .bind(goal.current)
        .bind(goal.target)
        .bind(&goal.category)
        .execute(&self.pool)
        .await
        .context("Failed to save goal")?;
        Ok(())
    }

    pub async fn get_goal(&self, user_id: UserId, id: GoalId) -> Result<Option<Goal>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, name, current_cents, target_cents, category
            FROM goals
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch goal")?;

        row.as_ref().map(Self::row_to_goal).transpose()
    }

    pub async fn list_goals(&self, user_id: UserId) -> Result<Vec<Goal>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, name, current_cents, target_cents, category
            FROM goals
            WHERE user_id = ?
            ORDER BY name
            "#,
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list goals")?;

        rows.iter().map(Self::row_to_goal).collect()
    }

    pub async fn update_goal(&self, goal: &Goal) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE goals
            SET name = ?, current_cents = ?, target_cents = ?, category = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(&goal.name)
        .bind(goal.current)
        .bind(goal.target)
        .bind(&goal.category)
        .bind(goal.id.to_string())
        .bind(goal.user_id.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to update goal")?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_goal(&self, user_id: UserId, id: GoalId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM goals WHERE id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete goal")?;
        Ok(result.rows_affected() > 0)
    }

    fn row_to_goal(row: &sqlx::sqlite::SqliteRow) -> Result<Goal> {
        let id_str: String = row.get("id");
        let user_id_str: String = row.get("user_id");

        Ok(Goal {
            id: Uuid::parse_str(&id_str).context("Invalid goal ID")?,
            user_id: Uuid::parse_str(&user_id_str).context("Invalid user ID")?,
            name: row.get("name"),
            current: row.get("current_cents"),
            target: row.get("target_cents"),
            category: row.get("category"),
        })
    }

    // ========================
    // Budget operations
    // ========================

    pub async fn save_budget(&self, budget: &Budget) -> Result<()> {
        sqlx::query(
            "INSERT INTO budgets (id, user_id, total_cents, month, year) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(budget.id.to_string())
        .bind(budget.user_id.to_string())
        .bind(budget.total)
        .bind(budget.period.month())
        .bind(budget.period.year())
        .execute(&self.pool)
        .await
        .context("Failed to save budget")?;
        Ok(())
    }

    pub async fn get_budget(&self, user_id: UserId, id: BudgetId) -> Result<Option<Budget>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, total_cents, month, year
            FROM budgets
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch budget")?;

        row.as_ref().map(Self::row_to_budget).transpose()
    }

    /// List a user's budgets, most recent month first.
    pub async fn list_budgets(&self, user_id: UserId) -> Result<Vec<Budget>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, total_cents, month, year
            FROM budgets
            WHERE user_id = ?
            ORDER BY year DESC, month DESC
            "#,
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list budgets")?;

        rows.iter().map(Self::row_to_budget).collect()
    }

    pub async fn update_budget(&self, budget: &Budget) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE budgets SET total_cents = ?, month = ?, year = ? WHERE id = ? AND user_id = ?",
        )
        .bind(budget.total)
        .bind(budget.period.month())
        .bind(budget.period.year())
        .bind(budget.id.to_string())
        .bind(budget.user_id.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to update budget")?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_budget(&self, user_id: UserId, id: BudgetId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM budgets WHERE id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete budget")?;
        Ok(result.rows_affected() > 0)
    }

    fn row_to_budget(row: &sqlx::sqlite::SqliteRow) -> Result<Budget> {
        let id_str: String = row.get("id");
        let user_id_str: String = row.get("user_id");
        let month: u32 = row.get("month");
        let year: i32 = row.get("year");

        Ok(Budget {
            id: Uuid::parse_str(&id_str).context("Invalid budget ID")?,
            user_id: Uuid::parse_str(&user_id_str).context("Invalid user ID")?,
            total: row.get("total_cents"),
            period: YearMonth::new(year, month)
                .ok_or_else(|| anyhow::anyhow!("Invalid budget month: {}", month))?,
        })
    }

    // ========================
    // Recurrence operations
    // ========================

    pub async fn save_recurrence(&self, recurrence: &Recurrence) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO recurrences (id, user_id, name, amount_cents, kind, category, start_date, end_date, frequency, active)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(recurrence.id.to_string())
        .bind(recurrence.user_id.to_string())
        .bind(&recurrence.name)
        .bind(recurrence.amount)
        .bind(recurrence.kind.as_str())
        .bind(&recurrence.category)
        .bind(&recurrence.start_date)
        .bind(&recurrence.end_date)
        .bind(recurrence.frequency.as_str())
        .bind(recurrence.active)
        .execute(&self.pool)
        .await
        .context("Failed to save recurrence")?;
        Ok(())
    }

    pub async fn get_recurrence(
        &self,
        user_id: UserId,
        id: RecurrenceId,
    ) -> Result<Option<Recurrence>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, name, amount_cents, kind, category, start_date, end_date, frequency, active
            FROM recurrences
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch recurrence")?;

        row.as_ref().map(Self::row_to_recurrence).transpose()
    }

    /// List a user's recurrences, optionally only the active ones.
    pub async fn list_recurrences(
        &self,
        user_id: UserId,
        active_only: bool,
    ) -> Result<Vec<Recurrence>> {
        let query = if active_only {
            "SELECT id, user_id, name, amount_cents, kind, category, start_date, end_date, frequency, active FROM recurrences WHERE user_id = ? AND active = 1 ORDER BY name"
        } else {
            "SELECT id, user_id, name, amount_cents, kind, category, start_date, end_date, frequency, active FROM recurrences WHERE user_id = ? ORDER BY name"
        };

        let rows = sqlx::query(query)
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await
            .context("Failed to list recurrences")?;

        rows.iter().map(Self::row_to_recurrence).collect()
    }

    pub async fn update_recurrence(&self, recurrence: &Recurrence) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE recurrences
            SET name = ?, amount_cents = ?, kind = ?, category = ?, start_date = ?, end_date = ?, frequency = ?, active = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(&recurrence.name)
        .bind(recurrence.amount)
        .bind(recurrence.kind.as_str())
        .bind(&recurrence.category)
        .bind(&recurrence.start_date)
        .bind(&recurrence.end_date)
        .bind(recurrence.frequency.as_str())
        .bind(recurrence.active)
        .bind(recurrence.id.to_string())
        .bind(recurrence.user_id.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to update recurrence")?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_recurrence(&self, user_id: UserId, id: RecurrenceId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM recurrences WHERE id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete recurrence")?;
        Ok(result.rows_affected() > 0)
    }

    fn row_to_recurrence(row: &sqlx::sqlite::SqliteRow) -> Result<Recurrence> {
        let id_str: String = row.get("id");
        let user_id_str: String = row.get("user_id");
        let kind_str: String = row.get("kind");
        let frequency_str: String = row.get("frequency");

        Ok(Recurrence {
            id: Uuid::parse_str(&id_str).context("Invalid recurrence ID")?,
            user_id: Uuid::parse_str(&user_id_str).context("Invalid user ID")?,
            name: row.get("name"),
            amount: row.get("amount_cents"),
            kind: EntryKind::from_str(&kind_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid recurrence type: {}", kind_str))?,
            category: row.get("category"),
            start_date: row.get("start_date"),
            end_date: row.get("end_date"),
            frequency: Frequency::from_str(&frequency_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid frequency: {}", frequency_str))?,
            active: row.get::<i32, _>("active") != 0,
        })
    }
}
