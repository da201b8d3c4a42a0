use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};

use crate::api::{ServerConfig, run_server};
use crate::application::FinanceService;
use crate::domain::{Cents, DEFAULT_HORIZON_MONTHS, ProjectionPoint, format_cents};
use crate::telemetry::init_tracing;

/// CyberFinance - personal finance API and balance forecasting
#[derive(Parser)]
#[command(name = "cyberfinance")]
#[command(about = "Personal finance tracking API with recurring-transaction forecasts")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(
        short,
        long,
        env = "CYBERFINANCE_DB",
        default_value = "cyberfinance.db",
        global = true
    )]
    pub database: String,

    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize (or migrate) the database
    Init,

    /// Run the HTTP API
    Serve {
        /// Interface to bind
        #[arg(long, env = "HOST", default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(short, long, env = "PORT", default_value_t = 5000)]
        port: u16,

        /// Browser origin allowed by CORS (the dashboard)
        #[arg(long, env = "CORS_ORIGIN", default_value = "http://localhost:5173")]
        cors_origin: String,
    },

    /// User management commands
    #[command(subcommand)]
    User(UserCommands),

    /// Forecast month-end balances from recurring transactions
    Forecast {
        /// Email of the user to forecast for
        #[arg(short, long)]
        user: String,

        /// Number of months to forecast
        #[arg(short, long, default_value_t = DEFAULT_HORIZON_MONTHS)]
        months: i64,

        /// Forecast as of this date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Register a new user
    Create {
        /// Display name
        name: String,

        /// Email address (must be unique)
        email: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        init_tracing(self.verbose);

        match self.command {
            Commands::Init => {
                FinanceService::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Serve {
                host,
                port,
                cors_origin,
            } => {
                let service = FinanceService::init(&self.database).await?;
                let config = ServerConfig {
                    host,
                    port,
                    cors_origin,
                };
                run_server(service, config).await?;
            }

            Commands::User(user_cmd) => {
                let service = FinanceService::connect(&self.database).await?;
                run_user_command(&service, user_cmd).await?;
            }

            Commands::Forecast { user, months, date } => {
                let service = FinanceService::connect(&self.database).await?;
                let today = match date {
                    Some(date_str) => parse_date(&date_str)?,
                    None => Utc::now().date_naive(),
                };
                run_forecast_command(&service, &user, months, today).await?;
            }
        }

        Ok(())
    }
}

async fn run_user_command(service: &FinanceService, cmd: UserCommands) -> Result<()> {
    match cmd {
        UserCommands::Create { name, email } => {
            let user = service.register_user(name, email).await?;
            println!("Created user: {} <{}>", user.name, user.email);
            println!("  ID: {}", user.id);
        }
    }
    Ok(())
}

async fn run_forecast_command(
    service: &FinanceService,
    email: &str,
    months: i64,
    today: NaiveDate,
) -> Result<()> {
    let user = service.get_user_by_email(email).await?;
    let base = service.net_balance(user.id).await?;
    let points = service.project_balance(user.id, months, today).await?;

    println!("Forecast for {} as of {}", user.name, today.format("%Y-%m-%d"));
    println!("Current balance: {}", format_cents(base));
    println!();
    println!("{:<10} {:>15} {:>15}", "MONTH", "BALANCE", "CHANGE");
    println!("{}", "-".repeat(42));

    let mut previous = base;
    for point in &points {
        println!("{}", forecast_row(point, previous));
        previous = point.balance;
    }

    Ok(())
}

/// One table row: label, balance, and change from the previous month.
fn forecast_row(point: &ProjectionPoint, previous: Cents) -> String {
    format!(
        "{:<10} {:>15} {:>15}",
        point.month_label,
        format_cents(point.balance),
        format_cents(point.balance.saturating_sub(previous))
    )
}

fn parse_date(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").context("Date must be in YYYY-MM-DD format")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_forecast_defaults() {
        let cli = Cli::try_parse_from(["cyberfinance", "forecast", "--user", "a@b.c"]).unwrap();
        match cli.command {
            Commands::Forecast { user, months, date } => {
                assert_eq!(user, "a@b.c");
                assert_eq!(months, DEFAULT_HORIZON_MONTHS);
                assert!(date.is_none());
            }
            _ => panic!("expected forecast command"),
        }
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2025-07-01").unwrap(),
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
        );
        assert!(parse_date("07/01/2025").is_err());
    }

    #[test]
    fn test_forecast_row_change_at_balance_limits() {
        let point = |balance| ProjectionPoint {
            month_label: "7/2025".to_string(),
            balance,
        };

        let row = forecast_row(&point(150000), 100000);
        assert!(row.starts_with("7/2025"));
        assert!(row.ends_with("500.00"));

        let row = forecast_row(&point(i64::MAX), -1);
        assert!(row.ends_with(&format_cents(i64::MAX)));

        let row = forecast_row(&point(i64::MIN), i64::MAX);
        assert!(row.ends_with(&format_cents(i64::MIN)));
    }
}
