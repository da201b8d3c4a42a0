use axum::{
    Router,
    routing::{get, post, put},
};

use super::{AppState, handlers};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/users", post(handlers::register_user))
        .route(
            "/api/users/me",
            get(handlers::current_user).put(handlers::update_profile),
        )
        .route(
            "/api/transactions",
            get(handlers::list_transactions).post(handlers::create_transaction),
        )
        .route(
            "/api/transactions/:id",
            put(handlers::update_transaction).delete(handlers::delete_transaction),
        )
        .route(
            "/api/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/api/categories/:id",
            put(handlers::update_category).delete(handlers::delete_category),
        )
        .route(
            "/api/goals",
            get(handlers::list_goals).post(handlers::create_goal),
        )
        .route(
            "/api/goals/:id",
            put(handlers::update_goal).delete(handlers::delete_goal),
        )
        .route(
            "/api/budgets",
            get(handlers::list_budgets).post(handlers::create_budget),
        )
        .route(
            "/api/budgets/:id",
            put(handlers::update_budget).delete(handlers::delete_budget),
        )
        .route("/api/budgets/:id/status", get(handlers::budget_status))
        .route(
            "/api/recurrences",
            get(handlers::list_recurrences).post(handlers::create_recurrence),
        )
        .route(
            "/api/recurrences/projected-balance",
            get(handlers::projected_balance),
        )
        .route(
            "/api/recurrences/:id",
            put(handlers::update_recurrence).delete(handlers::delete_recurrence),
        )
}
