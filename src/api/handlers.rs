use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::{
    BudgetInput, CategoryInput, GoalInput, ProfileInput, RecurrenceInput, TransactionInput,
};
use crate::domain::{DEFAULT_HORIZON_MONTHS, Goal};

use super::extract::{JsonBody, PathParam, QueryParams};
use super::{ApiError, AppState, CurrentUser, MessageBody};

type ApiResult<T> = Result<T, ApiError>;

/// GET / - banner
pub async fn index() -> &'static str {
    "CyberFinance API is running"
}

/// GET /api/health
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ========================
// Users
// ========================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
}

/// POST /api/users
pub async fn register_user(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .service
        .register_user(payload.name, payload.email)
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/users/me
pub async fn current_user(user: CurrentUser) -> impl IntoResponse {
    Json(user.0)
}

/// PUT /api/users/me
pub async fn update_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(payload): JsonBody<ProfileInput>,
) -> ApiResult<impl IntoResponse> {
    let updated = state.service.update_profile(user.id(), payload).await?;
    Ok(Json(updated))
}

// ========================
// Transactions
// ========================

pub async fn list_transactions(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.service.list_transactions(user.id()).await?))
}

pub async fn create_transaction(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(payload): JsonBody<TransactionInput>,
) -> ApiResult<impl IntoResponse> {
    let tx = state.service.create_transaction(user.id(), payload).await?;
    Ok((StatusCode::CREATED, Json(tx)))
}

pub async fn update_transaction(
    State(state): State<AppState>,
    user: CurrentUser,
    PathParam(id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<TransactionInput>,
) -> ApiResult<impl IntoResponse> {
    let tx = state
        .service
        .update_transaction(user.id(), id, payload)
        .await?;
    Ok(Json(tx))
}

pub async fn delete_transaction(
    State(state): State<AppState>,
    user: CurrentUser,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<impl IntoResponse> {
    state.service.delete_transaction(user.id(), id).await?;
    Ok(Json(MessageBody::new("Transaction removed")))
}

// ========================
// Categories
// ========================

pub async fn list_categories(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.service.list_categories(user.id()).await?))
}

pub async fn create_category(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(payload): JsonBody<CategoryInput>,
) -> ApiResult<impl IntoResponse> {
    let category = state.service.create_category(user.id(), payload).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(state): State<AppState>,
    user: CurrentUser,
    PathParam(id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<CategoryInput>,
) -> ApiResult<impl IntoResponse> {
    let category = state
        .service
        .update_category(user.id(), id, payload)
        .await?;
    Ok(Json(category))
}

pub async fn delete_category(
    State(state): State<AppState>,
    user: CurrentUser,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<impl IntoResponse> {
    state.service.delete_category(user.id(), id).await?;
    Ok(Json(MessageBody::new("Category removed")))
}

// ========================
// Goals
// ========================

/// A goal plus its derived progress percentage.
#[derive(Debug, Serialize)]
pub struct GoalResponse {
    #[serde(flatten)]
    pub goal: Goal,
    pub progress: f64,
}

impl From<Goal> for GoalResponse {
    fn from(goal: Goal) -> Self {
        let progress = goal.progress();
        Self { goal, progress }
    }
}

pub async fn list_goals(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<impl IntoResponse> {
    let goals: Vec<GoalResponse> = state
        .service
        .list_goals(user.id())
        .await?
        .into_iter()
        .map(GoalResponse::from)
        .collect();
    Ok(Json(goals))
}

pub async fn create_goal(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(payload): JsonBody<GoalInput>,
) -> ApiResult<impl IntoResponse> {
    let goal = state.service.create_goal(user.id(), payload).await?;
    Ok((StatusCode::CREATED, Json(GoalResponse::from(goal))))
}

pub async fn update_goal(
    State(state): State<AppState>,
    user: CurrentUser,
    PathParam(id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<GoalInput>,
) -> ApiResult<impl IntoResponse> {
    let goal = state.service.update_goal(user.id(), id, payload).await?;
    Ok(Json(GoalResponse::from(goal)))
}

pub async fn delete_goal(
    State(state): State<AppState>,
    user: CurrentUser,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<impl IntoResponse> {
    state.service.delete_goal(user.id(), id).await?;
    Ok(Json(MessageBody::new("Goal removed")))
}

// ========================
// Budgets
// ========================

pub async fn list_budgets(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.service.list_budgets(user.id()).await?))
}

pub async fn create_budget(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(payload): JsonBody<BudgetInput>,
) -> ApiResult<impl IntoResponse> {
    let budget = state.service.create_budget(user.id(), payload).await?;
    Ok((StatusCode::CREATED, Json(budget)))
}

pub async fn update_budget(
    State(state): State<AppState>,
    user: CurrentUser,
    PathParam(id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<BudgetInput>,
) -> ApiResult<impl IntoResponse> {
    let budget = state.service.update_budget(user.id(), id, payload).await?;
    Ok(Json(budget))
}

pub async fn delete_budget(
    State(state): State<AppState>,
    user: CurrentUser,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<impl IntoResponse> {
    state.service.delete_budget(user.id(), id).await?;
    Ok(Json(MessageBody::new("Budget removed")))
}

/// GET /api/budgets/:id/status
pub async fn budget_status(
    State(state): State<AppState>,
    user: CurrentUser,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.service.budget_status(user.id(), id).await?))
}

// ========================
// Recurrences
// ========================

pub async fn list_recurrences(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.service.list_recurrences(user.id()).await?))
}

pub async fn create_recurrence(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(payload): JsonBody<RecurrenceInput>,
) -> ApiResult<impl IntoResponse> {
    let recurrence = state.service.create_recurrence(user.id(), payload).await?;
    Ok((StatusCode::CREATED, Json(recurrence)))
}

pub async fn update_recurrence(
    State(state): State<AppState>,
    user: CurrentUser,
    PathParam(id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<RecurrenceInput>,
) -> ApiResult<impl IntoResponse> {
    let recurrence = state
        .service
        .update_recurrence(user.id(), id, payload)
        .await?;
    Ok(Json(recurrence))
}

pub async fn delete_recurrence(
    State(state): State<AppState>,
    user: CurrentUser,
    PathParam(id): PathParam<Uuid>,
) -> ApiResult<impl IntoResponse> {
    state.service.delete_recurrence(user.id(), id).await?;
    Ok(Json(MessageBody::new("Recurrence removed")))
}

#[derive(Debug, Deserialize)]
pub struct ProjectionQuery {
    pub months: Option<i64>,
}

/// GET /api/recurrences/projected-balance?months=N
pub async fn projected_balance(
    State(state): State<AppState>,
    user: CurrentUser,
    QueryParams(query): QueryParams<ProjectionQuery>,
) -> ApiResult<impl IntoResponse> {
    let months = query.months.unwrap_or(DEFAULT_HORIZON_MONTHS);
    let today = state.today();
    let points = state
        .service
        .project_balance(user.id(), months, today)
        .await?;
    Ok(Json(points))
}
