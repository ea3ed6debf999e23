use crate::{
    api::models::*,
    auth::jwt::Claims,
    core::{
        analytics::AnalyticsSummary,
        errors::RoomsplitError,
        history::{HistoryFilter, SettlementRecord},
        models::{audit::AppLog, balance::Balance, notification::Notification, profile::Profile, settlement::Settlement},
        services::{
            CompleteSettlementReceipt, CompleteSettlementRequest, ExpenseDetails, ExpenseSummary, NewExpense,
            RoomsplitService,
        },
    },
    infrastructure::{
        cache::in_memory::InMemoryCache, logging::in_memory::InMemoryLogging,
        notifications::in_memory::InMemoryNotifier, storage::in_memory::InMemoryStorage,
    },
};
use axum::{
    Extension, Json, Router,
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::IntoResponse,
    routing::{get, post, put},
};
use http::header;

use std::sync::Arc;

pub type AppService = RoomsplitService<InMemoryLogging, InMemoryStorage, InMemoryCache, InMemoryNotifier>;

// Middleware to validate JWT
async fn auth_middleware(
    State(service): State<Arc<AppService>>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| RoomsplitError::Unauthenticated("Missing Authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| RoomsplitError::Unauthenticated("Invalid Authorization header".to_string()))?;

    let claims = service.validate_token(token)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

// Define API routes
pub fn api_routes(service: Arc<AppService>) -> Router {
    let protected_routes = Router::new()
        .route("/profiles", get(list_profiles))
        .route("/profiles/me", put(save_profile).get(get_own_profile))
        .route("/profiles/{user_id}", get(get_profile))
        .route("/expenses", post(create_expense).get(list_expenses))
        .route("/expenses/{expense_id}", get(get_expense))
        .route(
            "/expenses/{expense_id}/participants/{participant_id}/settle",
            post(settle_participant),
        )
        .route("/balances", get(get_balances))
        .route("/settlements/complete", post(complete_settlement))
        .route("/settlements/complete/{counterparty_id}", post(settle_balance_with))
        .route("/settlements/history", get(settlement_history))
        .route("/analytics", get(get_analytics))
        .route("/notifications", get(list_notifications))
        .route("/notifications/{notification_id}/read", post(mark_notification_read))
        .route("/reminders/{counterparty_id}", post(send_payment_reminder))
        .route("/logs", get(get_app_logs))
        .route_layer(middleware::from_fn_with_state(service.clone(), auth_middleware));

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .merge(protected_routes)
        .with_state(service)
}

#[utoipa::path(
    put,
    path = "/api/profiles/me",
    request_body = SaveProfileRequest,
    responses(
        (status = 200, description = "Profile saved", body = Profile),
        (status = 400, description = "Invalid name or UPI ID", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn save_profile(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SaveProfileRequest>,
) -> Result<Json<Profile>, ApiError> {
    let profile = service.save_profile(&claims.sub, req.name, req.upi_id).await?;
    Ok(Json(profile))
}

#[utoipa::path(
    get,
    path = "/api/profiles/me",
    responses(
        (status = 200, description = "Caller's profile", body = Profile),
        (status = 404, description = "Profile not created yet", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_own_profile(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Profile>, ApiError> {
    Ok(Json(service.get_profile(&claims.sub).await?))
}

#[utoipa::path(
    get,
    path = "/api/profiles/{user_id}",
    params(
        ("user_id" = String, Path, description = "ID of the profile to retrieve")
    ),
    responses(
        (status = 200, description = "Profile retrieved", body = Profile),
        (status = 404, description = "Profile not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_profile(
    State(service): State<Arc<AppService>>,
    Path(user_id): Path<String>,
) -> Result<Json<Profile>, ApiError> {
    Ok(Json(service.get_profile(&user_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/profiles",
    responses(
        (status = 200, description = "Every other roommate", body = Vec<Profile>)
    ),
    security(("Bearer" = []))
)]
pub async fn list_profiles(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Profile>>, ApiError> {
    Ok(Json(service.list_profiles(&claims.sub).await?))
}

#[utoipa::path(
    post,
    path = "/api/expenses",
    request_body = NewExpense,
    responses(
        (status = 201, description = "Expense created", body = ExpenseDetails),
        (status = 400, description = "Invalid title, amount or participants", body = ErrorResponse),
        (status = 404, description = "Unknown participant", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn create_expense(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<NewExpense>,
) -> Result<(StatusCode, Json<ExpenseDetails>), ApiError> {
    let details = service.create_expense(&claims.sub, req).await?;
    Ok((StatusCode::CREATED, Json(details)))
}

#[utoipa::path(
    get,
    path = "/api/expenses",
    responses(
        (status = 200, description = "Expenses the caller bought or shares, newest first", body = Vec<ExpenseSummary>)
    ),
    security(("Bearer" = []))
)]
pub async fn list_expenses(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<ExpenseSummary>>, ApiError> {
    Ok(Json(service.list_expenses(&claims.sub).await?))
}

#[utoipa::path(
    get,
    path = "/api/expenses/{expense_id}",
    params(
        ("expense_id" = String, Path, description = "ID of the expense")
    ),
    responses(
        (status = 200, description = "Expense with parties and settlement state", body = ExpenseDetails),
        (status = 403, description = "Caller has no stake in the expense", body = ErrorResponse),
        (status = 404, description = "Expense not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_expense(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path(expense_id): Path<String>,
) -> Result<Json<ExpenseDetails>, ApiError> {
    Ok(Json(service.expense_details(&claims.sub, &expense_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/expenses/{expense_id}/participants/{participant_id}/settle",
    params(
        ("expense_id" = String, Path, description = "ID of the expense"),
        ("participant_id" = String, Path, description = "Participant whose share is paid")
    ),
    responses(
        (status = 200, description = "Share marked as paid", body = Settlement),
        (status = 400, description = "Share already settled or belongs to the buyer", body = ErrorResponse),
        (status = 403, description = "Caller may not settle this share", body = ErrorResponse),
        (status = 404, description = "Expense or participant not found", body = ErrorResponse),
        (status = 409, description = "Ledger changed while settling", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn settle_participant(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path((expense_id, participant_id)): Path<(String, String)>,
) -> Result<Json<Settlement>, ApiError> {
    let settlement = service
        .settle_participant(&claims.sub, &expense_id, &participant_id)
        .await?;
    Ok(Json(settlement))
}

#[utoipa::path(
    get,
    path = "/api/balances",
    responses(
        (status = 200, description = "Net balance per counterparty, largest first", body = Vec<Balance>)
    ),
    security(("Bearer" = []))
)]
pub async fn get_balances(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Balance>>, ApiError> {
    Ok(Json(service.get_balances(&claims.sub).await?))
}

#[utoipa::path(
    post,
    path = "/api/settlements/complete",
    request_body = CompleteSettlementRequest,
    responses(
        (status = 200, description = "Balance settled", body = CompleteSettlementReceipt),
        (status = 400, description = "Legs or amount do not match the outstanding balance", body = ErrorResponse),
        (status = 409, description = "Ledger changed while settling", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn complete_settlement(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CompleteSettlementRequest>,
) -> Result<Json<CompleteSettlementReceipt>, ApiError> {
    Ok(Json(service.complete_settlement(&claims.sub, req).await?))
}

#[utoipa::path(
    post,
    path = "/api/settlements/complete/{counterparty_id}",
    params(
        ("counterparty_id" = String, Path, description = "Roommate to settle up with")
    ),
    responses(
        (status = 200, description = "Current balance settled", body = CompleteSettlementReceipt),
        (status = 400, description = "Nothing to settle or no payment address", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn settle_balance_with(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path(counterparty_id): Path<String>,
) -> Result<Json<CompleteSettlementReceipt>, ApiError> {
    Ok(Json(service.settle_balance_with(&claims.sub, &counterparty_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/settlements/history",
    params(HistoryFilter),
    responses(
        (status = 200, description = "Settled rows involving the caller, newest first", body = Vec<SettlementRecord>)
    ),
    security(("Bearer" = []))
)]
pub async fn settlement_history(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Query(filter): Query<HistoryFilter>,
) -> Result<Json<Vec<SettlementRecord>>, ApiError> {
    Ok(Json(service.settlement_history(&claims.sub, &filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/analytics",
    responses(
        (status = 200, description = "Spending summary and insights", body = AnalyticsSummary)
    ),
    security(("Bearer" = []))
)]
pub async fn get_analytics(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<AnalyticsSummary>, ApiError> {
    Ok(Json(service.analytics(&claims.sub).await?))
}

#[utoipa::path(
    get,
    path = "/api/notifications",
    responses(
        (status = 200, description = "Caller's notifications, newest first", body = Vec<Notification>)
    ),
    security(("Bearer" = []))
)]
pub async fn list_notifications(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    Ok(Json(service.list_notifications(&claims.sub).await?))
}

#[utoipa::path(
    post,
    path = "/api/notifications/{notification_id}/read",
    params(
        ("notification_id" = String, Path, description = "Notification to mark as read")
    ),
    responses(
        (status = 204, description = "Marked as read"),
        (status = 403, description = "Not the recipient", body = ErrorResponse),
        (status = 404, description = "Notification not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn mark_notification_read(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path(notification_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    service.mark_notification_read(&claims.sub, &notification_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/reminders/{counterparty_id}",
    params(
        ("counterparty_id" = String, Path, description = "Roommate who owes the caller")
    ),
    responses(
        (status = 200, description = "Reminder sent", body = Notification),
        (status = 400, description = "Counterparty owes nothing", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn send_payment_reminder(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path(counterparty_id): Path<String>,
) -> Result<Json<Notification>, ApiError> {
    Ok(Json(service.send_payment_reminder(&claims.sub, &counterparty_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/logs",
    responses(
        (status = 200, description = "Action log entries the caller made or is a party to", body = Vec<AppLog>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_app_logs(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<AppLog>>, ApiError> {
    let logs = service.get_app_logs(&claims.sub).await?;
    Ok(Json(logs))
}
