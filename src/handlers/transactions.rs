use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    entities::transaction::TransactionStatus,
    errors::ServiceError,
    services::transactions::{CreateTransactionRequest, TransactionView},
    AppState,
};

/// Poll request: "check my purchase".
#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyTransactionRequest {
    pub tx_ref: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionStatusResponse {
    pub status: TransactionStatus,
}

// POST /api/v1/transactions
#[utoipa::path(
    post,
    path = "/api/v1/transactions",
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "Transaction created", body = crate::entities::transaction::Model),
        (status = 422, description = "Validation failed", body = crate::errors::ErrorResponse)
    ),
    tag = "Transactions"
)]
pub async fn create_transaction(
    State(state): State<AppState>,
    Json(request): Json<CreateTransactionRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state.services.transactions.create(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

// GET /api/v1/transactions
#[utoipa::path(
    get,
    path = "/api/v1/transactions",
    responses(
        (status = 200, description = "Latest transactions, newest first", body = [TransactionView])
    ),
    tag = "Transactions"
)]
pub async fn list_transactions(
    State(state): State<AppState>,
) -> Result<Json<Vec<TransactionView>>, ServiceError> {
    let transactions = state.services.transactions.list().await?;
    Ok(Json(transactions))
}

// POST /api/v1/transactions/verify
//
// The client-facing poll trigger. Reconciliation may advance the record
// (verify payment, fulfill delivery); transient upstream failures surface
// as the current best-known status so clients can poll in a loop.
#[utoipa::path(
    post,
    path = "/api/v1/transactions/verify",
    request_body = VerifyTransactionRequest,
    responses(
        (status = 200, description = "Current settlement status", body = TransactionStatusResponse),
        (status = 404, description = "Unknown reference", body = crate::errors::ErrorResponse)
    ),
    tag = "Transactions"
)]
pub async fn verify_transaction(
    State(state): State<AppState>,
    Json(request): Json<VerifyTransactionRequest>,
) -> Result<Json<TransactionStatusResponse>, ServiceError> {
    let status = state
        .services
        .reconciliation
        .reconcile(&request.tx_ref)
        .await?;
    Ok(Json(TransactionStatusResponse { status }))
}

pub fn transaction_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_transaction).get(list_transactions))
        .route("/verify", post(verify_transaction))
}
