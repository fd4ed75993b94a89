use axum::Json;
use utoipa::OpenApi;

use crate::{entities, errors, handlers, services};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "topup-api",
        description = "Prepaid data bundle and device storefront backend"
    ),
    paths(
        handlers::health::health_check,
        handlers::transactions::create_transaction,
        handlers::transactions::list_transactions,
        handlers::transactions::verify_transaction,
        handlers::webhooks::flutterwave_webhook,
        handlers::data_plans::list_data_plans,
        handlers::data_plans::create_data_plan,
        handlers::products::list_products,
        handlers::products::create_product,
    ),
    components(schemas(
        errors::ErrorResponse,
        entities::transaction::Model,
        entities::transaction::TransactionStatus,
        entities::transaction::TransactionKind,
        entities::data_plan::Model,
        entities::product::Model,
        services::transactions::CreateTransactionRequest,
        services::transactions::TransactionView,
        services::data_plans::CreateDataPlanRequest,
        services::products::CreateProductRequest,
        handlers::transactions::VerifyTransactionRequest,
        handlers::transactions::TransactionStatusResponse,
        handlers::health::HealthResponse,
        handlers::health::ComponentStatus,
    )),
    tags(
        (name = "Transactions", description = "Checkout records and settlement polling"),
        (name = "Webhooks", description = "Payment gateway callbacks"),
        (name = "Catalog", description = "Data plans and products"),
        (name = "Health", description = "Service health")
    )
)]
pub struct ApiDoc;

// GET /api/v1/openapi.json
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
