use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::{
    entities::product,
    errors::ServiceError,
    services::products::CreateProductRequest,
    AppState,
};

// GET /api/v1/products
#[utoipa::path(
    get,
    path = "/api/v1/products",
    responses(
        (status = 200, description = "In-stock products, newest first", body = [product::Model])
    ),
    tag = "Catalog"
)]
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<product::Model>>, ServiceError> {
    let products = state.services.products.list().await?;
    Ok(Json(products))
}

// POST /api/v1/products
#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = product::Model),
        (status = 422, description = "Validation failed", body = crate::errors::ErrorResponse)
    ),
    tag = "Catalog"
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(request): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state.services.products.create(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub fn product_routes() -> Router<AppState> {
    Router::new().route("/", get(list_products).post(create_product))
}
