use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::{
    entities::data_plan,
    errors::ServiceError,
    services::data_plans::CreateDataPlanRequest,
    AppState,
};

// GET /api/v1/data-plans
#[utoipa::path(
    get,
    path = "/api/v1/data-plans",
    responses(
        (status = 200, description = "All plans, cheapest first", body = [data_plan::Model])
    ),
    tag = "Catalog"
)]
pub async fn list_data_plans(
    State(state): State<AppState>,
) -> Result<Json<Vec<data_plan::Model>>, ServiceError> {
    let plans = state.services.data_plans.list().await?;
    Ok(Json(plans))
}

// POST /api/v1/data-plans
#[utoipa::path(
    post,
    path = "/api/v1/data-plans",
    request_body = CreateDataPlanRequest,
    responses(
        (status = 201, description = "Plan created", body = data_plan::Model),
        (status = 422, description = "Validation failed", body = crate::errors::ErrorResponse)
    ),
    tag = "Catalog"
)]
pub async fn create_data_plan(
    State(state): State<AppState>,
    Json(request): Json<CreateDataPlanRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state.services.data_plans.create(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub fn data_plan_routes() -> Router<AppState> {
    Router::new().route("/", get(list_data_plans).post(create_data_plan))
}
