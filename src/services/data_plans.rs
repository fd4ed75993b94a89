use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::data_plan,
    errors::ServiceError,
    services::delivery::provider_network_code,
};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateDataPlanRequest {
    /// Carrier name; must be a known provider network
    #[validate(length(min = 1))]
    pub network: String,
    /// Bundle size label, e.g. "1GB"
    #[validate(length(min = 1))]
    pub data_size: String,
    /// Validity label; defaults to "30 Days"
    pub validity: Option<String>,
    /// Price in integer minor units
    #[validate(range(min = 1))]
    pub price: i64,
    /// The fulfillment provider's identifier for this plan
    pub provider_plan_id: i32,
}

#[derive(Clone)]
pub struct DataPlanService {
    db: Arc<DatabaseConnection>,
}

impl DataPlanService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// All plans, cheapest first.
    pub async fn list(&self) -> Result<Vec<data_plan::Model>, ServiceError> {
        Ok(data_plan::Entity::find()
            .order_by_asc(data_plan::Column::Price)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self, request), fields(network = %request.network))]
    pub async fn create(
        &self,
        request: CreateDataPlanRequest,
    ) -> Result<data_plan::Model, ServiceError> {
        request.validate()?;

        if provider_network_code(&request.network).is_none() {
            return Err(ServiceError::ValidationError(format!(
                "Unknown carrier network: {}",
                request.network
            )));
        }

        let model = data_plan::ActiveModel {
            id: Set(Uuid::new_v4()),
            network: Set(request.network.to_ascii_uppercase()),
            data_size: Set(request.data_size),
            validity: Set(request.validity.unwrap_or_else(|| "30 Days".to_string())),
            price: Set(request.price),
            provider_plan_id: Set(request.provider_plan_id),
            created_at: Set(Utc::now()),
        };

        let inserted = model.insert(&*self.db).await?;
        info!(plan_id = %inserted.id, "data plan created");
        Ok(inserted)
    }
}
