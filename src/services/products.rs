use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{entities::product, errors::ServiceError};

const DEFAULT_IMAGE_URL: &str = "https://placehold.co/600x600/png?text=Product";

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 1))]
    pub name: String,
    pub description: Option<String>,
    /// Price in integer minor units
    #[validate(range(min = 1))]
    pub price: i64,
    pub image_url: Option<String>,
}

#[derive(Clone)]
pub struct ProductService {
    db: Arc<DatabaseConnection>,
}

impl ProductService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// In-stock products, newest first.
    pub async fn list(&self) -> Result<Vec<product::Model>, ServiceError> {
        Ok(product::Entity::find()
            .filter(product::Column::InStock.eq(true))
            .order_by_desc(product::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create(
        &self,
        request: CreateProductRequest,
    ) -> Result<product::Model, ServiceError> {
        request.validate()?;

        let model = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            description: Set(request.description.unwrap_or_default()),
            price: Set(request.price),
            image_url: Set(request
                .image_url
                .unwrap_or_else(|| DEFAULT_IMAGE_URL.to_string())),
            in_stock: Set(true),
            created_at: Set(Utc::now()),
        };

        let inserted = model.insert(&*self.db).await?;
        info!(product_id = %inserted.id, "product created");
        Ok(inserted)
    }
}
