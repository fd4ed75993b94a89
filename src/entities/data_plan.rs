use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A purchasable data bundle, mapped to the fulfillment provider's plan
/// identifier. Read-only at reconciliation time.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "data_plans")]
#[schema(as = DataPlan)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Carrier name; must be one of the provider network mapping keys
    pub network: String,

    /// Bundle size label, e.g. "1GB"
    pub data_size: String,

    /// Validity label, e.g. "30 Days"
    pub validity: String,

    /// Price in integer minor currency units
    pub price: i64,

    /// The fulfillment provider's identifier for this plan
    pub provider_plan_id: i32,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
