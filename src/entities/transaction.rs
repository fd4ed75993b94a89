use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Settlement state of a purchase record.
///
/// Advances monotonically `Pending -> Paid -> Delivered`; the derived
/// ordering reflects that progression and no other transition is legal.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "delivered")]
    Delivered,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Paid => "paid",
            TransactionStatus::Delivered => "delivered",
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What was purchased: a data bundle (fulfilled by the delivery provider)
/// or a physical product (shipped manually).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    #[sea_orm(string_value = "data")]
    Data,
    #[sea_orm(string_value = "product")]
    Product,
}

/// A purchase record: the unit of settlement and delivery reconciliation.
///
/// `tx_ref` is the externally visible reference and the idempotency anchor
/// for every downstream call. `delivery_receipt` is non-null iff
/// `status == Delivered`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "transactions")]
#[schema(as = Transaction)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub tx_ref: String,

    pub kind: TransactionKind,

    /// Phone number for data bundles, shipping contact for products
    pub beneficiary: String,

    /// Expected payment amount in integer minor currency units
    pub amount: i64,

    /// Present iff `kind == Data`
    pub plan_id: Option<Uuid>,

    /// Present iff `kind == Product`
    pub product_id: Option<Uuid>,

    pub status: TransactionStatus,

    /// Raw fulfillment provider response captured on confirmed delivery
    pub delivery_receipt: Option<Json>,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::data_plan::Entity",
        from = "Column::PlanId",
        to = "super::data_plan::Column::Id"
    )]
    DataPlan,
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::data_plan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DataPlan.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_ordering_is_monotonic() {
        assert!(TransactionStatus::Pending < TransactionStatus::Paid);
        assert!(TransactionStatus::Paid < TransactionStatus::Delivered);
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&TransactionStatus::Delivered).unwrap();
        assert_eq!(json, "\"delivered\"");
    }
}
