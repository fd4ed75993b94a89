use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::{
        data_plan, product,
        transaction::{self, TransactionKind, TransactionStatus},
    },
    errors::ServiceError,
};

/// How many records the listing endpoint returns.
const LIST_LIMIT: u64 = 50;

/// Checkout initialization payload. The reference is minted server-side.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateTransactionRequest {
    pub kind: TransactionKind,
    /// Phone number for data bundles, shipping contact for products
    #[validate(length(min = 1))]
    pub beneficiary: String,
    /// Expected payment amount in integer minor units; must match the
    /// catalog price of the referenced plan or product
    #[validate(range(min = 1))]
    pub amount: i64,
    pub plan_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
}

/// A purchase record with its catalog context.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransactionView {
    pub id: Uuid,
    pub tx_ref: String,
    pub kind: TransactionKind,
    pub beneficiary: String,
    pub amount: i64,
    pub status: TransactionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<data_plan::Model>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<product::Model>,
    pub created_at: chrono::DateTime<Utc>,
}

impl TransactionView {
    fn new(
        tx: transaction::Model,
        plan: Option<data_plan::Model>,
        product: Option<product::Model>,
    ) -> Self {
        Self {
            id: tx.id,
            tx_ref: tx.tx_ref,
            kind: tx.kind,
            beneficiary: tx.beneficiary,
            amount: tx.amount,
            status: tx.status,
            plan,
            product,
            created_at: tx.created_at,
        }
    }
}

#[derive(Clone)]
pub struct TransactionService {
    db: Arc<DatabaseConnection>,
}

impl TransactionService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a purchase record in `pending` state with a freshly minted
    /// reference. The amount must match the referenced catalog entry so a
    /// tampered client cannot buy below price.
    #[instrument(skip(self, request), fields(kind = ?request.kind))]
    pub async fn create(
        &self,
        request: CreateTransactionRequest,
    ) -> Result<transaction::Model, ServiceError> {
        request.validate()?;

        match request.kind {
            TransactionKind::Data => {
                let plan_id = request.plan_id.ok_or_else(|| {
                    ServiceError::ValidationError(
                        "plan_id is required for data purchases".to_string(),
                    )
                })?;
                let plan = data_plan::Entity::find_by_id(plan_id)
                    .one(&*self.db)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::ValidationError(format!("Unknown data plan {}", plan_id))
                    })?;
                if plan.price != request.amount {
                    return Err(ServiceError::ValidationError(format!(
                        "Amount {} does not match plan price {}",
                        request.amount, plan.price
                    )));
                }
            }
            TransactionKind::Product => {
                let product_id = request.product_id.ok_or_else(|| {
                    ServiceError::ValidationError(
                        "product_id is required for product purchases".to_string(),
                    )
                })?;
                let product = product::Entity::find_by_id(product_id)
                    .one(&*self.db)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::ValidationError(format!("Unknown product {}", product_id))
                    })?;
                if product.price != request.amount {
                    return Err(ServiceError::ValidationError(format!(
                        "Amount {} does not match product price {}",
                        request.amount, product.price
                    )));
                }
            }
        }

        let tx_ref = format!("TX-{}", Uuid::new_v4().simple());
        let model = transaction::ActiveModel {
            id: Set(Uuid::new_v4()),
            tx_ref: Set(tx_ref.clone()),
            kind: Set(request.kind),
            beneficiary: Set(request.beneficiary),
            amount: Set(request.amount),
            plan_id: Set(request.plan_id),
            product_id: Set(request.product_id),
            status: Set(TransactionStatus::Pending),
            delivery_receipt: Set(None),
            created_at: Set(Utc::now()),
        };

        let inserted = model.insert(&*self.db).await?;
        info!(%tx_ref, "transaction created");
        Ok(inserted)
    }

    /// Latest records, newest first, with plan/product context attached.
    pub async fn list(&self) -> Result<Vec<TransactionView>, ServiceError> {
        let records = transaction::Entity::find()
            .order_by_desc(transaction::Column::CreatedAt)
            .limit(LIST_LIMIT)
            .all(&*self.db)
            .await?;

        let plan_ids: Vec<Uuid> = records.iter().filter_map(|t| t.plan_id).collect();
        let product_ids: Vec<Uuid> = records.iter().filter_map(|t| t.product_id).collect();

        let plans: HashMap<Uuid, data_plan::Model> = if plan_ids.is_empty() {
            HashMap::new()
        } else {
            data_plan::Entity::find()
                .filter(data_plan::Column::Id.is_in(plan_ids))
                .all(&*self.db)
                .await?
                .into_iter()
                .map(|p| (p.id, p))
                .collect()
        };

        let products: HashMap<Uuid, product::Model> = if product_ids.is_empty() {
            HashMap::new()
        } else {
            product::Entity::find()
                .filter(product::Column::Id.is_in(product_ids))
                .all(&*self.db)
                .await?
                .into_iter()
                .map(|p| (p.id, p))
                .collect()
        };

        Ok(records
            .into_iter()
            .map(|tx| {
                let plan = tx.plan_id.and_then(|id| plans.get(&id).cloned());
                let product = tx.product_id.and_then(|id| products.get(&id).cloned());
                TransactionView::new(tx, plan, product)
            })
            .collect())
    }

    /// Look up a record by its external reference.
    pub async fn find_by_reference(
        &self,
        tx_ref: &str,
    ) -> Result<Option<transaction::Model>, ServiceError> {
        Ok(transaction::Entity::find()
            .filter(transaction::Column::TxRef.eq(tx_ref))
            .one(&*self.db)
            .await?)
    }
}
