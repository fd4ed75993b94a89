use dashmap::DashMap;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, instrument, warn};

use crate::{
    entities::{
        data_plan,
        transaction::{self, TransactionKind, TransactionStatus},
    },
    errors::ServiceError,
    services::{
        delivery::{provider_network_code, DeliveryOutcome, DeliveryProvider, DeliveryRequest},
        payment_gateway::{PaymentGateway, VerifyOutcome},
    },
};

/// Drives a purchase record from payment confirmation to fulfillment.
///
/// `reconcile` is the only code path that mutates settlement state. It is
/// invoked concurrently from the gateway webhook and from client polling
/// with no ordering guarantee, and must guarantee at-most-once fulfillment
/// per reference under arbitrary interleavings.
///
/// Two mechanisms provide that guarantee:
/// - a per-reference async mutex serializes in-process callers, so at most
///   one fulfillment call is in flight per reference;
/// - conditional updates (`status = 'pending'` guard for the paid
///   transition, `status = 'paid' AND delivery_receipt IS NULL` guard for
///   the delivered transition) are the commit-time arbiter, covering
///   callers the lock cannot see.
pub struct ReconciliationService {
    db: Arc<DatabaseConnection>,
    gateway: Arc<dyn PaymentGateway>,
    delivery: Arc<dyn DeliveryProvider>,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ReconciliationService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        gateway: Arc<dyn PaymentGateway>,
        delivery: Arc<dyn DeliveryProvider>,
    ) -> Self {
        Self {
            db,
            gateway,
            delivery,
            locks: DashMap::new(),
        }
    }

    /// Advance the record identified by `tx_ref` as far as the external
    /// collaborators currently allow, and return the resulting status.
    ///
    /// Safe to call arbitrarily many times, concurrently. Transient
    /// upstream failures leave the status unchanged; a later call retries.
    #[instrument(skip(self), fields(tx_ref = %tx_ref))]
    pub async fn reconcile(&self, tx_ref: &str) -> Result<TransactionStatus, ServiceError> {
        let record = self
            .load(tx_ref)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Transaction {} not found", tx_ref)))?;

        // Terminal state needs no lock and no external calls.
        if record.status == TransactionStatus::Delivered {
            return Ok(TransactionStatus::Delivered);
        }

        let lock = self.lock_for(tx_ref);
        let _guard = lock.lock().await;

        // Re-read under the lock: a racing caller may have advanced the
        // record while we waited.
        let mut record = self
            .load(tx_ref)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Transaction {} not found", tx_ref)))?;

        if record.status == TransactionStatus::Delivered {
            return Ok(TransactionStatus::Delivered);
        }

        if record.status == TransactionStatus::Pending {
            match self.gateway.verify(tx_ref, record.amount).await {
                VerifyOutcome::Confirmed { amount_observed } => {
                    self.commit_paid(tx_ref).await?;
                    record.status = TransactionStatus::Paid;
                    info!(amount_observed, "payment confirmed");
                }
                VerifyOutcome::NotConfirmed => {
                    info!("payment not confirmed yet");
                    return Ok(TransactionStatus::Pending);
                }
                VerifyOutcome::Unreachable => {
                    warn!("payment gateway unreachable; leaving status for retry");
                    return Ok(TransactionStatus::Pending);
                }
            }
        }

        if record.status == TransactionStatus::Paid
            && record.kind == TransactionKind::Data
            && record.delivery_receipt.is_none()
        {
            match self.attempt_fulfillment(&record).await? {
                Some(status) => record.status = status,
                None => return Ok(TransactionStatus::Paid),
            }
        }

        Ok(record.status)
    }

    /// Fulfillment attempt for a paid data bundle with no receipt yet.
    /// Returns `Ok(None)` when the attempt failed and the record stays
    /// `Paid` for a later retry.
    async fn attempt_fulfillment(
        &self,
        record: &transaction::Model,
    ) -> Result<Option<TransactionStatus>, ServiceError> {
        let Some(plan_id) = record.plan_id else {
            error!("data transaction has no plan reference; cannot fulfill");
            return Ok(None);
        };

        let Some(plan) = data_plan::Entity::find_by_id(plan_id).one(&*self.db).await? else {
            error!(%plan_id, "plan not found; cannot fulfill");
            return Ok(None);
        };

        let Some(network_code) = provider_network_code(&plan.network) else {
            error!(network = %plan.network, "unknown carrier network; cannot fulfill");
            return Ok(None);
        };

        let request = DeliveryRequest {
            tx_ref: record.tx_ref.clone(),
            network_code,
            mobile_number: record.beneficiary.clone(),
            provider_plan_id: plan.provider_plan_id,
        };

        match self.delivery.deliver(&request).await {
            DeliveryOutcome::Delivered { receipt } => {
                if self.commit_delivered(&record.tx_ref, receipt).await? {
                    info!("bundle delivered");
                } else {
                    // Lost the conditional commit to a caller outside this
                    // process; the committed receipt already exists.
                    info!("delivery already committed by a concurrent caller");
                }
                Ok(Some(TransactionStatus::Delivered))
            }
            DeliveryOutcome::Failed { response } => {
                warn!(response = ?response, "fulfillment failed; record stays paid for retry");
                Ok(None)
            }
        }
    }

    async fn load(&self, tx_ref: &str) -> Result<Option<transaction::Model>, ServiceError> {
        Ok(transaction::Entity::find()
            .filter(transaction::Column::TxRef.eq(tx_ref))
            .one(&*self.db)
            .await?)
    }

    fn lock_for(&self, tx_ref: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(tx_ref.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// `pending -> paid`, guarded so a concurrent commit cannot regress the
    /// record. Zero rows affected means another caller advanced it first,
    /// which is fine either way.
    async fn commit_paid(&self, tx_ref: &str) -> Result<(), ServiceError> {
        transaction::Entity::update_many()
            .set(transaction::ActiveModel {
                status: Set(TransactionStatus::Paid),
                ..Default::default()
            })
            .filter(transaction::Column::TxRef.eq(tx_ref))
            .filter(transaction::Column::Status.eq(TransactionStatus::Pending))
            .exec(&*self.db)
            .await?;
        Ok(())
    }

    /// `paid -> delivered` with the receipt, committed only if no receipt
    /// exists yet. Returns whether this caller won the commit.
    async fn commit_delivered(&self, tx_ref: &str, receipt: Value) -> Result<bool, ServiceError> {
        let result = transaction::Entity::update_many()
            .set(transaction::ActiveModel {
                status: Set(TransactionStatus::Delivered),
                delivery_receipt: Set(Some(receipt)),
                ..Default::default()
            })
            .filter(transaction::Column::TxRef.eq(tx_ref))
            .filter(transaction::Column::Status.eq(TransactionStatus::Paid))
            .filter(transaction::Column::DeliveryReceipt.is_null())
            .exec(&*self.db)
            .await?;

        Ok(result.rows_affected == 1)
    }
}
