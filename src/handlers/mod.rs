pub mod data_plans;
pub mod health;
pub mod products;
pub mod transactions;
pub mod webhooks;

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::services::{
    data_plans::DataPlanService,
    delivery::DeliveryProvider,
    payment_gateway::PaymentGateway,
    products::ProductService,
    reconciliation::ReconciliationService,
    transactions::TransactionService,
};

/// Aggregated services used by the HTTP handlers.
///
/// The gateway and delivery collaborators are injected as trait objects so
/// tests can substitute counting mocks for the real clients.
#[derive(Clone)]
pub struct AppServices {
    pub reconciliation: Arc<ReconciliationService>,
    pub transactions: Arc<TransactionService>,
    pub data_plans: Arc<DataPlanService>,
    pub products: Arc<ProductService>,
}

impl AppServices {
    pub fn new(
        db: Arc<DatabaseConnection>,
        gateway: Arc<dyn PaymentGateway>,
        delivery: Arc<dyn DeliveryProvider>,
    ) -> Self {
        Self {
            reconciliation: Arc::new(ReconciliationService::new(db.clone(), gateway, delivery)),
            transactions: Arc::new(TransactionService::new(db.clone())),
            data_plans: Arc::new(DataPlanService::new(db.clone())),
            products: Arc::new(ProductService::new(db)),
        }
    }
}
