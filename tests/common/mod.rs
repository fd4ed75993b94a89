#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{self, Body},
    http::{header, Method, Request, Response, StatusCode},
    Router,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use topup_api::{
    app,
    config::AppConfig,
    db,
    entities::{
        data_plan, product,
        transaction::{self, TransactionKind, TransactionStatus},
    },
    handlers::AppServices,
    services::{
        delivery::{DeliveryOutcome, DeliveryProvider, DeliveryRequest},
        payment_gateway::{PaymentGateway, VerifyOutcome},
    },
    AppState,
};

pub const WEBHOOK_SECRET: &str = "whsec_test_secret";

/// Programmable payment gateway double with a call counter.
pub struct MockGateway {
    outcome: Mutex<VerifyOutcome>,
    pub calls: AtomicUsize,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self {
            outcome: Mutex::new(VerifyOutcome::NotConfirmed),
            calls: AtomicUsize::new(0),
        }
    }
}

impl MockGateway {
    pub fn set(&self, outcome: VerifyOutcome) {
        *self.outcome.lock().unwrap() = outcome;
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn verify(&self, _tx_ref: &str, _expected_amount: i64) -> VerifyOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.lock().unwrap().clone()
    }
}

/// Programmable delivery provider double. The optional artificial delay
/// widens race windows in concurrency tests.
pub struct MockDelivery {
    outcome: Mutex<DeliveryOutcome>,
    delay: Mutex<Option<Duration>>,
    pub calls: AtomicUsize,
}

impl Default for MockDelivery {
    fn default() -> Self {
        Self {
            outcome: Mutex::new(DeliveryOutcome::Failed { response: None }),
            delay: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }
}

impl MockDelivery {
    pub fn set(&self, outcome: DeliveryOutcome) {
        *self.outcome.lock().unwrap() = outcome;
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeliveryProvider for MockDelivery {
    async fn deliver(&self, _request: &DeliveryRequest) -> DeliveryOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.outcome.lock().unwrap().clone()
    }
}

/// Test harness: application state backed by a throwaway SQLite database,
/// with mock external collaborators.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub gateway: Arc<MockGateway>,
    pub delivery: Arc<MockDelivery>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_path = std::env::temp_dir().join(format!(
            "topup_test_{}.db",
            Uuid::new_v4().simple()
        ));
        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "127.0.0.1".to_string(),
            0,
            "test".to_string(),
            "https://gateway.invalid".to_string(),
            "sk_test_secret".to_string(),
            WEBHOOK_SECRET.to_string(),
            "https://fulfillment.invalid".to_string(),
            "fk_test_key".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");
        let db = Arc::new(pool);

        let gateway = Arc::new(MockGateway::default());
        let delivery = Arc::new(MockDelivery::default());
        let services = AppServices::new(
            db.clone(),
            gateway.clone() as Arc<dyn PaymentGateway>,
            delivery.clone() as Arc<dyn DeliveryProvider>,
        );

        let state = AppState {
            db,
            config: cfg,
            services,
        };
        let router = app(state.clone());

        Self {
            router,
            state,
            gateway,
            delivery,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        json: Option<Value>,
    ) -> Response<Body> {
        let builder = Request::builder().method(method).uri(uri);
        let request = match json {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed")
    }

    /// Deliver a gateway webhook, optionally signed.
    pub async fn webhook(&self, signature: Option<&str>, payload: Value) -> Response<Body> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/webhooks/flutterwave")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(signature) = signature {
            builder = builder.header("verif-hash", signature);
        }
        let request = builder.body(Body::from(payload.to_string())).unwrap();
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("webhook request failed")
    }

    pub async fn seed_plan(
        &self,
        network: &str,
        price: i64,
        provider_plan_id: i32,
    ) -> data_plan::Model {
        data_plan::ActiveModel {
            id: Set(Uuid::new_v4()),
            network: Set(network.to_string()),
            data_size: Set("1GB".to_string()),
            validity: Set("30 Days".to_string()),
            price: Set(price),
            provider_plan_id: Set(provider_plan_id),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.state.db)
        .await
        .expect("failed to seed plan")
    }

    pub async fn seed_product(&self, name: &str, price: i64, in_stock: bool) -> product::Model {
        product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            description: Set(String::new()),
            price: Set(price),
            image_url: Set("https://placehold.co/600x600/png?text=Product".to_string()),
            in_stock: Set(in_stock),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.state.db)
        .await
        .expect("failed to seed product")
    }

    pub async fn seed_transaction(
        &self,
        tx_ref: &str,
        kind: TransactionKind,
        amount: i64,
        plan_id: Option<Uuid>,
        status: TransactionStatus,
    ) -> transaction::Model {
        transaction::ActiveModel {
            id: Set(Uuid::new_v4()),
            tx_ref: Set(tx_ref.to_string()),
            kind: Set(kind),
            beneficiary: Set("08030000001".to_string()),
            amount: Set(amount),
            plan_id: Set(plan_id),
            product_id: Set(None),
            status: Set(status),
            delivery_receipt: Set(None),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.state.db)
        .await
        .expect("failed to seed transaction")
    }

    /// Re-read a record by reference, asserting it exists.
    pub async fn reload(&self, tx_ref: &str) -> transaction::Model {
        transaction::Entity::find()
            .filter(transaction::Column::TxRef.eq(tx_ref))
            .one(&*self.state.db)
            .await
            .expect("reload query failed")
            .expect("transaction missing")
    }
}

pub async fn response_json(response: Response<Body>) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

pub fn assert_status(response: &Response<Body>, expected: StatusCode) {
    assert_eq!(response.status(), expected);
}
