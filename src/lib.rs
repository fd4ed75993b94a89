//! topup-api library
//!
//! Backend for a prepaid data bundle and device storefront. The core is the
//! settlement and delivery reconciliation engine in
//! [`services::reconciliation`]: it drives a purchase record from payment
//! confirmation to fulfillment exactly once, despite concurrent webhook and
//! polling triggers.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod services;

use axum::{routing::get, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub services: handlers::AppServices,
}

/// Compose the full application router.
pub fn app(state: AppState) -> Router {
    let request_timeout = Duration::from_secs(state.config.request_timeout_secs);

    Router::new()
        .nest("/health", handlers::health::health_routes())
        .nest(
            "/api/v1/transactions",
            handlers::transactions::transaction_routes(),
        )
        .nest("/api/v1/webhooks", handlers::webhooks::webhook_routes())
        .nest("/api/v1/data-plans", handlers::data_plans::data_plan_routes())
        .nest("/api/v1/products", handlers::products::product_routes())
        .route("/api/v1/openapi.json", get(openapi::openapi_json))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}
