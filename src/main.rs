use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use tokio::signal;
use tracing::info;

use topup_api as api;

use api::services::{
    delivery::{AmigoClient, DeliveryProvider},
    payment_gateway::{FlutterwaveGateway, PaymentGateway},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = api::config::load_config().context("failed to load configuration")?;
    api::config::init_tracing(cfg.log_level(), cfg.log_json);
    api::handlers::health::init_start_time();

    let pool = api::db::establish_connection(&cfg)
        .await
        .context("failed to connect to database")?;
    if cfg.auto_migrate {
        api::db::run_migrations(&pool)
            .await
            .context("failed to run migrations")?;
    }
    let db = Arc::new(pool);

    let outbound_timeout = Duration::from_secs(cfg.outbound_timeout_secs);
    let gateway: Arc<dyn PaymentGateway> = Arc::new(FlutterwaveGateway::new(
        &cfg.gateway_base_url,
        &cfg.gateway_secret_key,
        outbound_timeout,
    )?);
    let delivery: Arc<dyn DeliveryProvider> = Arc::new(AmigoClient::new(
        &cfg.fulfillment_base_url,
        &cfg.fulfillment_api_key,
        outbound_timeout,
    )?);

    let services = api::handlers::AppServices::new(db.clone(), gateway, delivery);
    let state = api::AppState {
        db,
        config: cfg.clone(),
        services,
    };

    let app = api::app(state);

    let addr: SocketAddr = format!("{}:{}", cfg.host, cfg.port)
        .parse()
        .context("invalid host/port configuration")?;
    info!("topup-api listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install signal handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
