use anyhow::{Context, Result};
use reservation::{
    config::myconfig::Config,
    handler::AppRouter,
    kafka::{event::OrderEventHandler, kafka_consumer::run_kafka_consumer},
    service::sweeper::run_expiry_sweeper,
    state::AppState,
};
use shared::{
    config::{ConnectionManager, ConnectionPool},
    utils::{Telemetry, init_logger, run_metrics_collector, shutdown_signal},
};
use std::sync::Arc;
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

const SERVICE_NAME: &str = "reservation-service";

#[tokio::main]
async fn main() -> Result<()> {
    let (config, state, telemetry, _log_guard) =
        setup().await.context("Failed to setup application")?;

    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let handles = run_servers(&config, state, &shutdown_tx);

    shutdown_signal().await;
    info!("🛑 Shutdown signal received, broadcasting shutdown...");

    if let Err(e) = shutdown_tx.send(()) {
        warn!("Failed to send shutdown signal: {e}");
    }

    shutdown(telemetry, handles).await;

    Ok(())
}

async fn setup() -> Result<(Config, Arc<AppState>, Telemetry, Option<WorkerGuard>)> {
    dotenv::dotenv().ok();

    let config = Config::init().context("Failed to load configuration")?;

    let telemetry = Telemetry::init(SERVICE_NAME, config.otel_endpoint.as_deref())
        .context("Failed to initialize telemetry")?;

    let log_guard = init_logger(telemetry.logger_provider(), SERVICE_NAME)?;

    info!("🚀 Starting Reservation Service initialization...");

    let db_pool = ConnectionManager::new_pool(
        &config.database_url,
        config.db_min_conn,
        config.db_max_conn,
    )
    .await
    .context("Failed to initialize database pool")?;

    if config.run_migrations {
        run_migrations(&db_pool)
            .await
            .context("Failed to run database migrations")?;
    }

    let state = Arc::new(
        AppState::new(&config, db_pool)
            .await
            .context("Failed to create AppState")?,
    );

    info!("✅ Application setup completed successfully.");
    Ok((config, state, telemetry, log_guard))
}

fn run_servers(
    config: &Config,
    state: Arc<AppState>,
    shutdown_tx: &broadcast::Sender<()>,
) -> Vec<JoinHandle<()>> {
    let mut handles = Vec::new();

    handles.push(tokio::spawn(run_metrics_collector(
        state.system_metrics.clone(),
        shutdown_tx.subscribe(),
    )));

    handles.push(tokio::spawn(run_expiry_sweeper(
        state.di_container.reservation_command.clone(),
        config.reservation.sweep_interval,
        shutdown_tx.subscribe(),
    )));

    match &config.kafka_broker {
        Some(brokers) => {
            let handler = Arc::new(OrderEventHandler::new(
                state.di_container.product_service.clone(),
                state.di_container.reservation_command.clone(),
            ));
            handles.push(tokio::spawn(run_kafka_consumer(
                brokers.clone(),
                handler,
                shutdown_tx.subscribe(),
            )));
        }
        None => info!("KAFKA not set, order event consumer disabled"),
    }

    let port = config.port;
    let http_shutdown_rx = shutdown_tx.subscribe();
    handles.push(tokio::spawn(async move {
        if let Err(e) = AppRouter::serve(port, state, http_shutdown_rx).await {
            error!("❌ HTTP server failed: {e:#}");
        }
    }));

    handles
}

async fn shutdown(telemetry: Telemetry, handles: Vec<JoinHandle<()>>) {
    info!("🛑 Shutting down all components...");

    let shutdown_timeout = tokio::time::Duration::from_secs(30);
    let result = tokio::time::timeout(shutdown_timeout, async {
        for handle in handles {
            if let Err(e) = handle.await {
                error!("Task ended abnormally: {e}");
            }
        }
    })
    .await;

    match result {
        Ok(()) => info!("✅ All components shutdown gracefully"),
        Err(_) => warn!("⚠️ Shutdown timeout reached, forcing exit"),
    }

    if let Err(e) = telemetry.shutdown() {
        error!("Failed to shutdown telemetry: {e}");
    }

    info!("✅ Reservation Service shutdown complete.");
}

async fn run_migrations(pool: &ConnectionPool) -> Result<()> {
    info!("📜 Running database migrations");
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
