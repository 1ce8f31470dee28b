use crate::abstract_trait::reservation::service::DynReservationCommandService;
use prometheus_client::{
    metrics::{counter::Counter, gauge::Gauge},
    registry::Registry,
};
use std::time::Duration;
use tokio::{
    sync::broadcast,
    time::{MissedTickBehavior, interval},
};
use tracing::{error, info};

#[derive(Clone, Debug, Default)]
pub struct SweepMetrics {
    pub expired: Counter,
    pub purged: Counter,
    pub last_expired: Gauge,
}

impl SweepMetrics {
    pub fn register(&self, registry: &mut Registry) {
        registry.register(
            "reservations_expired",
            "Active reservations flipped to expired by the sweeper",
            self.expired.clone(),
        );
        registry.register(
            "reservations_purged",
            "Terminal reservations deleted after the retention window",
            self.purged.clone(),
        );
        registry.register(
            "reservations_last_sweep_expired",
            "Reservations expired by the most recent sweep",
            self.last_expired.clone(),
        );
    }

    pub fn record(&self, expired: u64, purged: u64) {
        self.expired.inc_by(expired);
        self.purged.inc_by(purged);
        self.last_expired.set(expired as i64);
    }
}

/// Runs `sweep_expired` every `every` until shutdown. Failures are logged and
/// the next tick tries again.
pub async fn run_expiry_sweeper(
    service: DynReservationCommandService,
    every: Duration,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!("🧹 Expiry sweeper started, interval {}s", every.as_secs());

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = service.sweep_expired().await {
                    error!("❌ Expiry sweep failed: {e}");
                }
            }
            _ = shutdown_rx.recv() => {
                info!("🛑 Expiry sweeper stopped");
                break;
            }
        }
    }
}
