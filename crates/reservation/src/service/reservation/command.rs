use crate::{
    abstract_trait::reservation::{
        repository::{DynReservationCommandRepository, ReserveCommand, ReserveOutcome},
        service::ReservationCommandServiceTrait,
    },
    config::myconfig::{CompletionPolicy, ReservationSettings},
    domain::response::reservation::{CompletionOutcome, ReservationResponse, SweepReport},
    model::reservation::ReservationStatus,
    service::sweeper::SweepMetrics,
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use shared::{
    errors::ServiceError,
    utils::{DynClock, Method, Metrics, OperationTracer},
};
use tracing::{debug, info};

#[derive(Clone)]
pub struct ReservationCommandService {
    command: DynReservationCommandRepository,
    clock: DynClock,
    settings: ReservationSettings,
    tracer: OperationTracer,
    sweep_metrics: SweepMetrics,
}

impl ReservationCommandService {
    pub fn new(
        command: DynReservationCommandRepository,
        clock: DynClock,
        settings: ReservationSettings,
        registry: &mut Registry,
    ) -> Self {
        let metrics = Metrics::new();
        metrics.register(registry, "reservation_command_service");

        let sweep_metrics = SweepMetrics::default();
        sweep_metrics.register(registry);

        Self {
            command,
            clock,
            settings,
            tracer: OperationTracer::new("reservation-command-service", metrics),
            sweep_metrics,
        }
    }

    fn attributes(user_id: i32, product_id: i32) -> Vec<KeyValue> {
        vec![
            KeyValue::new("component", "reservation"),
            KeyValue::new("user.id", i64::from(user_id)),
            KeyValue::new("product.id", i64::from(product_id)),
        ]
    }

    async fn reserve(
        &self,
        user_id: i32,
        product_id: i32,
        quantity: i32,
    ) -> Result<ReservationResponse, ServiceError> {
        if quantity <= 0 {
            return Err(ServiceError::InvalidArgument(
                "Quantity must be at least 1".to_string(),
            ));
        }

        let now = self.clock.now();
        let cmd = ReserveCommand {
            user_id,
            product_id,
            quantity,
            now,
            expires_at: now + self.settings.hold_duration,
        };

        match self.command.reserve(&cmd).await? {
            ReserveOutcome::Reserved(reservation) => {
                info!(
                    "✅ User {user_id} holds {} of product {product_id} until {}",
                    reservation.quantity, reservation.expires_at
                );
                Ok(reservation.into())
            }
            ReserveOutcome::Insufficient { max_allowed } => {
                Err(ServiceError::InsufficientStock { max_allowed })
            }
            ReserveOutcome::ProductMissing => {
                Err(ServiceError::NotFound("Product not found".to_string()))
            }
        }
    }

    async fn transition(
        &self,
        user_id: i32,
        product_id: i32,
        to: ReservationStatus,
    ) -> Result<ReservationResponse, ServiceError> {
        let now = self.clock.now();

        self.command
            .transition_active(user_id, product_id, to, now)
            .await?
            .map(ReservationResponse::from)
            .ok_or_else(|| ServiceError::NotFound("No active reservation found".to_string()))
    }

    async fn sweep(&self) -> Result<SweepReport, ServiceError> {
        let now = self.clock.now();

        let expired = self.command.expire_lapsed(now).await?;
        let purged = self
            .command
            .purge_terminal_before(now - self.settings.retention)
            .await?;

        self.sweep_metrics.record(expired, purged);

        Ok(SweepReport { expired, purged })
    }
}

#[async_trait]
impl ReservationCommandServiceTrait for ReservationCommandService {
    async fn create_reservation(
        &self,
        user_id: i32,
        product_id: i32,
        quantity: i32,
    ) -> Result<ReservationResponse, ServiceError> {
        info!("🆕 Creating reservation: user={user_id} product={product_id} qty={quantity}");

        self.tracer
            .trace(
                "CreateReservation",
                Method::Post,
                Self::attributes(user_id, product_id),
                self.reserve(user_id, product_id, quantity),
            )
            .await
    }

    async fn upsert_reservation(
        &self,
        user_id: i32,
        product_id: i32,
        quantity: i32,
    ) -> Result<ReservationResponse, ServiceError> {
        info!("🔄 Updating reservation: user={user_id} product={product_id} qty={quantity}");

        self.tracer
            .trace(
                "UpsertReservation",
                Method::Put,
                Self::attributes(user_id, product_id),
                self.reserve(user_id, product_id, quantity),
            )
            .await
    }

    async fn cancel_reservation(
        &self,
        user_id: i32,
        product_id: i32,
    ) -> Result<ReservationResponse, ServiceError> {
        info!("🗑️ Cancelling reservation: user={user_id} product={product_id}");

        self.tracer
            .trace(
                "CancelReservation",
                Method::Delete,
                Self::attributes(user_id, product_id),
                self.transition(user_id, product_id, ReservationStatus::Cancelled),
            )
            .await
    }

    async fn complete_reservation(
        &self,
        user_id: i32,
        product_id: i32,
    ) -> Result<CompletionOutcome, ServiceError> {
        match self.settings.completion_policy {
            CompletionPolicy::Complete => {
                info!("🧾 Completing reservation: user={user_id} product={product_id}");

                self.tracer
                    .trace(
                        "CompleteReservation",
                        Method::Put,
                        Self::attributes(user_id, product_id),
                        self.transition(user_id, product_id, ReservationStatus::Completed),
                    )
                    .await
                    .map(CompletionOutcome::Completed)
            }
            CompletionPolicy::Expire => {
                info!(
                    "⏳ Leaving reservation of user {user_id} on product {product_id} to expire"
                );
                Ok(CompletionOutcome::Retained)
            }
        }
    }

    async fn sweep_expired(&self) -> Result<SweepReport, ServiceError> {
        let attributes = vec![KeyValue::new("component", "reservation")];

        let report = self
            .tracer
            .trace("SweepExpired", Method::Sweep, attributes, self.sweep())
            .await?;

        if report.expired > 0 || report.purged > 0 {
            info!(
                "🧹 Sweep expired {} and purged {} reservations",
                report.expired, report.purged
            );
        } else {
            debug!("🧹 Sweep found nothing to do");
        }

        Ok(report)
    }
}
