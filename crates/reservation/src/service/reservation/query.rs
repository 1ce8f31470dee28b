use crate::{
    abstract_trait::{
        product::DynProductRepository,
        reservation::{
            repository::DynReservationQueryRepository, service::ReservationQueryServiceTrait,
        },
    },
    domain::{availability::Availability, response::reservation::ReservationResponse},
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use shared::{
    errors::ServiceError,
    utils::{DynClock, Method, Metrics, OperationTracer},
};
use tracing::info;

#[derive(Clone)]
pub struct ReservationQueryService {
    query: DynReservationQueryRepository,
    products: DynProductRepository,
    clock: DynClock,
    tracer: OperationTracer,
}

impl ReservationQueryService {
    pub fn new(
        query: DynReservationQueryRepository,
        products: DynProductRepository,
        clock: DynClock,
        registry: &mut Registry,
    ) -> Self {
        let metrics = Metrics::new();
        metrics.register(registry, "reservation_query_service");

        Self {
            query,
            products,
            clock,
            tracer: OperationTracer::new("reservation-query-service", metrics),
        }
    }

    async fn availability(
        &self,
        product_id: i32,
        requester: Option<i32>,
    ) -> Result<Availability, ServiceError> {
        let now = self.clock.now();

        let product = self
            .products
            .find_by_id(product_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))?;

        let reserved_by_others = self
            .query
            .sum_live_quantity(product_id, requester, now)
            .await?;

        let requester_reserved = match requester {
            Some(user_id) => self
                .query
                .find_live(user_id, product_id, now)
                .await?
                .map(|r| r.quantity)
                .unwrap_or(0),
            None => 0,
        };

        Ok(Availability::compute(
            product.quantity,
            reserved_by_others,
            requester_reserved,
        ))
    }
}

#[async_trait]
impl ReservationQueryServiceTrait for ReservationQueryService {
    async fn compute_availability(
        &self,
        product_id: i32,
        requester: Option<i32>,
    ) -> Result<Availability, ServiceError> {
        info!("🔍 Computing availability of product {product_id} for {requester:?}");

        let attributes = vec![
            KeyValue::new("component", "reservation"),
            KeyValue::new("product.id", i64::from(product_id)),
        ];

        self.tracer
            .trace(
                "ComputeAvailability",
                Method::Get,
                attributes,
                self.availability(product_id, requester),
            )
            .await
    }

    async fn list_active_reservations(
        &self,
        user_id: i32,
    ) -> Result<Vec<ReservationResponse>, ServiceError> {
        info!("🔍 Listing active reservations of user {user_id}");

        let attributes = vec![
            KeyValue::new("component", "reservation"),
            KeyValue::new("user.id", i64::from(user_id)),
        ];

        self.tracer
            .trace("ListActiveReservations", Method::Get, attributes, async {
                let now = self.clock.now();
                let rows = self.query.find_live_by_user(user_id, now).await?;
                Ok::<_, ServiceError>(rows.into_iter().map(ReservationResponse::from).collect())
            })
            .await
    }
}
