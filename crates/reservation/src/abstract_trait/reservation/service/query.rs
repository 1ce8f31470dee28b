use crate::domain::{availability::Availability, response::reservation::ReservationResponse};
use async_trait::async_trait;
use shared::errors::ServiceError;
use std::sync::Arc;

pub type DynReservationQueryService = Arc<dyn ReservationQueryServiceTrait + Send + Sync>;

#[async_trait]
pub trait ReservationQueryServiceTrait {
    async fn compute_availability(
        &self,
        product_id: i32,
        requester: Option<i32>,
    ) -> Result<Availability, ServiceError>;
    async fn list_active_reservations(
        &self,
        user_id: i32,
    ) -> Result<Vec<ReservationResponse>, ServiceError>;
}
