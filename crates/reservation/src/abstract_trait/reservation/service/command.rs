use crate::domain::response::reservation::{
    CompletionOutcome, ReservationResponse, SweepReport,
};
use async_trait::async_trait;
use shared::errors::ServiceError;
use std::sync::Arc;

pub type DynReservationCommandService = Arc<dyn ReservationCommandServiceTrait + Send + Sync>;

#[async_trait]
pub trait ReservationCommandServiceTrait {
    async fn create_reservation(
        &self,
        user_id: i32,
        product_id: i32,
        quantity: i32,
    ) -> Result<ReservationResponse, ServiceError>;
    async fn upsert_reservation(
        &self,
        user_id: i32,
        product_id: i32,
        quantity: i32,
    ) -> Result<ReservationResponse, ServiceError>;
    async fn cancel_reservation(
        &self,
        user_id: i32,
        product_id: i32,
    ) -> Result<ReservationResponse, ServiceError>;
    async fn complete_reservation(
        &self,
        user_id: i32,
        product_id: i32,
    ) -> Result<CompletionOutcome, ServiceError>;
    async fn sweep_expired(&self) -> Result<SweepReport, ServiceError>;
}
