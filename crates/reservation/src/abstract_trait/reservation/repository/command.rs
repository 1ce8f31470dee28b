use crate::model::reservation::{Reservation as ReservationModel, ReservationStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynReservationCommandRepository =
    Arc<dyn ReservationCommandRepositoryTrait + Send + Sync>;

#[derive(Debug, Clone)]
pub struct ReserveCommand {
    pub user_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub now: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub enum ReserveOutcome {
    Reserved(ReservationModel),
    Insufficient { max_allowed: i32 },
    ProductMissing,
}

#[async_trait]
pub trait ReservationCommandRepositoryTrait {
    /// Validates against live availability and writes the requester's hold
    /// as one atomic step per product.
    async fn reserve(&self, cmd: &ReserveCommand) -> Result<ReserveOutcome, RepositoryError>;

    /// Moves the requester's live hold to `to`. `None` when there is none.
    async fn transition_active(
        &self,
        user_id: i32,
        product_id: i32,
        to: ReservationStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<ReservationModel>, RepositoryError>;

    async fn expire_lapsed(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError>;

    async fn purge_terminal_before(&self, cutoff: DateTime<Utc>) -> Result<u64, RepositoryError>;
}
