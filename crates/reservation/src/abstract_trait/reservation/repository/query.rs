use crate::model::reservation::Reservation as ReservationModel;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynReservationQueryRepository = Arc<dyn ReservationQueryRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait ReservationQueryRepositoryTrait {
    /// Sum of live hold quantities on a product, optionally leaving one user out.
    async fn sum_live_quantity(
        &self,
        product_id: i32,
        exclude_user: Option<i32>,
        now: DateTime<Utc>,
    ) -> Result<i64, RepositoryError>;

    async fn find_live(
        &self,
        user_id: i32,
        product_id: i32,
        now: DateTime<Utc>,
    ) -> Result<Option<ReservationModel>, RepositoryError>;

    async fn find_live_by_user(
        &self,
        user_id: i32,
        now: DateTime<Utc>,
    ) -> Result<Vec<ReservationModel>, RepositoryError>;
}
