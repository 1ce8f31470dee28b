use super::RESERVATION_COLUMNS;
use crate::{
    abstract_trait::reservation::repository::ReservationQueryRepositoryTrait,
    model::reservation::Reservation as ReservationModel,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{config::ConnectionPool, errors::RepositoryError};
use tracing::error;

#[derive(Clone)]
pub struct ReservationQueryRepository {
    db: ConnectionPool,
}

impl ReservationQueryRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReservationQueryRepositoryTrait for ReservationQueryRepository {
    async fn sum_live_quantity(
        &self,
        product_id: i32,
        exclude_user: Option<i32>,
        now: DateTime<Utc>,
    ) -> Result<i64, RepositoryError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COALESCE(SUM(quantity), 0)::BIGINT
            FROM reservations
            WHERE product_id = $1
              AND status = 'active'
              AND expires_at > $2
              AND ($3::INTEGER IS NULL OR user_id <> $3)
            "#,
        )
        .bind(product_id)
        .bind(now)
        .bind(exclude_user)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            error!("❌ Failed to sum reservations for product {product_id}: {e:?}");
            RepositoryError::from(e)
        })
    }

    async fn find_live(
        &self,
        user_id: i32,
        product_id: i32,
        now: DateTime<Utc>,
    ) -> Result<Option<ReservationModel>, RepositoryError> {
        let sql = format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations \
             WHERE user_id = $1 AND product_id = $2 AND status = 'active' AND expires_at > $3"
        );

        sqlx::query_as::<_, ReservationModel>(&sql)
            .bind(user_id)
            .bind(product_id)
            .bind(now)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch reservation of user {user_id} on {product_id}: {e:?}");
                RepositoryError::from(e)
            })
    }

    async fn find_live_by_user(
        &self,
        user_id: i32,
        now: DateTime<Utc>,
    ) -> Result<Vec<ReservationModel>, RepositoryError> {
        let sql = format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations \
             WHERE user_id = $1 AND status = 'active' AND expires_at > $2 \
             ORDER BY updated_at DESC"
        );

        sqlx::query_as::<_, ReservationModel>(&sql)
            .bind(user_id)
            .bind(now)
            .fetch_all(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to list reservations of user {user_id}: {e:?}");
                RepositoryError::from(e)
            })
    }
}
