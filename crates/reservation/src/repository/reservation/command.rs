use super::RESERVATION_COLUMNS;
use crate::{
    abstract_trait::reservation::repository::{
        ReservationCommandRepositoryTrait, ReserveCommand, ReserveOutcome,
    },
    domain::availability::Availability,
    model::reservation::{Reservation as ReservationModel, ReservationStatus},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{config::ConnectionPool, errors::RepositoryError};
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct ReservationCommandRepository {
    db: ConnectionPool,
}

impl ReservationCommandRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReservationCommandRepositoryTrait for ReservationCommandRepository {
    async fn reserve(&self, cmd: &ReserveCommand) -> Result<ReserveOutcome, RepositoryError> {
        let mut tx = self.db.begin().await.map_err(|e| {
            error!("❌ Failed to begin reservation transaction: {e:?}");
            RepositoryError::from(e)
        })?;

        // Row lock on the product serializes every writer for it.
        let total_stock = sqlx::query_scalar::<_, i32>(
            "SELECT quantity FROM products WHERE product_id = $1 FOR UPDATE",
        )
        .bind(cmd.product_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(total_stock) = total_stock else {
            tx.rollback().await?;
            return Ok(ReserveOutcome::ProductMissing);
        };

        let lapsed = sqlx::query(
            r#"
            UPDATE reservations
            SET status = 'expired', updated_at = $3
            WHERE user_id = $1 AND product_id = $2
              AND status = 'active' AND expires_at <= $3
            "#,
        )
        .bind(cmd.user_id)
        .bind(cmd.product_id)
        .bind(cmd.now)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if lapsed > 0 {
            info!(
                "⏳ Expired lapsed hold of user {} on product {} before reserving",
                cmd.user_id, cmd.product_id
            );
        }

        let reserved_by_others = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COALESCE(SUM(quantity), 0)::BIGINT
            FROM reservations
            WHERE product_id = $1 AND user_id <> $2
              AND status = 'active' AND expires_at > $3
            "#,
        )
        .bind(cmd.product_id)
        .bind(cmd.user_id)
        .bind(cmd.now)
        .fetch_one(&mut *tx)
        .await?;

        let select_own = format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations \
             WHERE user_id = $1 AND product_id = $2 AND status = 'active'"
        );
        let existing = sqlx::query_as::<_, ReservationModel>(&select_own)
            .bind(cmd.user_id)
            .bind(cmd.product_id)
            .fetch_optional(&mut *tx)
            .await?;

        let own = existing.as_ref().map(|r| r.quantity).unwrap_or(0);
        let availability = Availability::compute(total_stock, reserved_by_others, own);

        if !availability.admits(cmd.quantity) {
            tx.rollback().await?;
            warn!(
                "🚫 User {} asked for {} of product {}, max is {}",
                cmd.user_id,
                cmd.quantity,
                cmd.product_id,
                availability.max_for_requester()
            );
            return Ok(ReserveOutcome::Insufficient {
                max_allowed: availability.max_for_requester(),
            });
        }

        let reservation = match existing {
            Some(current) => {
                let sql = format!(
                    "UPDATE reservations SET quantity = $2, expires_at = $3, updated_at = $4 \
                     WHERE reservation_id = $1 RETURNING {RESERVATION_COLUMNS}"
                );
                sqlx::query_as::<_, ReservationModel>(&sql)
                    .bind(current.reservation_id)
                    .bind(cmd.quantity)
                    .bind(cmd.expires_at)
                    .bind(cmd.now)
                    .fetch_one(&mut *tx)
                    .await?
            }
            None => {
                let sql = format!(
                    "INSERT INTO reservations \
                     (user_id, product_id, quantity, status, expires_at, created_at, updated_at) \
                     VALUES ($1, $2, $3, 'active', $4, $5, $5) RETURNING {RESERVATION_COLUMNS}"
                );
                sqlx::query_as::<_, ReservationModel>(&sql)
                    .bind(cmd.user_id)
                    .bind(cmd.product_id)
                    .bind(cmd.quantity)
                    .bind(cmd.expires_at)
                    .bind(cmd.now)
                    .fetch_one(&mut *tx)
                    .await?
            }
        };

        tx.commit().await.map_err(|e| {
            error!("❌ Failed to commit reservation: {e:?}");
            RepositoryError::from(e)
        })?;

        Ok(ReserveOutcome::Reserved(reservation))
    }

    async fn transition_active(
        &self,
        user_id: i32,
        product_id: i32,
        to: ReservationStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<ReservationModel>, RepositoryError> {
        let sql = format!(
            "UPDATE reservations SET status = $3, updated_at = $4 \
             WHERE user_id = $1 AND product_id = $2 AND status = 'active' AND expires_at > $4 \
             RETURNING {RESERVATION_COLUMNS}"
        );

        sqlx::query_as::<_, ReservationModel>(&sql)
            .bind(user_id)
            .bind(product_id)
            .bind(to)
            .bind(now)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to move reservation of user {user_id} on {product_id} to {to:?}: {e:?}");
                RepositoryError::from(e)
            })
    }

    async fn expire_lapsed(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE reservations
            SET status = 'expired', updated_at = $1
            WHERE status = 'active' AND expires_at < $1
            "#,
        )
        .bind(now)
        .execute(&self.db)
        .await
        .map_err(|e| {
            error!("❌ Failed to expire lapsed reservations: {e:?}");
            RepositoryError::from(e)
        })?;

        Ok(result.rows_affected())
    }

    async fn purge_terminal_before(&self, cutoff: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM reservations WHERE status <> 'active' AND expires_at < $1",
        )
        .bind(cutoff)
        .execute(&self.db)
        .await
        .map_err(|e| {
            error!("❌ Failed to purge terminal reservations: {e:?}");
            RepositoryError::from(e)
        })?;

        Ok(result.rows_affected())
    }
}
