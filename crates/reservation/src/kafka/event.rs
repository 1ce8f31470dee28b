use crate::{
    abstract_trait::{
        product::DynProductStockService, reservation::service::DynReservationCommandService,
    },
    domain::{
        event::{OrderEvent, OrderItemEvent},
        response::reservation::CompletionOutcome,
    },
};
use shared::errors::ServiceError;
use tracing::{error, info, warn};

pub struct OrderEventHandler {
    pub product_service: DynProductStockService,
    pub reservation_service: DynReservationCommandService,
}

impl OrderEventHandler {
    pub fn new(
        product_service: DynProductStockService,
        reservation_service: DynReservationCommandService,
    ) -> Self {
        Self {
            product_service,
            reservation_service,
        }
    }

    pub async fn handle_event(&self, event: OrderEvent) -> Result<(), ServiceError> {
        if event.items().is_empty() {
            warn!("⚠️ Order {} carries no items, skipping", event.order_id());
            return Ok(());
        }

        match event {
            OrderEvent::Created {
                order_id,
                user_id,
                items,
            } => {
                info!("📦 Processing Created event for order_id={order_id}");

                for (done, &OrderItemEvent {
                    product_id,
                    quantity,
                }) in items.iter().enumerate()
                {
                    if let Err(e) = self
                        .product_service
                        .decrease_stock(product_id, quantity)
                        .await
                    {
                        error!("❌ Failed to decrease stock for product_id={product_id}: {e}");
                        report_partial(order_id, "decreased", &items[..done]);
                        return Err(e);
                    }

                    if let Err(e) = self.settle_reservation(order_id, user_id, product_id).await {
                        report_partial(order_id, "decreased", &items[..=done]);
                        return Err(e);
                    }
                }

                Ok(())
            }
            OrderEvent::Cancelled { order_id, items } => {
                info!("🗑️ Processing Cancelled event for order_id={order_id}");

                for (done, &OrderItemEvent {
                    product_id,
                    quantity,
                }) in items.iter().enumerate()
                {
                    info!("🔁 Restoring stock for product_id={product_id} by {quantity}");

                    if let Err(e) = self
                        .product_service
                        .increase_stock(product_id, quantity)
                        .await
                    {
                        error!("❌ Failed to increase stock for product_id={product_id}: {e}");
                        report_partial(order_id, "restored", &items[..done]);
                        return Err(e);
                    }
                }

                Ok(())
            }
        }
    }

    async fn settle_reservation(
        &self,
        order_id: i32,
        user_id: i32,
        product_id: i32,
    ) -> Result<(), ServiceError> {
        match self
            .reservation_service
            .complete_reservation(user_id, product_id)
            .await
        {
            Ok(CompletionOutcome::Completed(reservation)) => {
                info!(
                    "🧾 Order {order_id} completed reservation {} of user {user_id}",
                    reservation.id
                );
                Ok(())
            }
            Ok(CompletionOutcome::Retained) => Ok(()),
            Err(ServiceError::NotFound(_)) => {
                warn!(
                    "⚠️ Order {order_id}: user {user_id} had no active reservation on product {product_id}"
                );
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

/// Items of a failed order whose stock change already went through. Stock
/// updates are not rolled back, so these need manual reconciliation.
fn report_partial(order_id: i32, action: &str, applied: &[OrderItemEvent]) {
    if applied.is_empty() {
        return;
    }

    error!(
        "❌ Order {order_id} failed part-way; stock already {action} for {}",
        describe_items(applied)
    );
}

fn describe_items(items: &[OrderItemEvent]) -> String {
    items
        .iter()
        .map(|item| format!("product_id={} x{}", item.product_id, item.quantity))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applied_items_are_listed_in_order() {
        let applied = [
            OrderItemEvent {
                product_id: 4,
                quantity: 2,
            },
            OrderItemEvent {
                product_id: 9,
                quantity: 1,
            },
        ];

        assert_eq!(describe_items(&applied), "product_id=4 x2, product_id=9 x1");
        assert_eq!(describe_items(&[]), "");
    }
}
