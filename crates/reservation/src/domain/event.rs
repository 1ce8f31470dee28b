use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OrderItemEvent {
    pub product_id: i32,
    pub quantity: i32,
}

/// Order lifecycle events published by checkout.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum OrderEvent {
    Created {
        order_id: i32,
        user_id: i32,
        items: Vec<OrderItemEvent>,
    },
    Cancelled {
        order_id: i32,
        items: Vec<OrderItemEvent>,
    },
}

impl OrderEvent {
    pub const TOPICS: [&'static str; 2] = ["order.created", "order.cancelled"];

    pub fn order_id(&self) -> i32 {
        match self {
            OrderEvent::Created { order_id, .. } | OrderEvent::Cancelled { order_id, .. } => {
                *order_id
            }
        }
    }

    pub fn items(&self) -> &[OrderItemEvent] {
        match self {
            OrderEvent::Created { items, .. } | OrderEvent::Cancelled { items, .. } => items,
        }
    }
}
