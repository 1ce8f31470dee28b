use crate::{
    domain::availability::Availability,
    model::reservation::{Reservation, ReservationStatus},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReservationResponse {
    pub id: i32,
    pub user_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    #[schema(value_type = String, example = "active")]
    pub status: ReservationStatus,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Reservation> for ReservationResponse {
    fn from(value: Reservation) -> Self {
        ReservationResponse {
            id: value.reservation_id,
            user_id: value.user_id,
            product_id: value.product_id,
            quantity: value.quantity,
            status: value.status,
            expires_at: value.expires_at,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailableStockResponse {
    pub success: bool,
    pub total_stock: i32,
    pub available_stock: i32,
    pub user_reservation: i32,
}

impl From<Availability> for AvailableStockResponse {
    fn from(value: Availability) -> Self {
        AvailableStockResponse {
            success: true,
            total_stock: value.total_stock,
            available_stock: value.available_stock,
            user_reservation: value.requester_reserved,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReservationEnvelope {
    pub success: bool,
    pub message: String,
    pub reservation: ReservationResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReservationListEnvelope {
    pub success: bool,
    pub message: String,
    pub reservations: Vec<ReservationResponse>,
}

/// Result of applying the completion policy at checkout.
#[derive(Debug, Clone)]
pub enum CompletionOutcome {
    Completed(ReservationResponse),
    Retained,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SweepReport {
    pub expired: u64,
    pub purged: u64,
}
