use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "produce_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProduceStatus {
    Available,
    Sold,
    Negotiating,
}

impl ProduceStatus {
    /// Status a listing takes after its quantity is set.
    pub fn for_quantity(quantity: i32) -> Self {
        if quantity <= 0 {
            ProduceStatus::Sold
        } else {
            ProduceStatus::Available
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub product_id: i32,
    pub farmer_id: i32,
    pub name: String,
    pub unit: String,
    pub quantity: i32,
    pub status: ProduceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
