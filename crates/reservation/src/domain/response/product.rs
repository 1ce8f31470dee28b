use crate::model::product::{ProduceStatus, Product};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: i32,
    pub farmer_id: i32,
    pub name: String,
    pub unit: String,
    pub quantity: i32,
    #[schema(value_type = String, example = "available")]
    pub status: ProduceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(value: Product) -> Self {
        ProductResponse {
            id: value.product_id,
            farmer_id: value.farmer_id,
            name: value.name,
            unit: value.unit,
            quantity: value.quantity,
            status: value.status,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProduceEnvelope {
    pub success: bool,
    pub message: String,
    pub produce: ProductResponse,
}
