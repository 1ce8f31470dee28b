use crate::domain::response::product::ProductResponse;
use async_trait::async_trait;
use shared::errors::ServiceError;
use std::sync::Arc;

pub type DynProductStockService = Arc<dyn ProductStockServiceTrait + Send + Sync>;

#[async_trait]
pub trait ProductStockServiceTrait {
    async fn find_by_id(&self, product_id: i32) -> Result<ProductResponse, ServiceError>;
    async fn update_stock(
        &self,
        farmer_id: i32,
        product_id: i32,
        quantity: i32,
    ) -> Result<ProductResponse, ServiceError>;
    async fn decrease_stock(
        &self,
        product_id: i32,
        quantity: i32,
    ) -> Result<ProductResponse, ServiceError>;
    async fn increase_stock(
        &self,
        product_id: i32,
        quantity: i32,
    ) -> Result<ProductResponse, ServiceError>;
}
