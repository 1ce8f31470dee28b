use crate::model::product::Product as ProductModel;
use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynProductRepository = Arc<dyn ProductRepositoryTrait + Send + Sync>;

/// Stock-bearing view of the produce catalog. Write methods return `None`
/// when the product does not exist.
#[async_trait]
pub trait ProductRepositoryTrait {
    async fn find_by_id(&self, product_id: i32) -> Result<Option<ProductModel>, RepositoryError>;
    async fn update_stock(
        &self,
        product_id: i32,
        quantity: i32,
    ) -> Result<Option<ProductModel>, RepositoryError>;
    async fn decrease_stock(
        &self,
        product_id: i32,
        quantity: i32,
    ) -> Result<Option<ProductModel>, RepositoryError>;
    async fn increase_stock(
        &self,
        product_id: i32,
        quantity: i32,
    ) -> Result<Option<ProductModel>, RepositoryError>;
}
