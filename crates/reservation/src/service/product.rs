use crate::{
    abstract_trait::product::{DynProductRepository, ProductStockServiceTrait},
    domain::response::product::ProductResponse,
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use shared::{
    errors::ServiceError,
    utils::{Method, Metrics, OperationTracer},
};
use tracing::{info, warn};

#[derive(Clone)]
pub struct ProductStockService {
    repo: DynProductRepository,
    tracer: OperationTracer,
}

impl ProductStockService {
    pub fn new(repo: DynProductRepository, registry: &mut Registry) -> Self {
        let metrics = Metrics::new();
        metrics.register(registry, "product_stock_service");

        Self {
            repo,
            tracer: OperationTracer::new("product-stock-service", metrics),
        }
    }

    fn attributes(product_id: i32) -> Vec<KeyValue> {
        vec![
            KeyValue::new("component", "product"),
            KeyValue::new("product.id", i64::from(product_id)),
        ]
    }

    fn not_found() -> ServiceError {
        ServiceError::NotFound("Produce not found".to_string())
    }

    fn require_positive(quantity: i32) -> Result<(), ServiceError> {
        if quantity <= 0 {
            return Err(ServiceError::InvalidArgument(
                "Quantity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    async fn set_stock(
        &self,
        farmer_id: i32,
        product_id: i32,
        quantity: i32,
    ) -> Result<ProductResponse, ServiceError> {
        if quantity < 0 {
            return Err(ServiceError::InvalidArgument(
                "Quantity cannot be negative".to_string(),
            ));
        }

        let product = self
            .repo
            .find_by_id(product_id)
            .await?
            .ok_or_else(Self::not_found)?;

        if product.farmer_id != farmer_id {
            warn!("🚫 Farmer {farmer_id} tried to update stock of product {product_id}");
            return Err(ServiceError::Forbidden(
                "Only the listing farmer can update its stock".to_string(),
            ));
        }

        self.repo
            .update_stock(product_id, quantity)
            .await?
            .map(ProductResponse::from)
            .ok_or_else(Self::not_found)
    }
}

#[async_trait]
impl ProductStockServiceTrait for ProductStockService {
    async fn find_by_id(&self, product_id: i32) -> Result<ProductResponse, ServiceError> {
        info!("🔍 Finding product {product_id}");

        self.tracer
            .trace("FindProduct", Method::Get, Self::attributes(product_id), async {
                self.repo
                    .find_by_id(product_id)
                    .await?
                    .map(ProductResponse::from)
                    .ok_or_else(Self::not_found)
            })
            .await
    }

    async fn update_stock(
        &self,
        farmer_id: i32,
        product_id: i32,
        quantity: i32,
    ) -> Result<ProductResponse, ServiceError> {
        info!("📝 Farmer {farmer_id} sets stock of product {product_id} to {quantity}");

        self.tracer
            .trace(
                "UpdateStock",
                Method::Put,
                Self::attributes(product_id),
                self.set_stock(farmer_id, product_id, quantity),
            )
            .await
    }

    async fn decrease_stock(
        &self,
        product_id: i32,
        quantity: i32,
    ) -> Result<ProductResponse, ServiceError> {
        info!("➖ Decreasing stock of product {product_id} by {quantity}");

        self.tracer
            .trace("DecreaseStock", Method::Put, Self::attributes(product_id), async {
                Self::require_positive(quantity)?;
                self.repo
                    .decrease_stock(product_id, quantity)
                    .await?
                    .map(ProductResponse::from)
                    .ok_or_else(Self::not_found)
            })
            .await
    }

    async fn increase_stock(
        &self,
        product_id: i32,
        quantity: i32,
    ) -> Result<ProductResponse, ServiceError> {
        info!("➕ Increasing stock of product {product_id} by {quantity}");

        self.tracer
            .trace("IncreaseStock", Method::Put, Self::attributes(product_id), async {
                Self::require_positive(quantity)?;
                self.repo
                    .increase_stock(product_id, quantity)
                    .await?
                    .map(ProductResponse::from)
                    .ok_or_else(Self::not_found)
            })
            .await
    }
}
