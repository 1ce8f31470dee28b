use crate::{
    abstract_trait::product::ProductRepositoryTrait,
    model::product::{ProduceStatus, Product as ProductModel},
};
use async_trait::async_trait;
use shared::{config::ConnectionPool, errors::RepositoryError};
use tracing::{error, info};

const PRODUCT_COLUMNS: &str =
    "product_id, farmer_id, name, unit, quantity, status, created_at, updated_at";

#[derive(Clone)]
pub struct ProductRepository {
    db: ConnectionPool,
}

impl ProductRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductRepositoryTrait for ProductRepository {
    async fn find_by_id(&self, product_id: i32) -> Result<Option<ProductModel>, RepositoryError> {
        info!("🔍 Fetching product id={product_id}");

        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE product_id = $1");

        sqlx::query_as::<_, ProductModel>(&sql)
            .bind(product_id)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch product {product_id}: {e:?}");
                RepositoryError::from(e)
            })
    }

    async fn update_stock(
        &self,
        product_id: i32,
        quantity: i32,
    ) -> Result<Option<ProductModel>, RepositoryError> {
        info!("📝 Setting stock of product id={product_id} to {quantity}");

        let sql = format!(
            "UPDATE products SET quantity = $2, status = $3, updated_at = NOW() \
             WHERE product_id = $1 RETURNING {PRODUCT_COLUMNS}"
        );

        sqlx::query_as::<_, ProductModel>(&sql)
            .bind(product_id)
            .bind(quantity)
            .bind(ProduceStatus::for_quantity(quantity))
            .fetch_optional(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to update stock of product {product_id}: {e:?}");
                RepositoryError::from(e)
            })
    }

    async fn decrease_stock(
        &self,
        product_id: i32,
        quantity: i32,
    ) -> Result<Option<ProductModel>, RepositoryError> {
        info!("➖ Decreasing stock of product id={product_id} by {quantity}");

        let sql = format!(
            "UPDATE products \
             SET quantity = GREATEST(quantity - $2, 0), \
                 status = CASE WHEN quantity - $2 <= 0 THEN 'sold'::produce_status ELSE status END, \
                 updated_at = NOW() \
             WHERE product_id = $1 RETURNING {PRODUCT_COLUMNS}"
        );

        sqlx::query_as::<_, ProductModel>(&sql)
            .bind(product_id)
            .bind(quantity)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to decrease stock of product {product_id}: {e:?}");
                RepositoryError::from(e)
            })
    }

    async fn increase_stock(
        &self,
        product_id: i32,
        quantity: i32,
    ) -> Result<Option<ProductModel>, RepositoryError> {
        info!("➕ Increasing stock of product id={product_id} by {quantity}");

        let sql = format!(
            "UPDATE products \
             SET quantity = quantity + $2, \
                 status = CASE WHEN status = 'sold'::produce_status AND quantity + $2 > 0 \
                          THEN 'available'::produce_status ELSE status END, \
                 updated_at = NOW() \
             WHERE product_id = $1 RETURNING {PRODUCT_COLUMNS}"
        );

        sqlx::query_as::<_, ProductModel>(&sql)
            .bind(product_id)
            .bind(quantity)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to increase stock of product {product_id}: {e:?}");
                RepositoryError::from(e)
            })
    }
}
