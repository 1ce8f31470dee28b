use crate::{
    abstract_trait::product::{DynProductRepository, ProductRepositoryTrait},
    model::product::Product as ProductModel,
};
use async_trait::async_trait;
use shared::{cache::CacheStore, errors::RepositoryError};
use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};
use tracing::{debug, info};

/// Counts completed stock writes. A read that saw a write land while it
/// was loading from the database does not fill the cache.
#[derive(Clone, Default)]
struct WriteEpoch(Arc<AtomicU64>);

impl WriteEpoch {
    fn current(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    fn bump(&self) {
        self.0.fetch_add(1, Ordering::AcqRel);
    }

    fn unchanged_since(&self, seen: u64) -> bool {
        self.current() == seen
    }
}

/// Read-through Redis cache in front of the product repository. Any stock
/// write evicts the cached entry.
///
/// The epoch is per process. A reader in another replica can still put back
/// a value that predates a write here; the TTL bounds how long it lives.
#[derive(Clone)]
pub struct CachedProductRepository {
    inner: DynProductRepository,
    cache: CacheStore,
    ttl: Duration,
    writes: WriteEpoch,
}

impl CachedProductRepository {
    pub fn new(inner: DynProductRepository, cache: CacheStore, ttl: Duration) -> Self {
        Self {
            inner,
            cache,
            ttl,
            writes: WriteEpoch::default(),
        }
    }

    fn key(product_id: i32) -> String {
        format!("product:{product_id}")
    }

    async fn evict(&self, product_id: i32) {
        self.writes.bump();
        self.cache.delete(&Self::key(product_id)).await;
    }
}

#[async_trait]
impl ProductRepositoryTrait for CachedProductRepository {
    async fn find_by_id(&self, product_id: i32) -> Result<Option<ProductModel>, RepositoryError> {
        let key = Self::key(product_id);

        if let Some(product) = self.cache.get::<ProductModel>(&key).await {
            info!("✅ Found product {product_id} in cache");
            return Ok(Some(product));
        }

        let seen = self.writes.current();
        let product = self.inner.find_by_id(product_id).await?;

        if let Some(found) = &product {
            if self.writes.unchanged_since(seen) {
                self.cache.set(&key, found, self.ttl).await;
            } else {
                debug!("Stock changed during read of product {product_id}, not caching");
            }
        }

        Ok(product)
    }

    async fn update_stock(
        &self,
        product_id: i32,
        quantity: i32,
    ) -> Result<Option<ProductModel>, RepositoryError> {
        let result = self.inner.update_stock(product_id, quantity).await;
        self.evict(product_id).await;
        result
    }

    async fn decrease_stock(
        &self,
        product_id: i32,
        quantity: i32,
    ) -> Result<Option<ProductModel>, RepositoryError> {
        let result = self.inner.decrease_stock(product_id, quantity).await;
        self.evict(product_id).await;
        result
    }

    async fn increase_stock(
        &self,
        product_id: i32,
        quantity: i32,
    ) -> Result<Option<ProductModel>, RepositoryError> {
        let result = self.inner.increase_stock(product_id, quantity).await;
        self.evict(product_id).await;
        result
    }
}
