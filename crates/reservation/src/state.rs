use crate::{
    config::myconfig::Config,
    di::{DependenciesInject, DependenciesInjectDeps},
};
use anyhow::{Context, Result};
use prometheus_client::registry::Registry;
use shared::{
    abstract_trait::DynJwtService,
    cache::CacheStore,
    config::{ConnectionPool, JwtConfig, RedisClient},
    utils::SystemMetrics,
};
use std::{fmt, sync::Arc};
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub di_container: DependenciesInject,
    pub jwt_config: DynJwtService,
    pub registry: Arc<Mutex<Registry>>,
    pub system_metrics: Arc<SystemMetrics>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("di_container", &self.di_container)
            .field("system_metrics", &self.system_metrics)
            .finish()
    }
}

impl AppState {
    pub async fn new(config: &Config, pool: ConnectionPool) -> Result<Self> {
        let cache = match &config.redis_url {
            Some(url) => connect_cache(url).await,
            None => {
                info!("REDIS_URL not set, product cache disabled");
                None
            }
        };

        let deps = DependenciesInjectDeps::postgres(
            pool,
            cache,
            config.product_cache_ttl,
            config.reservation.clone(),
        );

        let jwt_config = Arc::new(JwtConfig::new(&config.jwt_secret)) as DynJwtService;

        Ok(Self::from_deps(deps, jwt_config))
    }

    /// Wires services over any repository implementations.
    pub fn from_deps(deps: DependenciesInjectDeps, jwt_config: DynJwtService) -> Self {
        let mut registry = Registry::default();
        let system_metrics = Arc::new(SystemMetrics::new());

        let di_container = DependenciesInject::new(deps, &mut registry);
        system_metrics.register(&mut registry);

        Self {
            di_container,
            jwt_config,
            registry: Arc::new(Mutex::new(registry)),
            system_metrics,
        }
    }
}

async fn connect_cache(url: &str) -> Option<CacheStore> {
    let redis = match RedisClient::new(url).context("Failed to configure Redis") {
        Ok(redis) => redis,
        Err(e) => {
            warn!("⚠️ {e:#}; product cache disabled");
            return None;
        }
    };

    if let Err(e) = redis.ping().await {
        warn!("⚠️ Redis unreachable ({e:#}); product cache disabled");
        return None;
    }

    Some(CacheStore::new(redis.pool, "reservation"))
}
