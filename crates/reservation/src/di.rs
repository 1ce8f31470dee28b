use crate::{
    abstract_trait::{
        product::{DynProductRepository, DynProductStockService},
        reservation::{
            repository::{DynReservationCommandRepository, DynReservationQueryRepository},
            service::{DynReservationCommandService, DynReservationQueryService},
        },
    },
    config::myconfig::ReservationSettings,
    repository::{
        product::ProductRepository,
        product_cache::CachedProductRepository,
        reservation::{ReservationCommandRepository, ReservationQueryRepository},
    },
    service::{
        product::ProductStockService,
        reservation::{ReservationCommandService, ReservationQueryService},
    },
};
use prometheus_client::registry::Registry;
use shared::{
    cache::CacheStore,
    config::ConnectionPool,
    utils::{DynClock, SystemClock},
};
use std::{fmt, sync::Arc, time::Duration};
use tracing::info;

#[derive(Clone)]
pub struct DependenciesInject {
    pub reservation_query: DynReservationQueryService,
    pub reservation_command: DynReservationCommandService,
    pub product_service: DynProductStockService,
}

impl fmt::Debug for DependenciesInject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependenciesInject")
            .field("reservation_query", &"ReservationQueryService")
            .field("reservation_command", &"ReservationCommandService")
            .field("product_service", &"ProductStockService")
            .finish()
    }
}

#[derive(Clone)]
pub struct DependenciesInjectDeps {
    pub product_repo: DynProductRepository,
    pub reservation_query_repo: DynReservationQueryRepository,
    pub reservation_command_repo: DynReservationCommandRepository,
    pub clock: DynClock,
    pub settings: ReservationSettings,
}

impl DependenciesInjectDeps {
    /// Postgres-backed repositories, with product reads going through Redis
    /// when a cache is given.
    pub fn postgres(
        pool: ConnectionPool,
        cache: Option<CacheStore>,
        cache_ttl: Duration,
        settings: ReservationSettings,
    ) -> Self {
        let product_repo: DynProductRepository = Arc::new(ProductRepository::new(pool.clone()));

        let product_repo: DynProductRepository = match cache {
            Some(cache) => {
                info!("🗄️ Product lookups cached for {}s", cache_ttl.as_secs());
                Arc::new(CachedProductRepository::new(product_repo, cache, cache_ttl))
            }
            None => product_repo,
        };

        Self {
            product_repo,
            reservation_query_repo: Arc::new(ReservationQueryRepository::new(pool.clone())),
            reservation_command_repo: Arc::new(ReservationCommandRepository::new(pool)),
            clock: Arc::new(SystemClock),
            settings,
        }
    }
}

impl DependenciesInject {
    pub fn new(deps: DependenciesInjectDeps, registry: &mut Registry) -> Self {
        let DependenciesInjectDeps {
            product_repo,
            reservation_query_repo,
            reservation_command_repo,
            clock,
            settings,
        } = deps;

        let reservation_query = Arc::new(ReservationQueryService::new(
            reservation_query_repo,
            product_repo.clone(),
            clock.clone(),
            registry,
        )) as DynReservationQueryService;

        let reservation_command = Arc::new(ReservationCommandService::new(
            reservation_command_repo,
            clock,
            settings,
            registry,
        )) as DynReservationCommandService;

        let product_service =
            Arc::new(ProductStockService::new(product_repo, registry)) as DynProductStockService;

        Self {
            reservation_query,
            reservation_command,
            product_service,
        }
    }
}
