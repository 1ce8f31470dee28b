#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reservation::{
    abstract_trait::{
        product::{DynProductStockService, ProductRepositoryTrait},
        reservation::{
            repository::{
                ReservationCommandRepositoryTrait, ReservationQueryRepositoryTrait,
                ReserveCommand, ReserveOutcome,
            },
            service::{DynReservationCommandService, DynReservationQueryService},
        },
    },
    config::myconfig::ReservationSettings,
    di::DependenciesInjectDeps,
    domain::availability::Availability,
    model::{
        product::{ProduceStatus, Product},
        reservation::{Reservation, ReservationStatus},
    },
    state::AppState,
};
use shared::{
    abstract_trait::{DynJwtService, JwtServiceTrait},
    config::JwtConfig,
    errors::RepositoryError,
    utils::{Clock, FixedClock},
};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;

pub const JWT_SECRET: &str = "test-secret";

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
        .single()
        .expect("valid start time")
}

#[derive(Default)]
struct Store {
    products: HashMap<i32, Product>,
    reservations: Vec<Reservation>,
    next_product_id: i32,
    next_reservation_id: i32,
}

/// Postgres stand-in. One lock over the whole store gives the same
/// per-product serialization the row lock gives in SQL.
#[derive(Clone, Default)]
pub struct InMemoryDb {
    store: Arc<Mutex<Store>>,
}

impl InMemoryDb {
    pub async fn insert_product(&self, farmer_id: i32, quantity: i32, now: DateTime<Utc>) -> i32 {
        let mut store = self.store.lock().await;
        store.next_product_id += 1;
        let product_id = store.next_product_id;

        store.products.insert(
            product_id,
            Product {
                product_id,
                farmer_id,
                name: format!("produce-{product_id}"),
                unit: "kg".to_string(),
                quantity,
                status: ProduceStatus::for_quantity(quantity),
                created_at: now,
                updated_at: now,
            },
        );

        product_id
    }

    pub async fn product(&self, product_id: i32) -> Option<Product> {
        self.store.lock().await.products.get(&product_id).cloned()
    }

    pub async fn reservations_of(&self, user_id: i32, product_id: i32) -> Vec<Reservation> {
        self.store
            .lock()
            .await
            .reservations
            .iter()
            .filter(|r| r.user_id == user_id && r.product_id == product_id)
            .cloned()
            .collect()
    }

    pub async fn all_reservations(&self) -> Vec<Reservation> {
        self.store.lock().await.reservations.clone()
    }

    fn update_product<F>(store: &mut Store, product_id: i32, now: DateTime<Utc>, f: F) -> Option<Product>
    where
        F: FnOnce(&mut Product),
    {
        let product = store.products.get_mut(&product_id)?;
        f(product);
        product.updated_at = now;
        Some(product.clone())
    }
}

#[async_trait]
impl ProductRepositoryTrait for InMemoryDb {
    async fn find_by_id(&self, product_id: i32) -> Result<Option<Product>, RepositoryError> {
        Ok(self.product(product_id).await)
    }

    async fn update_stock(
        &self,
        product_id: i32,
        quantity: i32,
    ) -> Result<Option<Product>, RepositoryError> {
        let mut store = self.store.lock().await;
        Ok(Self::update_product(&mut store, product_id, Utc::now(), |p| {
            p.quantity = quantity;
            p.status = ProduceStatus::for_quantity(quantity);
        }))
    }

    async fn decrease_stock(
        &self,
        product_id: i32,
        quantity: i32,
    ) -> Result<Option<Product>, RepositoryError> {
        let mut store = self.store.lock().await;
        Ok(Self::update_product(&mut store, product_id, Utc::now(), |p| {
            p.quantity = (p.quantity - quantity).max(0);
            if p.quantity == 0 {
                p.status = ProduceStatus::Sold;
            }
        }))
    }

    async fn increase_stock(
        &self,
        product_id: i32,
        quantity: i32,
    ) -> Result<Option<Product>, RepositoryError> {
        let mut store = self.store.lock().await;
        Ok(Self::update_product(&mut store, product_id, Utc::now(), |p| {
            p.quantity += quantity;
            if p.status == ProduceStatus::Sold && p.quantity > 0 {
                p.status = ProduceStatus::Available;
            }
        }))
    }
}

#[async_trait]
impl ReservationQueryRepositoryTrait for InMemoryDb {
    async fn sum_live_quantity(
        &self,
        product_id: i32,
        exclude_user: Option<i32>,
        now: DateTime<Utc>,
    ) -> Result<i64, RepositoryError> {
        let store = self.store.lock().await;
        Ok(store
            .reservations
            .iter()
            .filter(|r| r.product_id == product_id && r.is_live_at(now))
            .filter(|r| exclude_user != Some(r.user_id))
            .map(|r| i64::from(r.quantity))
            .sum())
    }

    async fn find_live(
        &self,
        user_id: i32,
        product_id: i32,
        now: DateTime<Utc>,
    ) -> Result<Option<Reservation>, RepositoryError> {
        let store = self.store.lock().await;
        Ok(store
            .reservations
            .iter()
            .find(|r| r.user_id == user_id && r.product_id == product_id && r.is_live_at(now))
            .cloned())
    }

    async fn find_live_by_user(
        &self,
        user_id: i32,
        now: DateTime<Utc>,
    ) -> Result<Vec<Reservation>, RepositoryError> {
        let store = self.store.lock().await;
        Ok(store
            .reservations
            .iter()
            .filter(|r| r.user_id == user_id && r.is_live_at(now))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ReservationCommandRepositoryTrait for InMemoryDb {
    async fn reserve(&self, cmd: &ReserveCommand) -> Result<ReserveOutcome, RepositoryError> {
        let mut store = self.store.lock().await;

        let Some(total_stock) = store.products.get(&cmd.product_id).map(|p| p.quantity) else {
            return Ok(ReserveOutcome::ProductMissing);
        };

        for r in store.reservations.iter_mut().filter(|r| {
            r.user_id == cmd.user_id && r.product_id == cmd.product_id && r.is_lapsed_at(cmd.now)
        }) {
            r.status = ReservationStatus::Expired;
            r.updated_at = cmd.now;
        }

        let reserved_by_others: i64 = store
            .reservations
            .iter()
            .filter(|r| {
                r.product_id == cmd.product_id && r.user_id != cmd.user_id && r.is_live_at(cmd.now)
            })
            .map(|r| i64::from(r.quantity))
            .sum();

        let existing = store.reservations.iter().position(|r| {
            r.user_id == cmd.user_id
                && r.product_id == cmd.product_id
                && r.status == ReservationStatus::Active
        });

        let own = existing.map(|i| store.reservations[i].quantity).unwrap_or(0);
        let availability = Availability::compute(total_stock, reserved_by_others, own);

        if !availability.admits(cmd.quantity) {
            return Ok(ReserveOutcome::Insufficient {
                max_allowed: availability.max_for_requester(),
            });
        }

        let reservation = match existing {
            Some(i) => {
                let r = &mut store.reservations[i];
                r.quantity = cmd.quantity;
                r.expires_at = cmd.expires_at;
                r.updated_at = cmd.now;
                r.clone()
            }
            None => {
                store.next_reservation_id += 1;
                let r = Reservation {
                    reservation_id: store.next_reservation_id,
                    user_id: cmd.user_id,
                    product_id: cmd.product_id,
                    quantity: cmd.quantity,
                    status: ReservationStatus::Active,
                    expires_at: cmd.expires_at,
                    created_at: cmd.now,
                    updated_at: cmd.now,
                };
                store.reservations.push(r.clone());
                r
            }
        };

        Ok(ReserveOutcome::Reserved(reservation))
    }

    async fn transition_active(
        &self,
        user_id: i32,
        product_id: i32,
        to: ReservationStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<Reservation>, RepositoryError> {
        let mut store = self.store.lock().await;
        Ok(store
            .reservations
            .iter_mut()
            .find(|r| r.user_id == user_id && r.product_id == product_id && r.is_live_at(now))
            .map(|r| {
                r.status = to;
                r.updated_at = now;
                r.clone()
            }))
    }

    async fn expire_lapsed(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let mut store = self.store.lock().await;
        let mut count = 0;
        for r in store
            .reservations
            .iter_mut()
            .filter(|r| r.status == ReservationStatus::Active && r.expires_at < now)
        {
            r.status = ReservationStatus::Expired;
            r.updated_at = now;
            count += 1;
        }
        Ok(count)
    }

    async fn purge_terminal_before(&self, cutoff: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let mut store = self.store.lock().await;
        let before = store.reservations.len();
        store
            .reservations
            .retain(|r| !(r.status.is_terminal() && r.expires_at < cutoff));
        Ok((before - store.reservations.len()) as u64)
    }
}

pub struct Harness {
    pub db: InMemoryDb,
    pub clock: FixedClock,
    pub state: Arc<AppState>,
    pub jwt: JwtConfig,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_settings(ReservationSettings::default())
    }

    pub fn with_settings(settings: ReservationSettings) -> Self {
        let db = InMemoryDb::default();
        let clock = FixedClock::new(start_time());
        let jwt = JwtConfig::new(JWT_SECRET);

        let deps = DependenciesInjectDeps {
            product_repo: Arc::new(db.clone()),
            reservation_query_repo: Arc::new(db.clone()),
            reservation_command_repo: Arc::new(db.clone()),
            clock: Arc::new(clock.clone()),
            settings,
        };

        let state = Arc::new(AppState::from_deps(
            deps,
            Arc::new(jwt.clone()) as DynJwtService,
        ));

        Self {
            db,
            clock,
            state,
            jwt,
        }
    }

    pub fn command(&self) -> DynReservationCommandService {
        self.state.di_container.reservation_command.clone()
    }

    pub fn query(&self) -> DynReservationQueryService {
        self.state.di_container.reservation_query.clone()
    }

    pub fn products(&self) -> DynProductStockService {
        self.state.di_container.product_service.clone()
    }

    pub async fn add_product(&self, farmer_id: i32, quantity: i32) -> i32 {
        self.db
            .insert_product(farmer_id, quantity, self.clock.now())
            .await
    }

    pub fn token(&self, user_id: i64) -> String {
        self.jwt
            .generate_token(user_id, "access")
            .expect("access token")
    }
}
