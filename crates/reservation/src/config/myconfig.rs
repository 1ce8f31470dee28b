use anyhow::{Context, Result, anyhow};
use std::{str::FromStr, time::Duration as StdDuration};
use thiserror::Error;

/// What checkout does to the buyer's hold once the order is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionPolicy {
    #[default]
    Complete,
    Expire,
}

#[derive(Debug, Error)]
#[error("RESERVATION_COMPLETION_POLICY must be 'complete' or 'expire', got '{0}'")]
pub struct InvalidCompletionPolicy(String);

impl FromStr for CompletionPolicy {
    type Err = InvalidCompletionPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "complete" => Ok(CompletionPolicy::Complete),
            "expire" => Ok(CompletionPolicy::Expire),
            other => Err(InvalidCompletionPolicy(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReservationSettings {
    pub hold_duration: chrono::Duration,
    pub retention: chrono::Duration,
    pub sweep_interval: StdDuration,
    pub completion_policy: CompletionPolicy,
}

impl Default for ReservationSettings {
    fn default() -> Self {
        Self {
            hold_duration: chrono::Duration::hours(24),
            retention: chrono::Duration::hours(168),
            sweep_interval: StdDuration::from_secs(60),
            completion_policy: CompletionPolicy::Complete,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub run_migrations: bool,
    pub port: u16,
    pub db_min_conn: u32,
    pub db_max_conn: u32,
    pub redis_url: Option<String>,
    pub kafka_broker: Option<String>,
    pub otel_endpoint: Option<String>,
    pub product_cache_ttl: StdDuration,
    pub reservation: ReservationSettings,
}

impl Config {
    pub fn init() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key).ok_or_else(|| anyhow!("Missing environment variable: {key}"))
        };
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;

        let run_migrations = match optional("RUN_MIGRATIONS").as_deref() {
            None | Some("true") => true,
            Some("false") => false,
            Some(other) => {
                return Err(anyhow!(
                    "RUN_MIGRATIONS must be 'true' or 'false', got '{}'",
                    other
                ));
            }
        };

        let port = parse_or(optional("PORT"), 8080u16)
            .context("PORT must be a valid u16 integer")?;
        let db_min_conn = parse_or(optional("DB_MIN_CONN"), 2u32)
            .context("DB_MIN_CONN must be a valid integer")?;
        let db_max_conn = parse_or(optional("DB_MAX_CONN"), 10u32)
            .context("DB_MAX_CONN must be a valid integer")?;

        if db_min_conn > db_max_conn {
            return Err(anyhow!(
                "DB_MIN_CONN ({db_min_conn}) must not exceed DB_MAX_CONN ({db_max_conn})"
            ));
        }

        let hold_hours = parse_or(optional("RESERVATION_HOLD_HOURS"), 24i64)
            .context("RESERVATION_HOLD_HOURS must be a valid integer")?;
        let retention_hours = parse_or(optional("RESERVATION_RETENTION_HOURS"), 168i64)
            .context("RESERVATION_RETENTION_HOURS must be a valid integer")?;
        let sweep_secs = parse_or(optional("RESERVATION_SWEEP_INTERVAL_SECS"), 60u64)
            .context("RESERVATION_SWEEP_INTERVAL_SECS must be a valid integer")?;
        let cache_ttl_secs = parse_or(optional("PRODUCT_CACHE_TTL_SECS"), 30u64)
            .context("PRODUCT_CACHE_TTL_SECS must be a valid integer")?;

        if hold_hours <= 0 {
            return Err(anyhow!("RESERVATION_HOLD_HOURS must be positive"));
        }
        if retention_hours < 0 {
            return Err(anyhow!("RESERVATION_RETENTION_HOURS must not be negative"));
        }
        if sweep_secs == 0 {
            return Err(anyhow!("RESERVATION_SWEEP_INTERVAL_SECS must be positive"));
        }

        let completion_policy = match optional("RESERVATION_COMPLETION_POLICY") {
            Some(raw) => raw.parse::<CompletionPolicy>()?,
            None => CompletionPolicy::default(),
        };

        Ok(Self {
            database_url,
            jwt_secret,
            run_migrations,
            port,
            db_min_conn,
            db_max_conn,
            redis_url: optional("REDIS_URL"),
            kafka_broker: optional("KAFKA"),
            otel_endpoint: optional("OTEL_ENDPOINT"),
            product_cache_ttl: StdDuration::from_secs(cache_ttl_secs),
            reservation: ReservationSettings {
                hold_duration: chrono::Duration::hours(hold_hours),
                retention: chrono::Duration::hours(retention_hours),
                sweep_interval: StdDuration::from_secs(sweep_secs),
                completion_policy,
            },
        })
    }
}

fn parse_or<T>(raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) => Ok(value.trim().parse::<T>()?),
        None => Ok(default),
    }
}
