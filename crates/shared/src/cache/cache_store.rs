use deadpool_redis::{Connection, Pool};
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{debug, error};

/// JSON values in Redis under a fixed namespace. Every failure degrades to a
/// cache miss; callers always have the database to fall back on.
#[derive(Clone)]
pub struct CacheStore {
    pool: Pool,
    namespace: String,
}

impl CacheStore {
    pub fn new(pool: Pool, namespace: impl Into<String>) -> Self {
        Self {
            pool,
            namespace: namespace.into(),
        }
    }

    fn key(&self, key: &str) -> String {
        format!("{}:{key}", self.namespace)
    }

    async fn get_conn(&self) -> Option<Connection> {
        match self.pool.get().await {
            Ok(conn) => Some(conn),
            Err(e) => {
                error!("Failed to get Redis pooled connection: {:?}", e);
                None
            }
        }
    }

    pub async fn get<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        let key = self.key(key);
        let mut conn = self.get_conn().await?;

        let result: redis::RedisResult<Option<String>> =
            redis::cmd("GET").arg(&key).query_async(&mut conn).await;

        match result {
            Ok(Some(data)) => serde_json::from_str::<T>(&data)
                .inspect_err(|e| error!("Failed to deserialize cached value for '{key}': {e}"))
                .ok(),
            Ok(None) => {
                debug!("Cache miss for key: {key}");
                None
            }
            Err(e) => {
                error!("Redis GET failed for '{key}': {e}");
                None
            }
        }
    }

    pub async fn set<T>(&self, key: &str, data: &T, ttl: Duration)
    where
        T: Serialize,
    {
        let key = self.key(key);
        let json = match serde_json::to_string(data) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize value for '{key}': {e}");
                return;
            }
        };

        let Some(mut conn) = self.get_conn().await else {
            return;
        };

        let result: redis::RedisResult<()> = redis::cmd("SET")
            .arg(&key)
            .arg(&json)
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .query_async(&mut conn)
            .await;

        match result {
            Ok(()) => debug!("Cached '{key}' for {}s", ttl.as_secs()),
            Err(e) => error!("Redis SET failed for '{key}': {e}"),
        }
    }

    pub async fn delete(&self, key: &str) {
        let key = self.key(key);
        if let Some(mut conn) = self.get_conn().await
            && let Err(e) = redis::cmd("DEL")
                .arg(&key)
                .query_async::<()>(&mut conn)
                .await
        {
            error!("Redis DEL failed for '{key}': {e}");
        }
    }
}
