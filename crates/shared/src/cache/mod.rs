mod cache_store;

pub use self::cache_store::CacheStore;
