use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use super::error::CacheError;

/// Key/value cache service with per-entry TTL.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fresh value for `key`, or `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;
}

const SHARDS: usize = 16;

struct Entry {
    value: String,
    stored_at: Instant,
    ttl: Duration,
}

impl Entry {
    fn is_fresh(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) <= self.ttl
    }
}

type Shard = RwLock<HashMap<String, Entry>>;

/// Process-local cache split into independently locked shards.
///
/// Expired entries are not swept; they read as absent and are replaced by the
/// next write.
#[derive(Clone)]
pub struct InMemoryCacheStore {
    shards: Arc<[Shard]>,
}

impl InMemoryCacheStore {
    /// Create an empty cache.
    pub fn new() -> Self {
        let shards: Vec<Shard> = (0..SHARDS).map(|_| RwLock::new(HashMap::new())).collect();
        InMemoryCacheStore {
            shards: shards.into(),
        }
    }

    fn shard(&self, key: &str) -> &Shard {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        &self.shards[(hasher.finish() as usize) % self.shards.len()]
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> Result<usize, CacheError> {
        let mut total = 0;
        for shard in self.shards.iter() {
            total += shard
                .read()
                .map_err(|_| CacheError::LockPoisoned("len"))?
                .len();
        }
        Ok(total)
    }

    pub fn is_empty(&self) -> Result<bool, CacheError> {
        Ok(self.len()? == 0)
    }
}

impl Default for InMemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let shard = self
            .shard(key)
            .read()
            .map_err(|_| CacheError::LockPoisoned("get"))?;
        let now = Instant::now();
        Ok(shard
            .get(key)
            .filter(|entry| entry.is_fresh(now))
            .map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let mut shard = self
            .shard(key)
            .write()
            .map_err(|_| CacheError::LockPoisoned("set"))?;
        shard.insert(
            key.to_string(),
            Entry {
                value,
                stored_at: Instant::now(),
                ttl,
            },
        );
        Ok(())
    }
}
