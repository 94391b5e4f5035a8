use async_trait::async_trait;
use moka::future::Cache;
use std::time::Duration;
use tracing::debug;

use super::{CacheResult, ObjectCache};
use crate::config::CacheConfig;

pub struct MokaCache {
    inner: Cache<String, String>,
}

impl MokaCache {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();

        debug!("MokaCache initialized with max capacity: {}", max_capacity);
        Self { inner }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(
            config.memory.max_capacity,
            Duration::from_secs(config.default_ttl),
        )
    }
}

#[async_trait]
impl ObjectCache for MokaCache {
    async fn get_raw(&self, key: &str) -> CacheResult<String> {
        match self.inner.get(key).await {
            Some(value) => CacheResult::Found(value),
            None => CacheResult::NotFound,
        }
    }

    // TTL 使用构建时的全局策略
    async fn insert_raw(&self, key: String, value: String) {
        self.inner.insert(key, value).await;
    }

    async fn remove(&self, key: &str) {
        self.inner.invalidate(key).await;
    }

    async fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}
