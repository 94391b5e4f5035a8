//! 进程内对象缓存

pub mod moka;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

pub use self::moka::MokaCache;

/// 缓存查询结果
#[derive(Debug, Clone, PartialEq)]
pub enum CacheResult<T> {
    Found(T),
    NotFound,
}

#[async_trait]
pub trait ObjectCache: Send + Sync {
    async fn get_raw(&self, key: &str) -> CacheResult<String>;
    async fn insert_raw(&self, key: String, value: String);
    async fn remove(&self, key: &str);
    async fn invalidate_all(&self);
}

/// JSON 序列化的便捷读写
pub async fn get_json<T: DeserializeOwned>(cache: &dyn ObjectCache, key: &str) -> Option<T> {
    match cache.get_raw(key).await {
        CacheResult::Found(json) => match serde_json::from_str(&json) {
            Ok(value) => Some(value),
            Err(_) => {
                cache.remove(key).await;
                None
            }
        },
        CacheResult::NotFound => None,
    }
}

pub async fn insert_json<T: Serialize + Sync>(cache: &dyn ObjectCache, key: String, value: &T) {
    if let Ok(json) = serde_json::to_string(value) {
        cache.insert_raw(key, json).await;
    }
}

/// 用户缓存键
pub fn user_cache_key(user_id: i64) -> String {
    format!("user:{user_id}")
}
