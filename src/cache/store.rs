use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures_util::future::{BoxFuture, FutureExt};
use redis::{AsyncCommands, Client as RedisClient};

use crate::error::StoreError;

/// 键值存储接口
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> BoxFuture<'_, Result<Option<String>, StoreError>>;

    fn set(&self, key: &str, value: String) -> BoxFuture<'_, Result<(), StoreError>>;

    fn remove(&self, key: &str) -> BoxFuture<'_, Result<(), StoreError>>;
}

/// 进程内存储
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_entries<T>(
        &self,
        f: impl FnOnce(&mut HashMap<String, String>) -> T,
    ) -> Result<T, StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))?;
        Ok(f(&mut entries))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> BoxFuture<'_, Result<Option<String>, StoreError>> {
        let result = self.with_entries(|entries| entries.get(key).cloned());
        async move { result }.boxed()
    }

    fn set(&self, key: &str, value: String) -> BoxFuture<'_, Result<(), StoreError>> {
        let result = self.with_entries(|entries| {
            entries.insert(key.to_string(), value);
        });
        async move { result }.boxed()
    }

    fn remove(&self, key: &str) -> BoxFuture<'_, Result<(), StoreError>> {
        let result = self.with_entries(|entries| {
            entries.remove(key);
        });
        async move { result }.boxed()
    }
}

/// Redis 存储
pub struct RedisStore {
    redis_client: Arc<RedisClient>,
}

impl RedisStore {
    pub fn new(redis_client: Arc<RedisClient>) -> Self {
        Self { redis_client }
    }
}

impl KeyValueStore for RedisStore {
    fn get(&self, key: &str) -> BoxFuture<'_, Result<Option<String>, StoreError>> {
        let key = key.to_string();
        async move {
            let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
            let value: Option<String> = conn.get(&key).await?;
            Ok(value)
        }
        .boxed()
    }

    fn set(&self, key: &str, value: String) -> BoxFuture<'_, Result<(), StoreError>> {
        let key = key.to_string();
        async move {
            let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
            let _: () = conn.set(&key, value).await?;
            Ok(())
        }
        .boxed()
    }

    fn remove(&self, key: &str) -> BoxFuture<'_, Result<(), StoreError>> {
        let key = key.to_string();
        async move {
            let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
            let _: () = conn.del(&key).await?;
            Ok(())
        }
        .boxed()
    }
}
