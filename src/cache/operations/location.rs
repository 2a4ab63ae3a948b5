use std::sync::Arc;
use std::time::Duration;

use crate::cache::keys::USER_LOCATION_KEY;
use crate::cache::models::CachedLocationRecord;
use crate::cache::store::KeyValueStore;
use crate::location::ResolvedLocation;
use crate::utils::Clock;

/// 默认缓存有效期（毫秒）：30分钟
pub const LOCATION_CACHE_TTL_MILLIS: i64 = 30 * 60 * 1000;

/// 定位缓存操作
///
/// 读写失败和记录损坏都按未命中处理，不向上抛错。
pub struct LocationCache {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    ttl_millis: i64,
}

impl LocationCache {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            ttl_millis: LOCATION_CACHE_TTL_MILLIS,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl_millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        self
    }

    /// 读取未过期的定位；过期或损坏的记录会被删除
    pub async fn load(&self) -> Option<ResolvedLocation> {
        let raw = match self.store.get(USER_LOCATION_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!("Location cache miss");
                return None;
            }
            Err(e) => {
                tracing::warn!("Failed to read location cache: {}", e);
                return None;
            }
        };

        let location = serde_json::from_str::<CachedLocationRecord>(&raw)
            .map_err(|e| e.to_string())
            .and_then(|record| ResolvedLocation::try_from(record).map_err(|e| e.to_string()));

        let location = match location {
            Ok(location) => location,
            Err(reason) => {
                tracing::warn!("Discarding corrupt location cache: {}", reason);
                self.clear().await;
                return None;
            }
        };

        // 时间戳溢出或在未来的记录按损坏处理
        let age = match self
            .clock
            .now_millis()
            .checked_sub(location.resolved_at_epoch_millis)
        {
            Some(age) if age >= 0 => age,
            _ => {
                tracing::warn!(
                    "Discarding location cache with invalid timestamp {}",
                    location.resolved_at_epoch_millis
                );
                self.clear().await;
                return None;
            }
        };
        if age > self.ttl_millis {
            tracing::debug!("Location cache expired ({} ms old)", age);
            self.clear().await;
            return None;
        }

        tracing::debug!("Location cache hit: {}", location.address);
        Some(location)
    }

    /// 无条件覆盖
    pub async fn save(&self, location: &ResolvedLocation) {
        let record = CachedLocationRecord::from(location);
        let json = match serde_json::to_string(&record) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("Failed to serialize location cache: {}", e);
                return;
            }
        };

        if let Err(e) = self.store.set(USER_LOCATION_KEY, json).await {
            tracing::warn!("Failed to write location cache: {}", e);
        }
    }

    pub async fn clear(&self) {
        if let Err(e) = self.store.remove(USER_LOCATION_KEY).await {
            tracing::warn!("Failed to clear location cache: {}", e);
        }
    }
}
