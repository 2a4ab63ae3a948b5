use serde::{Deserialize, Serialize};

use crate::error::LocationError;
use crate::location::{Coordinate, ResolvedLocation};

/// 定位缓存数据模型
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CachedLocationRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub timestamp: i64, // Unix timestamp (ms)
}

impl From<&ResolvedLocation> for CachedLocationRecord {
    fn from(location: &ResolvedLocation) -> Self {
        Self {
            latitude: location.coordinate.latitude(),
            longitude: location.coordinate.longitude(),
            address: location.address.clone(),
            timestamp: location.resolved_at_epoch_millis,
        }
    }
}

impl TryFrom<CachedLocationRecord> for ResolvedLocation {
    type Error = LocationError;

    fn try_from(cached: CachedLocationRecord) -> Result<Self, Self::Error> {
        let coordinate = Coordinate::new(cached.latitude, cached.longitude)
            .map_err(|e| LocationError::CacheCorrupt(e.to_string()))?;
        Ok(Self {
            coordinate,
            address: cached.address,
            resolved_at_epoch_millis: cached.timestamp,
        })
    }
}
