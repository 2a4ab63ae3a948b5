use std::sync::RwLock;

use futures_util::future::{BoxFuture, FutureExt};

use super::Coordinate;
use crate::error::PositionError;

/// 设备定位接口
pub trait PositionProvider: Send + Sync {
    fn get_position(&self) -> BoxFuture<'_, Result<Coordinate, PositionError>>;
}

/// 固定坐标，开发环境的虚拟定位
#[derive(Debug, Clone, Copy)]
pub struct FixedPositionProvider {
    coordinate: Coordinate,
}

impl FixedPositionProvider {
    pub fn new(coordinate: Coordinate) -> Self {
        Self { coordinate }
    }
}

impl PositionProvider for FixedPositionProvider {
    fn get_position(&self) -> BoxFuture<'_, Result<Coordinate, PositionError>> {
        let coordinate = self.coordinate;
        async move {
            tracing::debug!(
                "Using mock position: {}, {}",
                coordinate.latitude(),
                coordinate.longitude()
            );
            Ok(coordinate)
        }
        .boxed()
    }
}

/// 由小程序端上报的最新坐标
#[derive(Debug, Default)]
pub struct ReportedPositionProvider {
    latest: RwLock<Option<Coordinate>>,
}

impl ReportedPositionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&self, coordinate: Coordinate) {
        let mut latest = self
            .latest
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *latest = Some(coordinate);
    }

    pub fn latest(&self) -> Option<Coordinate> {
        *self
            .latest
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PositionProvider for ReportedPositionProvider {
    fn get_position(&self) -> BoxFuture<'_, Result<Coordinate, PositionError>> {
        let latest = self.latest();
        async move {
            latest.ok_or_else(|| PositionError::Unavailable("no position reported yet".into()))
        }
        .boxed()
    }
}
