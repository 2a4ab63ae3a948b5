//! 进程级定位会话
//!
//! 会话是 [`LocationSessionState`] 唯一的修改者。一次解析严格按
//! 权限 → 设备定位 → 逆地理编码 → 写缓存 → 更新状态 的顺序执行，
//! 并发调用共享同一个进行中的解析。每次解析带一个递增的令牌，
//! 令牌过期（被 `clear()` 或更新的解析取代）的结果直接丢弃。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;

use super::distance::distance;
use super::geocode::{ReverseGeocoder, fallback_address};
use super::permission::{PermissionGate, PermissionProvider, PermissionStatus};
use super::position::PositionProvider;
use super::{Coordinate, ResolvedLocation};
use crate::cache::LocationCache;
use crate::error::LocationError;
use crate::utils::Clock;

const PERMISSION_DENIED_MESSAGE: &str = "location permission denied";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LocationSessionState {
    pub current: Option<ResolvedLocation>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub initialized: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResolutionKind {
    /// 先读缓存，未命中再走设备
    Initialize,
    /// 清缓存后走设备
    Refresh,
}

struct InFlight {
    token: u64,
    kind: ResolutionKind,
    future: Shared<BoxFuture<'static, ()>>,
}

struct SessionInner {
    gate: PermissionGate,
    position: Arc<dyn PositionProvider>,
    geocoder: Arc<dyn ReverseGeocoder>,
    cache: LocationCache,
    clock: Arc<dyn Clock>,
    state: RwLock<LocationSessionState>,
    latest_token: AtomicU64,
    in_flight: Mutex<Option<InFlight>>,
    // 串行化缓存写入与 clear()，避免过期结果写回缓存
    cache_guard: tokio::sync::Mutex<()>,
}

#[derive(Clone)]
pub struct LocationSession {
    inner: Arc<SessionInner>,
}

impl LocationSession {
    pub fn new(
        permission: Arc<dyn PermissionProvider>,
        position: Arc<dyn PositionProvider>,
        geocoder: Arc<dyn ReverseGeocoder>,
        cache: LocationCache,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                gate: PermissionGate::new(permission),
                position,
                geocoder,
                cache,
                clock,
                state: RwLock::new(LocationSessionState::default()),
                latest_token: AtomicU64::new(0),
                in_flight: Mutex::new(None),
                cache_guard: tokio::sync::Mutex::new(()),
            }),
        }
    }

    /// 只执行一次：命中缓存直接采用，否则走完整定位
    pub async fn initialize(&self) {
        if self.state().initialized {
            return;
        }
        self.join_or_start(ResolutionKind::Initialize).await;
    }

    /// 强制重新定位
    pub async fn refresh(&self) {
        self.join_or_start(ResolutionKind::Refresh).await;
    }

    /// 清除缓存并重置为未初始化，进行中的解析结果将被丢弃
    pub async fn clear(&self) {
        let _guard = self.inner.cache_guard.lock().await;
        {
            let mut state = self.inner.write_state();
            self.inner.latest_token.fetch_add(1, Ordering::SeqCst);
            *state = LocationSessionState::default();
        }
        if let Ok(mut slot) = self.inner.in_flight.lock() {
            *slot = None;
        }
        self.inner.cache.clear().await;
        tracing::info!("Location session cleared");
    }

    pub fn state(&self) -> LocationSessionState {
        self.inner.read_state().clone()
    }

    pub fn current(&self) -> Option<ResolvedLocation> {
        self.inner.read_state().current.clone()
    }

    /// 有定位且没有错误
    pub fn has_valid_location(&self) -> bool {
        let state = self.inner.read_state();
        state.current.is_some() && state.error.is_none()
    }

    /// 到目标点的距离（公里），没有当前位置时返回 None
    pub fn distance_to(&self, target: Coordinate) -> Option<f64> {
        let state = self.inner.read_state();
        state
            .current
            .as_ref()
            .map(|current| distance(current.coordinate, target))
    }

    pub async fn permission_status(&self) -> PermissionStatus {
        self.inner.gate.status().await
    }

    fn join_or_start(&self, kind: ResolutionKind) -> Shared<BoxFuture<'static, ()>> {
        let mut slot = match self.inner.in_flight.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(flight) = slot.as_ref() {
            // 刷新不能搭初始化的车：初始化可能只读了缓存
            if kind == ResolutionKind::Initialize || flight.kind == ResolutionKind::Refresh {
                tracing::debug!("Joining in-flight location resolution #{}", flight.token);
                return flight.future.clone();
            }
        }

        let token = self.inner.latest_token.fetch_add(1, Ordering::SeqCst) + 1;
        let inner = Arc::clone(&self.inner);
        let future = async move {
            inner.run(kind, token).await;
            inner.finish(token);
        }
        .boxed()
        .shared();

        *slot = Some(InFlight {
            token,
            kind,
            future: future.clone(),
        });
        future
    }
}

impl SessionInner {
    async fn run(&self, kind: ResolutionKind, token: u64) {
        if kind == ResolutionKind::Initialize {
            if self.read_state().initialized {
                return;
            }
            if let Some(cached) = self.cache.load().await {
                tracing::info!("Using cached location: {}", cached.address);
                self.apply(token, |state| {
                    state.current = Some(cached);
                    state.error = None;
                    state.is_loading = false;
                    state.initialized = true;
                });
                return;
            }
        }
        self.resolve(token).await;
    }

    async fn resolve(&self, token: u64) {
        {
            let _guard = self.cache_guard.lock().await;
            if !self.is_latest(token) {
                tracing::debug!("Skipping superseded location resolution #{}", token);
                return;
            }
            self.cache.clear().await;
        }
        let started = self.apply(token, |state| {
            state.is_loading = true;
            state.error = None;
        });
        if !started {
            return;
        }

        match self.fetch().await {
            Ok(location) => {
                let _guard = self.cache_guard.lock().await;
                if !self.is_latest(token) {
                    tracing::debug!("Discarding stale location resolution #{}", token);
                    return;
                }
                self.cache.save(&location).await;
                tracing::info!("Location resolved: {}", location.address);
                self.apply(token, |state| {
                    state.current = Some(location);
                    state.error = None;
                    state.is_loading = false;
                    state.initialized = true;
                });
            }
            Err(e) => {
                tracing::warn!("Failed to resolve location: {}", e);
                self.apply(token, |state| {
                    state.error = Some(e.to_string());
                    state.is_loading = false;
                    state.initialized = true;
                });
            }
        }
    }

    async fn fetch(&self) -> Result<ResolvedLocation, LocationError> {
        if !self.gate.resolve().await {
            let message = self
                .gate
                .last_error()
                .unwrap_or_else(|| PERMISSION_DENIED_MESSAGE.to_string());
            return Err(LocationError::PermissionDenied(message));
        }

        let coordinate = self.position.get_position().await.map_err(|e| {
            tracing::warn!("Device position failed: {}", e);
            LocationError::from(e)
        })?;

        let address = match self.geocoder.reverse_geocode(coordinate).await {
            Ok(address) => address,
            Err(e) => {
                let err = LocationError::GeocodeFailed(e);
                tracing::warn!("{}, using coordinates as address", err);
                fallback_address(coordinate)
            }
        };

        Ok(ResolvedLocation {
            coordinate,
            address,
            resolved_at_epoch_millis: self.clock.now_millis(),
        })
    }

    /// 令牌仍是最新时才修改状态
    fn apply(&self, token: u64, update: impl FnOnce(&mut LocationSessionState)) -> bool {
        let mut state = self.write_state();
        if !self.is_latest(token) {
            tracing::debug!("Ignoring state update from superseded resolution #{}", token);
            return false;
        }
        update(&mut state);
        true
    }

    fn finish(&self, token: u64) {
        if let Ok(mut slot) = self.in_flight.lock() {
            if slot.as_ref().is_some_and(|flight| flight.token == token) {
                *slot = None;
            }
        }
    }

    fn is_latest(&self, token: u64) -> bool {
        self.latest_token.load(Ordering::SeqCst) == token
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, LocationSessionState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, LocationSessionState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
