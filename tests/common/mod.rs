//! 集成测试共用的假设备接口
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt};
use geotrack::cache::{KeyValueStore, LocationCache, MemoryStore};
use geotrack::error::{GeocodeError, PermissionError, PositionError, StoreError};
use geotrack::location::{
    Coordinate, LocationSession, PermissionProvider, PermissionState, PositionProvider,
    ReverseGeocoder,
};
use geotrack::utils::ManualClock;
use tokio::sync::Notify;

pub const START_MILLIS: i64 = 1_750_000_000_000;

pub fn beijing() -> Coordinate {
    Coordinate::new(39.9042, 116.4074).unwrap()
}

pub struct FakePermission {
    pub state: PermissionState,
    pub grant_on_request: bool,
}

impl FakePermission {
    pub fn granted() -> Arc<Self> {
        Arc::new(Self {
            state: PermissionState::Granted,
            grant_on_request: true,
        })
    }

    pub fn denied() -> Arc<Self> {
        Arc::new(Self {
            state: PermissionState::Denied,
            grant_on_request: false,
        })
    }
}

impl PermissionProvider for FakePermission {
    fn query(&self) -> BoxFuture<'_, Result<PermissionState, PermissionError>> {
        let state = self.state;
        async move { Ok(state) }.boxed()
    }

    fn request(&self) -> BoxFuture<'_, Result<bool, PermissionError>> {
        let granted = self.grant_on_request;
        async move { Ok(granted) }.boxed()
    }

    fn confirm_open_settings(&self) -> BoxFuture<'_, bool> {
        async { false }.boxed()
    }

    fn open_settings(&self) -> BoxFuture<'_, Result<(), PermissionError>> {
        async { Ok(()) }.boxed()
    }
}

/// 计数的设备定位，可选延迟或让第一次调用等待放行
pub struct FakePosition {
    pub coordinate: Option<Coordinate>,
    pub calls: AtomicUsize,
    pub delay: Duration,
    pub gate: Option<Arc<Notify>>,
}

impl FakePosition {
    pub fn at(coordinate: Coordinate) -> Arc<Self> {
        Arc::new(Self {
            coordinate: Some(coordinate),
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
            gate: None,
        })
    }

    pub fn slow(coordinate: Coordinate, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            coordinate: Some(coordinate),
            calls: AtomicUsize::new(0),
            delay,
            gate: None,
        })
    }

    pub fn gated(coordinate: Coordinate, gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            coordinate: Some(coordinate),
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
            gate: Some(gate),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            coordinate: None,
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
            gate: None,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PositionProvider for FakePosition {
    fn get_position(&self) -> BoxFuture<'_, Result<Coordinate, PositionError>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        async move {
            // 只有第一次调用等待放行
            if let Some(gate) = self.gate.as_ref().filter(|_| call == 0) {
                gate.notified().await;
            }
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.coordinate.ok_or(PositionError::Timeout)
        }
        .boxed()
    }
}

pub struct FakeGeocoder {
    pub address: Option<String>,
    pub calls: AtomicUsize,
}

impl FakeGeocoder {
    pub fn returning(address: &str) -> Arc<Self> {
        Arc::new(Self {
            address: Some(address.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            address: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ReverseGeocoder for FakeGeocoder {
    fn reverse_geocode(&self, _coordinate: Coordinate) -> BoxFuture<'_, Result<String, GeocodeError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = self.address.clone().ok_or_else(|| GeocodeError::Status {
            status: 311,
            message: "key format error".into(),
        });
        async move { result }.boxed()
    }
}

pub struct Harness {
    pub session: LocationSession,
    pub store: Arc<MemoryStore>,
    pub clock: ManualClock,
}

pub fn harness(
    permission: Arc<dyn PermissionProvider>,
    position: Arc<dyn PositionProvider>,
    geocoder: Arc<dyn ReverseGeocoder>,
) -> Harness {
    build_harness(permission, position, geocoder, None)
}

/// 会话第一次读缓存时先读到当时的值，等放行后才返回
pub fn harness_with_slow_first_read(
    permission: Arc<dyn PermissionProvider>,
    position: Arc<dyn PositionProvider>,
    geocoder: Arc<dyn ReverseGeocoder>,
    gate: Arc<Notify>,
) -> Harness {
    build_harness(permission, position, geocoder, Some(gate))
}

fn build_harness(
    permission: Arc<dyn PermissionProvider>,
    position: Arc<dyn PositionProvider>,
    geocoder: Arc<dyn ReverseGeocoder>,
    gate: Option<Arc<Notify>>,
) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let session_store: Arc<dyn KeyValueStore> = match gate {
        Some(gate) => Arc::new(SlowFirstReadStore {
            inner: store.clone(),
            gate,
            reads: AtomicUsize::new(0),
        }),
        None => store.clone(),
    };
    let clock = ManualClock::new(START_MILLIS);
    let cache = LocationCache::new(session_store, Arc::new(clock.clone()));
    let session = LocationSession::new(permission, position, geocoder, cache, Arc::new(clock.clone()));
    Harness {
        session,
        store,
        clock,
    }
}

struct SlowFirstReadStore {
    inner: Arc<MemoryStore>,
    gate: Arc<Notify>,
    reads: AtomicUsize,
}

impl KeyValueStore for SlowFirstReadStore {
    fn get(&self, key: &str) -> BoxFuture<'_, Result<Option<String>, StoreError>> {
        let read = self.reads.fetch_add(1, Ordering::SeqCst);
        let key = key.to_string();
        async move {
            let value = self.inner.get(&key).await;
            if read == 0 {
                self.gate.notified().await;
            }
            value
        }
        .boxed()
    }

    fn set(&self, key: &str, value: String) -> BoxFuture<'_, Result<(), StoreError>> {
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> BoxFuture<'_, Result<(), StoreError>> {
        self.inner.remove(key)
    }
}
