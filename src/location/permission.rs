use std::sync::{Arc, Mutex};

use futures_util::future::{BoxFuture, FutureExt};
use serde::Serialize;

use crate::error::PermissionError;

const DENIED_MESSAGE: &str = "location permission denied, please enable it in settings";
const CHECK_FAILED_MESSAGE: &str = "unable to read location permission status";

/// 定位权限状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    Unknown,
    Granted,
    Denied,
}

/// 设备权限接口
pub trait PermissionProvider: Send + Sync {
    /// 读取当前授权设置
    fn query(&self) -> BoxFuture<'_, Result<PermissionState, PermissionError>>;

    /// 弹出授权请求
    fn request(&self) -> BoxFuture<'_, Result<bool, PermissionError>>;

    /// 阻塞式对话框，用户确认后返回 true
    fn confirm_open_settings(&self) -> BoxFuture<'_, bool>;

    /// 打开系统设置页，返回时用户已离开设置页
    fn open_settings(&self) -> BoxFuture<'_, Result<(), PermissionError>>;
}

/// 始终授权，用于服务端和虚拟定位
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysGranted;

impl PermissionProvider for AlwaysGranted {
    fn query(&self) -> BoxFuture<'_, Result<PermissionState, PermissionError>> {
        async { Ok(PermissionState::Granted) }.boxed()
    }

    fn request(&self) -> BoxFuture<'_, Result<bool, PermissionError>> {
        async { Ok(true) }.boxed()
    }

    fn confirm_open_settings(&self) -> BoxFuture<'_, bool> {
        async { false }.boxed()
    }

    fn open_settings(&self) -> BoxFuture<'_, Result<(), PermissionError>> {
        async { Ok(()) }.boxed()
    }
}

/// 权限状态及展示文案
#[derive(Debug, Clone, Serialize)]
pub struct PermissionStatus {
    pub state: PermissionState,
    pub message: String,
}

pub struct PermissionGate {
    provider: Arc<dyn PermissionProvider>,
    last_error: Mutex<Option<String>>,
}

impl PermissionGate {
    pub fn new(provider: Arc<dyn PermissionProvider>) -> Self {
        Self {
            provider,
            last_error: Mutex::new(None),
        }
    }

    /// 查询失败一律视为拒绝
    pub async fn check(&self) -> PermissionState {
        match self.provider.query().await {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!("Failed to query location permission: {}", e);
                self.set_error(CHECK_FAILED_MESSAGE);
                PermissionState::Denied
            }
        }
    }

    /// 仅在未决定时弹出授权请求
    pub async fn request(&self) -> bool {
        match self.check().await {
            PermissionState::Granted => true,
            PermissionState::Denied => false,
            PermissionState::Unknown => self.prompt().await,
        }
    }

    /// 组合流程：已授权直接通过，未决定则申请，已拒绝则引导去设置页后重新检查
    pub async fn resolve(&self) -> bool {
        self.clear_error();

        let granted = match self.check().await {
            PermissionState::Granted => true,
            PermissionState::Unknown => self.prompt().await,
            PermissionState::Denied => self.recover_from_settings().await,
        };

        if !granted && self.last_error().is_none() {
            self.set_error(DENIED_MESSAGE);
        }
        granted
    }

    pub async fn status(&self) -> PermissionStatus {
        let (state, message) = match self.provider.query().await {
            Ok(PermissionState::Granted) => {
                (PermissionState::Granted, "location permission granted")
            }
            Ok(PermissionState::Denied) => (PermissionState::Denied, DENIED_MESSAGE),
            Ok(PermissionState::Unknown) => (
                PermissionState::Unknown,
                "location permission has not been requested yet",
            ),
            Err(e) => {
                tracing::warn!("Failed to query location permission: {}", e);
                (PermissionState::Denied, CHECK_FAILED_MESSAGE)
            }
        };
        PermissionStatus {
            state,
            message: message.to_string(),
        }
    }

    /// 最近一次失败的用户可见原因
    pub fn last_error(&self) -> Option<String> {
        self.last_error
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    async fn prompt(&self) -> bool {
        match self.provider.request().await {
            Ok(granted) => granted,
            Err(e) => {
                tracing::warn!("Location permission request failed: {}", e);
                false
            }
        }
    }

    async fn recover_from_settings(&self) -> bool {
        if !self.provider.confirm_open_settings().await {
            tracing::debug!("User declined to open settings");
            return false;
        }
        if let Err(e) = self.provider.open_settings().await {
            tracing::warn!("Failed to open settings: {}", e);
            return false;
        }
        self.clear_error();
        self.check().await == PermissionState::Granted
    }

    fn set_error(&self, message: &str) {
        if let Ok(mut guard) = self.last_error.lock() {
            *guard = Some(message.to_string());
        }
    }

    fn clear_error(&self) {
        if let Ok(mut guard) = self.last_error.lock() {
            *guard = None;
        }
    }
}
