use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::utils::{error_codes, error_to_api_response};

/// 逆地理编码错误
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// 服务返回 status != 0
    #[error("geocoder returned status {status}: {message}")]
    Status { status: i64, message: String },

    #[error("malformed geocoder response: {0}")]
    Malformed(String),
}

/// 设备定位错误
#[derive(Debug, Error)]
pub enum PositionError {
    #[error("position request timed out")]
    Timeout,

    #[error("position unavailable: {0}")]
    Unavailable(String),
}

/// 设备权限接口错误
#[derive(Debug, Error)]
#[error("permission provider failure: {0}")]
pub struct PermissionError(pub String);

/// 键值存储错误
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// 定位子系统错误
///
/// 只有 `PermissionDenied` 与 `PositionUnavailable` 会作为用户可见的错误
/// 写入会话状态，其余错误在本地以回退值吸收。
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("{0}")]
    PermissionDenied(String),

    #[error("{0}")]
    PositionUnavailable(String),

    #[error("reverse geocoding failed: {0}")]
    GeocodeFailed(#[from] GeocodeError),

    #[error("cached location is corrupt: {0}")]
    CacheCorrupt(String),

    #[error("coordinate out of range: ({latitude}, {longitude})")]
    InvalidCoordinate { latitude: f64, longitude: f64 },
}

// 设备失败的细节只进日志，状态里放统一文案
impl From<PositionError> for LocationError {
    fn from(_: PositionError) -> Self {
        LocationError::PositionUnavailable(
            "failed to get position, please check GPS settings".to_string(),
        )
    }
}

#[derive(Debug)]
pub enum AppError {
    InvalidCoordinate,
    MissingParameter(&'static str),
    InvalidParameter(&'static str),
    LocationUnavailable,
    MockLocationEnabled,
    InternalServerError,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, msg) = match self {
            AppError::InvalidCoordinate => (
                StatusCode::BAD_REQUEST,
                error_codes::VALIDATION_ERROR,
                "coordinate out of range".to_string(),
            ),
            AppError::MissingParameter(name) => (
                StatusCode::BAD_REQUEST,
                error_codes::VALIDATION_ERROR,
                format!("missing parameter: {}", name),
            ),
            AppError::InvalidParameter(name) => (
                StatusCode::BAD_REQUEST,
                error_codes::VALIDATION_ERROR,
                format!("invalid parameter: {}", name),
            ),
            AppError::LocationUnavailable => (
                StatusCode::CONFLICT,
                error_codes::LOCATION_UNAVAILABLE,
                "current location is not available".to_string(),
            ),
            AppError::MockLocationEnabled => (
                StatusCode::CONFLICT,
                error_codes::MOCK_LOCATION_ENABLED,
                "mock location is enabled, reported positions are ignored".to_string(),
            ),
            AppError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_codes::INTERNAL_ERROR,
                "internal server error".to_string(),
            ),
        };

        (status, error_to_api_response::<()>(code, msg)).into_response()
    }
}

impl From<LocationError> for AppError {
    fn from(err: LocationError) -> Self {
        match err {
            LocationError::InvalidCoordinate { .. } => AppError::InvalidCoordinate,
            LocationError::PermissionDenied(_) | LocationError::PositionUnavailable(_) => {
                AppError::LocationUnavailable
            }
            _ => AppError::InternalServerError,
        }
    }
}
