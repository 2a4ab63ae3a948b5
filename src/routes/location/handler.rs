use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use crate::{
    AppState,
    error::AppError,
    location::{Coordinate, LocationSessionState, PermissionStatus, format_distance, round_km},
    utils::{ApiResponse, success_to_api_response},
};

// 距离查询参数
#[derive(Debug, Deserialize)]
pub struct DistanceQuery {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

// 小程序端上报坐标
#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DistanceResponse {
    pub kilometers: f64,
    pub label: String,
}

// 当前定位状态，首次访问时触发初始化
pub async fn get_location(
    State(state): State<AppState>,
) -> Json<ApiResponse<LocationSessionState>> {
    state.session.initialize().await;
    success_to_api_response(state.session.state())
}

pub async fn refresh_location(
    State(state): State<AppState>,
) -> Json<ApiResponse<LocationSessionState>> {
    state.session.refresh().await;
    let snapshot = state.session.state();
    if let Some(error) = &snapshot.error {
        tracing::info!("Location refresh finished with error: {}", error);
    }
    success_to_api_response(snapshot)
}

// 上报坐标后立即重新解析，虚拟定位模式下拒绝上报
pub async fn report_position(
    State(state): State<AppState>,
    Json(request): Json<ReportRequest>,
) -> Result<Json<ApiResponse<LocationSessionState>>, AppError> {
    let coordinate = Coordinate::new(request.latitude, request.longitude)?;
    if state.config.use_mock_location {
        tracing::warn!(
            "Rejecting reported position {}, {}: mock location is enabled",
            coordinate.latitude(),
            coordinate.longitude()
        );
        return Err(AppError::MockLocationEnabled);
    }
    state.reporter.report(coordinate);
    state.session.refresh().await;
    Ok(success_to_api_response(state.session.state()))
}

pub async fn clear_location(
    State(state): State<AppState>,
) -> Json<ApiResponse<LocationSessionState>> {
    state.session.clear().await;
    success_to_api_response(state.session.state())
}

pub async fn distance_to(
    State(state): State<AppState>,
    Query(query): Query<DistanceQuery>,
) -> Result<Json<ApiResponse<DistanceResponse>>, AppError> {
    let latitude = query.latitude.ok_or(AppError::MissingParameter("latitude"))?;
    let longitude = query
        .longitude
        .ok_or(AppError::MissingParameter("longitude"))?;
    let target = Coordinate::new(latitude, longitude)?;

    let km = state
        .session
        .distance_to(target)
        .ok_or(AppError::LocationUnavailable)?;

    Ok(success_to_api_response(DistanceResponse {
        kilometers: round_km(km),
        label: format_distance(km),
    }))
}

pub async fn permission_status(
    State(state): State<AppState>,
) -> Json<ApiResponse<PermissionStatus>> {
    success_to_api_response(state.session.permission_status().await)
}
