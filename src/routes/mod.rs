use axum::{
    Router,
    routing::{get, post},
};

use crate::AppState;

pub mod feed;
pub mod location;

/// 挂载全部路由到 `api_base_uri` 下
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        // 定位路由
        .route(
            "/location",
            get(location::get_location).delete(location::clear_location),
        )
        .route("/location/refresh", post(location::refresh_location))
        .route("/location/report", post(location::report_position))
        .route("/location/distance", get(location::distance_to))
        .route("/location/permission", get(location::permission_status))
        // 社区帖子排序
        .route("/feed/rank", post(feed::rank_feed));

    Router::new()
        .nest(&state.config.api_base_uri, api)
        .with_state(state)
}
