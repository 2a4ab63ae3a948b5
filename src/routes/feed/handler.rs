use axum::{Json, extract::State};

use crate::{
    AppState,
    error::AppError,
    feed::{RankedFeed, search_posts},
    utils::{ApiResponse, success_to_api_response},
};

use super::model::{RankRequest, RankResponse};

// 帖子排序API：可选关键字过滤、半径筛选
pub async fn rank_feed(
    State(state): State<AppState>,
    Json(request): Json<RankRequest>,
) -> Result<Json<ApiResponse<RankResponse>>, AppError> {
    state.session.initialize().await;

    let feed = RankedFeed::new(&state.session);
    let posts = match request.keyword.as_deref() {
        Some(keyword) => search_posts(request.posts, keyword),
        None => request.posts,
    };

    let radius_km = match (request.radius_km, request.nearby) {
        (Some(radius_km), _) => Some(radius_km),
        (None, true) => Some(state.config.nearby_radius_km),
        (None, false) => None,
    };

    let posts = match radius_km {
        Some(radius_km) if radius_km > 0.0 => feed
            .nearby(posts, radius_km)
            .ok_or(AppError::LocationUnavailable)?,
        Some(_) => return Err(AppError::InvalidParameter("radius_km")),
        None => feed.rank(posts, request.mode),
    };

    tracing::debug!("Ranked {} posts by {}", posts.len(), request.mode);
    Ok(success_to_api_response(RankResponse {
        mode: request.mode,
        has_location: state.session.has_valid_location(),
        posts,
    }))
}
