use serde::{Deserialize, Serialize};

use crate::feed::{RankedPost, ShopPost, SortMode};

// 排序请求
#[derive(Debug, Deserialize)]
pub struct RankRequest {
    #[serde(default)]
    pub mode: SortMode,
    pub posts: Vec<ShopPost>,
    pub keyword: Option<String>,
    pub radius_km: Option<f64>,
    #[serde(default)]
    pub nearby: bool,
}

// 排序响应
#[derive(Debug, Serialize)]
pub struct RankResponse {
    pub mode: SortMode,
    pub has_location: bool,
    pub posts: Vec<RankedPost>,
}
