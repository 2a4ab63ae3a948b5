use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::location::Coordinate;

/// 社区分享的店铺帖子（来自后端，只读）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopPost {
    pub id: i64,
    #[serde(default)]
    pub shop_name: String,
    #[serde(default)]
    pub shop_location: String,
    #[serde(default)]
    pub comment: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
    #[serde(default, alias = "likes_count")]
    pub like_count: i64,
    #[serde(default)]
    pub view_count: i64,
}

impl ShopPost {
    /// 经纬度齐全且合法时才算有坐标
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Coordinate::new(lat, lng).ok(),
            _ => None,
        }
    }
}

/// 排序结果，距离字段每次请求重新计算
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedPost {
    #[serde(flatten)]
    pub post: ShopPost,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_label: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    Distance,
    #[default]
    Latest,
    Popular,
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "distance" => Ok(SortMode::Distance),
            "latest" => Ok(SortMode::Latest),
            "popular" => Ok(SortMode::Popular),
            other => Err(format!("unknown sort mode: {}", other)),
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortMode::Distance => "distance",
            SortMode::Latest => "latest",
            SortMode::Popular => "popular",
        };
        f.write_str(name)
    }
}
