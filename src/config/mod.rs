use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::location::Coordinate;

/// 腾讯地图 WebService 默认地址
const DEFAULT_GEOCODE_BASE_URL: &str = "https://apis.map.qq.com/ws";

/// 开发环境虚拟定位：广州天河
const DEFAULT_MOCK_LATITUDE: f64 = 23.12908;
const DEFAULT_MOCK_LONGITUDE: f64 = 113.264435;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
    pub redis_url: Option<String>,
    pub geocode_base_url: String,
    pub geocode_key: String,
    pub geocode_timeout_secs: u64,
    pub location_cache_ttl_minutes: u64,
    pub use_mock_location: bool,
    pub mock_latitude: f64,
    pub mock_longitude: f64,
    pub nearby_radius_km: f64,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        Ok(Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            server_port: parse_or("SERVER_PORT", 3000),
            api_base_uri: env::var("API_BASE_URI").unwrap_or_else(|_| "/api".into()),
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.trim().is_empty()),
            geocode_base_url: env::var("GEOCODE_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GEOCODE_BASE_URL.into()),
            geocode_key: env::var("GEOCODE_KEY")?,
            geocode_timeout_secs: parse_or("GEOCODE_TIMEOUT_SECS", 10),
            // 位置缓存有效期：30分钟
            location_cache_ttl_minutes: parse_or("LOCATION_CACHE_TTL_MINUTES", 30),
            use_mock_location: parse_or("USE_MOCK_LOCATION", false),
            mock_latitude: parse_or("MOCK_LATITUDE", DEFAULT_MOCK_LATITUDE),
            mock_longitude: parse_or("MOCK_LONGITUDE", DEFAULT_MOCK_LONGITUDE),
            nearby_radius_km: parse_or("NEARBY_RADIUS_KM", 10.0),
        })
    }

    pub fn geocode_timeout(&self) -> Duration {
        Duration::from_secs(self.geocode_timeout_secs)
    }

    pub fn location_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.location_cache_ttl_minutes * 60)
    }

    /// 虚拟定位坐标，配置越界时回退到默认值
    pub fn mock_coordinate(&self) -> Coordinate {
        Coordinate::new(self.mock_latitude, self.mock_longitude).unwrap_or_else(|_| {
            tracing::warn!(
                "Invalid mock coordinate ({}, {}), falling back to default",
                self.mock_latitude,
                self.mock_longitude
            );
            Coordinate::new_unchecked(DEFAULT_MOCK_LATITUDE, DEFAULT_MOCK_LONGITUDE)
        })
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}
