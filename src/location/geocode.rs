//! 逆地理编码：腾讯地图 `geocoder/v1` 接口
//!
//! 地址只是锦上添花，失败时由会话用 [`fallback_address`] 兜底。

use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt};
use reqwest::Client;
use serde::Deserialize;

use super::Coordinate;
use crate::error::GeocodeError;

pub trait ReverseGeocoder: Send + Sync {
    fn reverse_geocode(&self, coordinate: Coordinate) -> BoxFuture<'_, Result<String, GeocodeError>>;
}

/// 地址解析失败时的坐标文案
pub fn fallback_address(coordinate: Coordinate) -> String {
    format!(
        "position: {:.6}, {:.6}",
        coordinate.latitude(),
        coordinate.longitude()
    )
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: i64,
    #[serde(default)]
    message: String,
    result: Option<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    #[serde(default)]
    address: String,
    formatted_addresses: Option<FormattedAddresses>,
}

#[derive(Debug, Default, Deserialize)]
struct FormattedAddresses {
    #[serde(default)]
    recommend: String,
    #[serde(default)]
    rough: String,
}

/// 逆地理编码 HTTP 客户端
pub struct GeocodeClient {
    client: Client,
    endpoint: String,
    key: String,
}

impl GeocodeClient {
    pub fn new(base_url: &str, key: &str, timeout: Duration) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/geocoder/v1/", base_url.trim_end_matches('/')),
            key: key.to_owned(),
        })
    }

    pub async fn lookup(&self, coordinate: Coordinate) -> Result<String, GeocodeError> {
        let location = format!("{},{}", coordinate.latitude(), coordinate.longitude());
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("location", location.as_str()),
                ("key", self.key.as_str()),
                ("get_poi", "1"),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        let parsed: GeocodeResponse =
            serde_json::from_str(&body).map_err(|e| GeocodeError::Malformed(e.to_string()))?;

        if parsed.status != 0 {
            return Err(GeocodeError::Status {
                status: parsed.status,
                message: parsed.message,
            });
        }

        let result = parsed
            .result
            .ok_or_else(|| GeocodeError::Malformed("missing result".into()))?;
        let formatted = result.formatted_addresses.unwrap_or_default();

        [result.address, formatted.recommend, formatted.rough]
            .into_iter()
            .find(|candidate| !candidate.trim().is_empty())
            .ok_or_else(|| GeocodeError::Malformed("empty address".into()))
    }
}

impl ReverseGeocoder for GeocodeClient {
    fn reverse_geocode(&self, coordinate: Coordinate) -> BoxFuture<'_, Result<String, GeocodeError>> {
        self.lookup(coordinate).boxed()
    }
}
