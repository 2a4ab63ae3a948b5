//! GeocodeClient 集成测试（wiremock）

use std::time::Duration;

use geotrack::error::GeocodeError;
use geotrack::location::{Coordinate, GeocodeClient};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> GeocodeClient {
    GeocodeClient::new(base_url, "test-key", Duration::from_secs(5))
        .expect("client construction should not fail")
}

fn beijing() -> Coordinate {
    Coordinate::new(39.9042, 116.4074).unwrap()
}

#[tokio::test]
async fn returns_address_on_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geocoder/v1/"))
        .and(query_param("location", "39.9042,116.4074"))
        .and(query_param("key", "test-key"))
        .and(query_param("get_poi", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": 0,
            "message": "query ok",
            "result": {
                "address": "北京市东城区东长安街",
                "formatted_addresses": {
                    "recommend": "天安门",
                    "rough": "东城区"
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let address = test_client(&server.uri())
        .lookup(beijing())
        .await
        .expect("should resolve address");
    assert_eq!(address, "北京市东城区东长安街");
}

#[tokio::test]
async fn falls_back_to_recommended_address() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geocoder/v1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": 0,
            "message": "query ok",
            "result": {
                "address": "",
                "formatted_addresses": { "recommend": "天安门", "rough": "东城区" }
            }
        })))
        .mount(&server)
        .await;

    let address = test_client(&server.uri()).lookup(beijing()).await.unwrap();
    assert_eq!(address, "天安门");
}

#[tokio::test]
async fn non_zero_status_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": 311,
            "message": "key格式错误"
        })))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .lookup(beijing())
        .await
        .expect_err("status 311 should fail");
    match err {
        GeocodeError::Status { status, message } => {
            assert_eq!(status, 311);
            assert_eq!(message, "key格式错误");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn malformed_payload_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let err = test_client(&server.uri()).lookup(beijing()).await.unwrap_err();
    assert!(matches!(err, GeocodeError::Malformed(_)), "got {err:?}");
}

#[tokio::test]
async fn http_error_status_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = test_client(&server.uri()).lookup(beijing()).await.unwrap_err();
    assert!(matches!(err, GeocodeError::Http(_)), "got {err:?}");
}
