use autocomplete_service::api_client::{CityLookup, WeatherApiClient};
use common::errors::AppError;
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

fn client(server: &MockServer, timeout_secs: u64) -> WeatherApiClient {
    WeatherApiClient::new(
        &format!("{}/v1", server.uri()),
        "test-key".to_string(),
        timeout_secs,
    )
    .expect("Failed to build client")
}

/// Test that search results are decoded in API order
#[tokio::test]
async fn test_search_returns_cities() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search.json"))
        .and(query_param("key", "test-key"))
        .and(query_param("q", "New"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 2618724,
                "name": "New York",
                "region": "New York",
                "country": "United States of America",
                "lat": 40.71,
                "lon": -74.01,
                "url": "new-york-new-york-united-states-of-america"
            },
            {
                "id": 2618446,
                "name": " Newark ",
                "region": "New Jersey",
                "country": "United States of America",
                "lat": 40.74,
                "lon": -74.17,
                "url": "newark-new-jersey-united-states-of-america"
            }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let cities = client(&mock_server, 2).search("New").await.unwrap();

    assert_eq!(cities.len(), 2);
    assert_eq!(cities[0].name, "New York");
    assert_eq!(cities[1].name, "Newark");
    assert_eq!(cities[1].country, "United States of America");
    assert_eq!(cities[1].latitude, 40.74);
}

/// Test that the raw query, comma and all, is sent as `q`
#[tokio::test]
async fn test_search_sends_raw_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search.json"))
        .and(query_param("q", "São Paulo, Brazil"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let cities = client(&mock_server, 2)
        .search("São Paulo, Brazil")
        .await
        .unwrap();

    assert!(cities.is_empty());
}

/// Test HTTP error responses collapse into one failure kind
#[tokio::test]
async fn test_http_errors_are_lookup_failures() {
    for status in [400, 401, 500, 503] {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search.json"))
            .respond_with(ResponseTemplate::new(status).set_body_string("nope"))
            .mount(&mock_server)
            .await;

        let err = client(&mock_server, 2).search("Berlin").await.unwrap_err();
        assert!(matches!(err, AppError::ExternalLookup(_)), "status {status}");
    }
}

/// Test malformed bodies are lookup failures
#[tokio::test]
async fn test_malformed_body_is_lookup_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": { "code": 1006, "message": "No location found matching parameter 'q'" }
        })))
        .mount(&mock_server)
        .await;

    let err = client(&mock_server, 2).search("Berlin").await.unwrap_err();
    assert!(matches!(err, AppError::ExternalLookup(_)));
}

/// Test error handling with timeout simulation
#[tokio::test]
async fn test_timeout_is_lookup_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let err = client(&mock_server, 1).search("Berlin").await.unwrap_err();
    assert!(matches!(err, AppError::ExternalLookup(_)));
}

/// Test that an unreachable host is a lookup failure
#[tokio::test]
async fn test_unreachable_host_is_lookup_failure() {
    let mock_server = MockServer::start().await;
    let client = client(&mock_server, 1);
    drop(mock_server);

    let err = client.search("Berlin").await.unwrap_err();
    assert!(matches!(err, AppError::ExternalLookup(_)));
}
