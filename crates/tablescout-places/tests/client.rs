//! Integration tests for `PlacesClient` using wiremock HTTP mocks.

use std::path::Path;

use tablescout_core::app_config::{AppConfig, CacheTtls};
use tablescout_core::capabilities::PlaceQuery;
use tablescout_places::PlacesClient;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(data_dir: &Path, ttls: CacheTtls) -> AppConfig {
    AppConfig {
        data_dir: data_dir.to_path_buf(),
        log_level: "info".to_string(),
        google_api_key: Some("test-key".to_string()),
        resy_api_key: None,
        resy_auth_token: None,
        request_timeout_secs: 5,
        google_rate_limit_calls: 100,
        google_rate_limit_period_secs: 1,
        resy_rate_limit_calls: 100,
        resy_rate_limit_period_secs: 1,
        cache_ttls: ttls,
        default_lat: -33.8688,
        default_lng: 151.2093,
        default_radius_m: 5000,
        default_party_size: 2,
        places_base_url: "https://places.googleapis.com/v1".to_string(),
        resy_base_url: "https://api.resy.com".to_string(),
        max_output_chars: 4096,
    }
}

fn test_query(text: &str) -> PlaceQuery {
    PlaceQuery {
        query: text.to_string(),
        lat: -33.8688,
        lng: 151.2093,
        radius_m: 5000,
        price_levels: None,
        min_rating: None,
        max_results: 10,
    }
}

fn search_body() -> serde_json::Value {
    serde_json::json!({
        "places": [
            {
                "id": "pl_1",
                "displayName": { "text": "Bistro X" },
                "formattedAddress": "1 Example St, Sydney NSW",
                "rating": 4.6,
                "userRatingCount": 512,
                "priceLevel": "PRICE_LEVEL_MODERATE",
                "websiteUri": "https://www.opentable.com.au/r/bistro-x",
                "location": { "latitude": -33.86, "longitude": 151.21 }
            },
            {
                "id": "pl_2",
                "displayName": { "text": "Noodle Bar" },
                "formattedAddress": "2 Example St, Sydney NSW",
                "rating": 3.8,
                "userRatingCount": 44
            }
        ]
    })
}

#[tokio::test]
async fn search_restaurants_normalizes_places() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/places:searchText"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
        .mount(&server)
        .await;

    let config = test_config(dir.path(), CacheTtls::default());
    let client = PlacesClient::with_base_url(&config, &server.uri()).unwrap();
    let results = client.search_restaurants(&test_query("bistro")).await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].place_id, "pl_1");
    assert_eq!(results[0].name, "Bistro X");
    assert_eq!(results[0].rating, Some(4.6));
    assert_eq!(
        results[0].website.as_deref(),
        Some("https://www.opentable.com.au/r/bistro-x")
    );
    assert_eq!(results[1].name, "Noodle Bar");
}

#[tokio::test]
async fn search_applies_min_rating_client_side() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/places:searchText"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
        .mount(&server)
        .await;

    let config = test_config(dir.path(), CacheTtls::default());
    let client = PlacesClient::with_base_url(&config, &server.uri()).unwrap();
    let mut query = test_query("bistro");
    query.min_rating = Some(4.0);
    let results = client.search_restaurants(&query).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].place_id, "pl_1");
}

#[tokio::test]
async fn second_search_is_served_from_cache() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/places:searchText"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(dir.path(), CacheTtls::default());
    let client = PlacesClient::with_base_url(&config, &server.uri()).unwrap();
    let first = client.search_restaurants(&test_query("bistro")).await.unwrap();
    let second = client.search_restaurants(&test_query("bistro")).await.unwrap();
    assert_eq!(first.len(), second.len());
}

#[tokio::test]
async fn transport_failure_falls_back_to_stale_cache() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/places:searchText"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/places:searchText"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    // Zero search TTL: the cached entry is immediately expired, so the
    // second call must hit the server, fail, and serve the stale entry.
    let ttls = CacheTtls {
        search_secs: 0,
        ..CacheTtls::default()
    };
    let config = test_config(dir.path(), ttls);
    let client = PlacesClient::with_base_url(&config, &server.uri()).unwrap();

    let first = client.search_restaurants(&test_query("bistro")).await.unwrap();
    assert_eq!(first.len(), 2);

    let stale = client.search_restaurants(&test_query("bistro")).await.unwrap();
    assert_eq!(stale.len(), 2);
    assert_eq!(stale[0].place_id, "pl_1");
}

#[tokio::test]
async fn transport_failure_without_cache_is_an_error() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/places:searchText"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let config = test_config(dir.path(), CacheTtls::default());
    let client = PlacesClient::with_base_url(&config, &server.uri()).unwrap();
    let result = client.search_restaurants(&test_query("bistro")).await;
    assert!(result.is_err(), "expected error, got: {result:?}");
}

#[tokio::test]
async fn details_returns_none_for_unknown_place() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/places/pl_missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let config = test_config(dir.path(), CacheTtls::default());
    let client = PlacesClient::with_base_url(&config, &server.uri()).unwrap();
    let details = client.get_details("pl_missing").await.unwrap();
    assert!(details.is_none());
}

#[tokio::test]
async fn details_parses_reviews() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let body = serde_json::json!({
        "id": "pl_1",
        "displayName": { "text": "Bistro X" },
        "formattedAddress": "1 Example St",
        "rating": 4.6,
        "reviews": [
            {
                "authorAttribution": { "displayName": "A. Diner" },
                "rating": 5,
                "text": { "text": "Great duck." },
                "publishTime": "2026-07-01T10:00:00Z"
            }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/places/pl_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let config = test_config(dir.path(), CacheTtls::default());
    let client = PlacesClient::with_base_url(&config, &server.uri()).unwrap();
    let details = client.get_details("pl_1").await.unwrap().unwrap();
    assert_eq!(details.name, "Bistro X");
    assert_eq!(details.reviews.len(), 1);
    assert_eq!(details.reviews[0].author, "A. Diner");
    assert_eq!(details.reviews[0].text, "Great duck.");
}

#[tokio::test]
async fn missing_api_key_is_a_hard_error() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let mut config = test_config(dir.path(), CacheTtls::default());
    config.google_api_key = None;
    let client = PlacesClient::with_base_url(&config, &server.uri()).unwrap();
    assert!(!client.has_api_key());
    let result = client.search_restaurants(&test_query("bistro")).await;
    assert!(result.is_err());
}
