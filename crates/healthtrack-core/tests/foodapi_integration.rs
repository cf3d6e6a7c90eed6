//! Food database client against a mock HTTP server.

use healthtrack_core::error::ApiError;
use healthtrack_core::nutrition::Grade;
use healthtrack_core::storage::FoodApiConfig;
use healthtrack_core::{describe_api_error, FoodApiClient};
use mockito::Matcher;
use serde_json::json;

fn client(base_url: String) -> FoodApiClient {
    let config = FoodApiConfig {
        base_url,
        timeout_secs: 5,
        ..FoodApiConfig::default()
    };
    FoodApiClient::new(&config).unwrap()
}

#[tokio::test]
async fn barcode_lookup_parses_and_caches() {
    let mut server = mockito::Server::new_async().await;
    let body = json!({
        "status": 1,
        "product": {
            "product_name": "Oat drink",
            "brands": "Oatly",
            "nutriments": {
                "energy-kcal_100g": 46,
                "proteins_100g": 1.0,
                "carbohydrates_100g": 6.7,
                "fat_100g": 1.5,
                "sugars_100g": 4.0,
                "sodium_100g": 0.04
            }
        }
    });
    let mock = server
        .mock("GET", "/api/v0/product/7394376616037.json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .expect(1)
        .create_async()
        .await;

    let api = client(server.url());
    let item = api.lookup_barcode("7394376616037").await.unwrap().unwrap();
    assert_eq!(item.name, "Oat drink");
    assert_eq!(item.brand, "Oatly");
    assert_eq!(item.per_100g.calories, 46.0);
    assert_eq!(FoodApiClient::grade(&item), Grade::A);

    // Second lookup is served from the cache.
    let again = api.lookup_barcode(" 7394376616037 ").await.unwrap().unwrap();
    assert_eq!(again, item);
    assert_eq!(api.cache_len(), 1);
    mock.assert_async().await;
}

#[tokio::test]
async fn unknown_barcode_is_none_and_not_cached() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v0/product/000.json")
        .with_status(200)
        .with_body(r#"{"status": 0, "status_verbose": "product not found"}"#)
        .expect(2)
        .create_async()
        .await;

    let api = client(server.url());
    assert!(api.lookup_barcode("000").await.unwrap().is_none());
    assert!(api.lookup_barcode("000").await.unwrap().is_none());
    assert_eq!(api.cache_len(), 0);
    mock.assert_async().await;
}

#[tokio::test]
async fn search_sends_query_parameters() {
    let mut server = mockito::Server::new_async().await;
    let body = json!({
        "products": [
            {"product_name": "Banana", "nutriments": {"energy-kcal_100g": 89}},
            {"generic_name": "Banana chips", "nutriments": {"energy-kcal_100g": "519"}},
            {"product_name": "Banana bread"}
        ]
    });
    let mock = server
        .mock("GET", "/cgi/search.pl")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("search_terms".into(), "banana split".into()),
            Matcher::UrlEncoded("json".into(), "1".into()),
            Matcher::UrlEncoded("page_size".into(), "2".into()),
        ]))
        .with_status(200)
        .with_body(body.to_string())
        .create_async()
        .await;

    let api = client(server.url());
    let items = api.search("banana split", 2).await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].name, "Banana");
    assert_eq!(items[1].name, "Banana chips");
    assert_eq!(items[1].per_100g.calories, 519.0);
    mock.assert_async().await;

    api.clear_cache();
    assert_eq!(api.cache_len(), 0);
}

#[tokio::test]
async fn server_error_is_reported_with_status() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/v0/product/42.json")
        .with_status(503)
        .with_body("maintenance")
        .create_async()
        .await;

    let api = client(server.url());
    let err = api.lookup_barcode("42").await.unwrap_err();
    match err {
        ApiError::Status { service, status, body } => {
            assert_eq!(service, "openfoodfacts");
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn base_url_path_prefix_is_kept() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/off/api/v0/product/1.json")
        .with_status(200)
        .with_body(r#"{"status": 1, "product": {"product_name": "Prefixed"}}"#)
        .create_async()
        .await;

    let api = client(format!("{}/off", server.url()));
    let item = api.lookup_barcode("1").await.unwrap().unwrap();
    assert_eq!(item.name, "Prefixed");
    mock.assert_async().await;
}

#[tokio::test]
async fn unreachable_server_is_described_as_a_network_failure() {
    let api = client("http://127.0.0.1:1".to_string());
    let err = api.lookup_barcode("3017620422003").await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    let message = describe_api_error(&err, "Barcode lookup").to_lowercase();
    assert!(message.contains("network") || message.contains("connection"), "{message}");
}
