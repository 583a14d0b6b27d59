use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use lost_found::build_router;
use lost_found::config::Config;
use lost_found::db::MemoryItemStore;
use lost_found::services::ItemsService;
use lost_found::storage::MemoryMediaStore;

const BOUNDARY: &str = "lostfoundboundary";
const JPEG: &[u8] = b"\xff\xd8\xff\xe0\x00\x10JFIF fake jpeg body";

struct TestApp {
    router: Router,
    items: Arc<MemoryItemStore>,
    media: Arc<MemoryMediaStore>,
}

fn test_app() -> TestApp {
    test_app_with(Config::default())
}

fn test_app_with(config: Config) -> TestApp {
    let items = Arc::new(MemoryItemStore::new());
    let media = Arc::new(MemoryMediaStore::new());
    let service = Arc::new(ItemsService::new(items.clone(), media.clone()));
    TestApp {
        router: build_router(service, &config),
        items,
        media,
    }
}

fn water_bottle() -> Vec<(&'static str, &'static str)> {
    vec![
        ("name", "Water Bottle"),
        ("description", "Blue steel bottle"),
        ("locationFound", "library"),
        ("itemType", "bottle"),
        ("color", "blue"),
        ("contactInfo", "Asha"),
        ("contactNumber", "9876543210"),
        ("status", "with_finder"),
    ]
}

fn multipart_body(fields: &[(&str, &str)], image: Option<&[u8]>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some(image) = image {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"bottle.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n",
                BOUNDARY
            )
            .as_bytes(),
        );
        body.extend_from_slice(image);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn create_request(fields: &[(&str, &str)], image: Option<&[u8]>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/items")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(fields, image)))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn create_item_returns_created_record() {
    let app = test_app();
    let (status, body) = send(&app.router, create_request(&water_bottle(), Some(JPEG))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["itemType"], "bottle");
    assert_eq!(body["data"]["status"], "with_finder");
    assert_eq!(body["data"]["aiGenerated"], false);

    let image_url = body["data"]["imageUrl"].as_str().unwrap();
    let media_id = body["data"]["mediaId"].as_str().unwrap();
    assert!(!image_url.is_empty());
    assert_eq!(image_url, format!("memory://{}", media_id));
    assert!(app.media.contains(media_id).await);
}

#[tokio::test]
async fn create_without_image_is_rejected_before_upload() {
    let app = test_app();
    let (status, body) = send(&app.router, create_request(&water_bottle(), None)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Image is required");
    assert_eq!(app.media.upload_calls(), 0);
    assert!(app.items.is_empty().await);
}

#[tokio::test]
async fn create_with_json_body_is_missing_image() {
    let app = test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/items")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"name":"Water Bottle"}"#))
        .unwrap();
    let (status, body) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Image is required");
}

#[tokio::test]
async fn create_with_missing_field_is_rejected_before_upload() {
    let app = test_app();
    for missing in ["name", "description", "locationFound", "itemType", "contactInfo", "contactNumber"] {
        let fields: Vec<_> = water_bottle()
            .into_iter()
            .filter(|(name, _)| *name != missing)
            .collect();
        let (status, body) = send(&app.router, create_request(&fields, Some(JPEG))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "missing {}", missing);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], format!("{} is required", missing));
    }
    assert_eq!(app.media.upload_calls(), 0);
    assert!(app.items.is_empty().await);
}

#[tokio::test]
async fn create_with_invalid_status_is_client_error() {
    let app = test_app();
    let mut fields = water_bottle();
    fields.retain(|(name, _)| *name != "status");
    fields.push(("status", "lost_forever"));

    let (status, body) = send(&app.router, create_request(&fields, Some(JPEG))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn create_without_status_defaults_to_with_finder() {
    let app = test_app();
    let fields: Vec<_> = water_bottle()
        .into_iter()
        .filter(|(name, _)| *name != "status")
        .collect();

    let (status, body) = send(&app.router, create_request(&fields, Some(JPEG))).await;
    assert_eq!(status, StatusCode::CREATED);

    let id = body["data"]["id"].as_str().unwrap();
    let (status, body) = send(&app.router, get_request(&format!("/api/items/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "with_finder");
}

#[tokio::test]
async fn upload_failure_is_server_error() {
    let app = test_app();
    app.media.fail_uploads(true);

    let (status, body) = send(&app.router, create_request(&water_bottle(), Some(JPEG))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Failed to upload image");
    assert!(app.items.is_empty().await);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let app = test_app_with(Config {
        max_upload_bytes: 1024,
        ..Config::default()
    });
    let big = vec![0xffu8; 4096];

    let (status, body) = send(&app.router, create_request(&water_bottle(), Some(&big))).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["success"], false);
    assert_eq!(app.media.upload_calls(), 0);
}

#[tokio::test]
async fn list_returns_newest_first_with_count() {
    let app = test_app();
    let mut ids = Vec::new();
    for name in ["Umbrella", "Wallet"] {
        let mut fields = water_bottle();
        fields.retain(|(field, _)| *field != "name");
        fields.push(("name", name));
        let (status, body) = send(&app.router, create_request(&fields, Some(JPEG))).await;
        assert_eq!(status, StatusCode::CREATED);
        ids.push(body["data"]["id"].as_str().unwrap().to_string());
    }

    let (status, body) = send(&app.router, get_request("/api/items")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 2);
    assert_eq!(body["data"][0]["id"], ids[1].as_str());
    assert_eq!(body["data"][1]["id"], ids[0].as_str());
}

#[tokio::test]
async fn list_on_empty_store() {
    let app = test_app();
    let (status, body) = send(&app.router, get_request("/api/items")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
    assert_eq!(body["data"], Value::Array(Vec::new()));
}

#[tokio::test]
async fn get_returns_stored_record() {
    let app = test_app();
    let (_, created) = send(&app.router, create_request(&water_bottle(), Some(JPEG))).await;
    let id = created["data"]["id"].as_str().unwrap();

    let (status, body) = send(&app.router, get_request(&format!("/api/items/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], created["data"]);
}

#[tokio::test]
async fn get_unknown_id_is_not_found() {
    let app = test_app();
    for id in ["00000000-0000-0000-0000-000000000000", "not-an-id"] {
        let (status, body) = send(&app.router, get_request(&format!("/api/items/{}", id))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Item not found");
    }
}

#[tokio::test]
async fn index_health_and_fallback() {
    let app = test_app();

    let (status, body) = send(&app.router, get_request("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Lost and Found API is running!");

    let (status, body) = send(&app.router, get_request("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "SERVING");

    let (status, body) = send(&app.router, get_request("/api/claims")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Route not found");
}

#[tokio::test]
async fn cors_allows_configured_origin() {
    let app = test_app_with(Config {
        cors_origin: Some("https://lostfound.example".to_string()),
        ..Config::default()
    });
    let request = Request::builder()
        .uri("/api/items")
        .header(header::ORIGIN, "https://lostfound.example")
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    let headers = response.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "https://lostfound.example"
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
        "true"
    );
}
