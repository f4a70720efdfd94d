//! Exercises the real reqwest paths against a local axum server.

use std::collections::HashMap;

use assert_matches::assert_matches;
use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use imgharvest_search::{
    download_to_file, CustomSearchApi, DownloadError, ImageSource, SearchCredentials, SearchError,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Serve `app` on an ephemeral port and return its base URL.
async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Echo every query parameter back as a `link`, in a fixed order.
async fn echo_search(Query(params): Query<HashMap<String, String>>) -> Json<serde_json::Value> {
    let param = |k: &str| params.get(k).cloned().unwrap_or_default();
    Json(json!({
        "items": [
            { "link": param("q") },
            { "link": param("key") },
            { "link": param("cx") },
            { "link": param("searchType") },
        ]
    }))
}

fn credentials() -> SearchCredentials {
    SearchCredentials {
        api_key: "key+with/specials".to_string(),
        engine_id: "engine:42".to_string(),
    }
}

fn api(base: &str, path: &str) -> CustomSearchApi {
    CustomSearchApi::with_client(
        reqwest::Client::new(),
        format!("{base}{path}"),
        credentials(),
    )
}

const PAYLOAD: &[u8] = b"\x89PNG\r\n\x1a\nnot-really-a-png-but-bytes-are-bytes";

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[tokio::test]
async fn search_sends_encoded_parameters() {
    let base = spawn(Router::new().route("/customsearch/v1", get(echo_search))).await;

    let urls = api(&base, "/customsearch/v1")
        .search("red panda & friends")
        .await
        .unwrap();

    assert_eq!(
        urls,
        vec![
            "red panda & friends",
            "key+with/specials",
            "engine:42",
            "image"
        ]
    );
}

#[tokio::test]
async fn search_with_no_items_is_empty() {
    let app = Router::new().route(
        "/search",
        get(|| async { Json(json!({ "kind": "customsearch#search" })) }),
    );
    let base = spawn(app).await;

    assert!(api(&base, "/search").search("nothing").await.unwrap().is_empty());
}

#[tokio::test]
async fn search_error_status_is_api_error() {
    let app = Router::new().route(
        "/search",
        get(|| async { (StatusCode::FORBIDDEN, r#"{"error":{"code":403}}"#) }),
    );
    let base = spawn(app).await;

    let err = api(&base, "/search").search("cats").await.unwrap_err();
    assert_matches!(err, SearchError::Api { status: 403, .. });
}

#[tokio::test]
async fn search_malformed_body_is_decode_error() {
    let app = Router::new().route("/search", get(|| async { "definitely not json" }));
    let base = spawn(app).await;

    let err = api(&base, "/search").search("cats").await.unwrap_err();
    assert_matches!(err, SearchError::Decode(_));
}

// ---------------------------------------------------------------------------
// Download
// ---------------------------------------------------------------------------

#[tokio::test]
async fn download_writes_body_to_file() {
    let base = spawn(Router::new().route("/img", get(|| async { PAYLOAD.to_vec() }))).await;
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("cats-0.jpg");

    let written = download_to_file(&reqwest::Client::new(), &format!("{base}/img"), &dest)
        .await
        .unwrap();

    assert_eq!(written, PAYLOAD.len() as u64);
    assert_eq!(std::fs::read(&dest).unwrap(), PAYLOAD);
}

#[tokio::test]
async fn download_truncates_existing_file() {
    let base = spawn(Router::new().route("/img", get(|| async { PAYLOAD.to_vec() }))).await;
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("cats-0.jpg");
    std::fs::write(&dest, vec![0u8; PAYLOAD.len() * 4]).unwrap();

    download_to_file(&reqwest::Client::new(), &format!("{base}/img"), &dest)
        .await
        .unwrap();

    assert_eq!(std::fs::read(&dest).unwrap(), PAYLOAD);
}

#[tokio::test]
async fn download_404_is_error_and_creates_no_file() {
    let base = spawn(Router::new()).await;
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("cats-1.jpg");

    let err = download_to_file(&reqwest::Client::new(), &format!("{base}/gone"), &dest)
        .await
        .unwrap_err();

    assert_matches!(err, DownloadError::HttpStatus(404));
    assert!(!dest.exists());
}

#[tokio::test]
async fn download_into_missing_directory_is_file_error() {
    let base = spawn(Router::new().route("/img", get(|| async { PAYLOAD.to_vec() }))).await;
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("no-such-dir").join("cats-0.jpg");

    let err = download_to_file(&reqwest::Client::new(), &format!("{base}/img"), &dest)
        .await
        .unwrap_err();

    assert_matches!(err, DownloadError::File { .. });
}

#[tokio::test]
async fn download_refused_connection_is_request_error() {
    // Bind then drop to get a port nothing is listening on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let dir = tempfile::tempdir().unwrap();
    let err = download_to_file(
        &reqwest::Client::new(),
        &format!("http://{addr}/img"),
        &dir.path().join("x.jpg"),
    )
    .await
    .unwrap_err();

    assert_matches!(err, DownloadError::Request(_));
}

// ---------------------------------------------------------------------------
// ImageSource
// ---------------------------------------------------------------------------

#[tokio::test]
async fn custom_search_api_works_as_image_source() {
    let app = Router::new()
        .route("/search", get(echo_search))
        .route("/img", get(|| async { PAYLOAD.to_vec() }));
    let base = spawn(app).await;
    let api = api(&base, "/search");
    let source: &dyn ImageSource = &api;

    let urls = source.search("owls").await.unwrap();
    assert_eq!(urls[0], "owls");

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("owls-0.jpg");
    let written = source.download(&format!("{base}/img"), &dest).await.unwrap();
    assert_eq!(written, PAYLOAD.len() as u64);
}
