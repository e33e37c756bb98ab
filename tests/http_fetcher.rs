//! Integration tests for the reqwest-backed fetcher against a local image server.

mod common;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::http::header::CONTENT_DISPOSITION;
use axum::routing::get;
use serde_json::json;
use url::Url;

use common::{body_bytes, build_test_app, png, post_json};
use thermomark::input::{FetchError, HttpFetcher, ImageFetcher, decode_image};

/// 启动一个本地图像服务器，返回其地址
async fn spawn_image_server() -> SocketAddr {
  let app = Router::new()
    .route("/panel.png", get(|| async { png(300, 150) }))
    .route("/missing.png", get(|| async { StatusCode::NOT_FOUND }))
    .route(
      "/slow.png",
      get(|| async {
        tokio::time::sleep(Duration::from_secs(3)).await;
        png(1, 1)
      }),
    );

  let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  tokio::spawn(async move {
    axum::serve(listener, app).await.unwrap();
  });
  addr
}

/// 绕过环境代理，直接访问本地服务器
fn local_fetcher(timeout: Duration) -> HttpFetcher {
  let client = reqwest::Client::builder()
    .no_proxy()
    .timeout(timeout)
    .build()
    .unwrap();
  HttpFetcher::with_client(client)
}

fn url(addr: SocketAddr, path: &str) -> Url {
  Url::parse(&format!("http://{addr}{path}")).unwrap()
}

// ---------------------------------------------------------------------------
// Test: fetcher outcomes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetches_image_bytes() {
  let addr = spawn_image_server().await;
  let fetcher = local_fetcher(Duration::from_secs(5));

  let bytes = fetcher.fetch(&url(addr, "/panel.png")).await.unwrap();
  assert_eq!(decode_image(&bytes).unwrap().dimensions(), (300, 150));
}

#[tokio::test]
async fn non_success_status_is_reported() {
  let addr = spawn_image_server().await;
  let fetcher = local_fetcher(Duration::from_secs(5));

  let err = fetcher.fetch(&url(addr, "/missing.png")).await.unwrap_err();
  assert!(matches!(err, FetchError::Status(404)));
}

#[tokio::test]
async fn slow_server_times_out() {
  let addr = spawn_image_server().await;
  let fetcher = local_fetcher(Duration::from_millis(200));

  let err = fetcher.fetch(&url(addr, "/slow.png")).await.unwrap_err();
  assert!(matches!(err, FetchError::Timeout));
}

// ---------------------------------------------------------------------------
// Test: full pipeline through the real fetcher
// ---------------------------------------------------------------------------

#[tokio::test]
async fn markup_through_real_fetcher() {
  let addr = spawn_image_server().await;
  let fetcher = Arc::new(local_fetcher(Duration::from_secs(5)));

  let response = post_json(
    build_test_app(fetcher.clone()),
    "/markup",
    json!({
      "imageUrl": url(addr, "/panel.png").as_str(),
      "defects": [{ "x": 150, "y": 75, "diameterMm": 20 }, { "x": 30, "y": 30 }],
    }),
  )
  .await;
  assert_eq!(response.status(), StatusCode::OK);
  let disposition = response.headers()[CONTENT_DISPOSITION].to_str().unwrap().to_string();
  assert!(disposition.contains("thermogram_marked_2_defects.png"));
  let decoded = decode_image(&body_bytes(response).await).unwrap();
  assert_eq!(decoded.dimensions(), (300, 150));

  let response = post_json(
    build_test_app(fetcher),
    "/markup",
    json!({ "imageUrl": url(addr, "/missing.png").as_str(), "defects": [{}] }),
  )
  .await;
  assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
