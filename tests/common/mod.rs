#![allow(dead_code)]

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use http_body_util::BodyExt;
use image::{ImageFormat, Rgb, RgbImage};
use tower::ServiceExt;
use url::Url;

use thermomark::args::ServerConfig;
use thermomark::input::{FetchError, ImageFetcher};
use thermomark::server::{AppState, build_router};

/// 记录调用次数的假下载器
pub struct MockFetcher {
  response: Result<Vec<u8>, u16>,
  delay: Option<Duration>,
  calls: AtomicUsize,
}

impl MockFetcher {
  pub fn serving(bytes: Vec<u8>) -> Arc<Self> {
    Arc::new(Self {
      response: Ok(bytes),
      delay: None,
      calls: AtomicUsize::new(0),
    })
  }

  /// 等待 delay 后才返回图像
  pub fn delayed(bytes: Vec<u8>, delay: Duration) -> Arc<Self> {
    Arc::new(Self {
      response: Ok(bytes),
      delay: Some(delay),
      calls: AtomicUsize::new(0),
    })
  }

  pub fn failing(status: u16) -> Arc<Self> {
    Arc::new(Self {
      response: Err(status),
      delay: None,
      calls: AtomicUsize::new(0),
    })
  }

  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl ImageFetcher for MockFetcher {
  async fn fetch(&self, _url: &Url) -> Result<Vec<u8>, FetchError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    if let Some(delay) = self.delay {
      tokio::time::sleep(delay).await;
    }
    match &self.response {
      Ok(bytes) => Ok(bytes.clone()),
      Err(status) => Err(FetchError::Status(*status)),
    }
  }
}

/// 测试配置：字体路径不存在，始终使用内置字体
pub fn test_config() -> ServerConfig {
  ServerConfig {
    addr: "127.0.0.1:0".parse().unwrap(),
    font_path: PathBuf::from("/nonexistent/thermomark-test-font.ttf"),
    fetch_timeout: Duration::from_secs(5),
    request_timeout: Some(Duration::from_secs(30)),
    body_limit: TEST_BODY_LIMIT,
  }
}

pub const TEST_BODY_LIMIT: usize = 16 * 1024;

pub fn build_test_app(fetcher: Arc<dyn ImageFetcher>) -> Router {
  build_test_app_with(test_config(), fetcher)
}

pub fn build_test_app_with(config: ServerConfig, fetcher: Arc<dyn ImageFetcher>) -> Router {
  build_router(AppState::new(config, fetcher))
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
  let image = RgbImage::from_pixel(width, height, Rgb([40, 40, 40]));
  let mut bytes = Vec::new();
  image
    .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
    .unwrap();
  bytes
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
  let request = Request::builder()
    .method(Method::GET)
    .uri(uri)
    .body(Body::empty())
    .unwrap();
  app.oneshot(request).await.unwrap()
}

pub async fn post_raw(app: Router, uri: &str, body: impl Into<Body>) -> Response<Body> {
  let request = Request::builder()
    .method(Method::POST)
    .uri(uri)
    .header("content-type", "application/json")
    .body(body.into())
    .unwrap();
  app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
  post_raw(app, uri, body.to_string()).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
  response
    .into_body()
    .collect()
    .await
    .unwrap()
    .to_bytes()
    .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
  serde_json::from_slice(&body_bytes(response).await).unwrap()
}
