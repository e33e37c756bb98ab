// 该文件是 Thermomark 项目的一部分。
// src/input/http_fetcher.rs - HTTP 图像下载
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};
use url::Url;

use super::{FetchError, ImageFetcher};

/// 基于 reqwest 的下载器，单次请求有固定超时，不重试
#[derive(Debug, Clone)]
pub struct HttpFetcher {
  client: reqwest::Client,
}

impl HttpFetcher {
  pub fn new(timeout: Duration) -> Result<Self, FetchError> {
    let client = reqwest::Client::builder()
      .timeout(timeout)
      .build()
      .map_err(|e| FetchError::Network(e.to_string()))?;
    Ok(Self { client })
  }

  /// 使用预先配置好的客户端（代理、TLS 等）
  pub fn with_client(client: reqwest::Client) -> Self {
    Self { client }
  }
}

impl From<reqwest::Error> for FetchError {
  fn from(err: reqwest::Error) -> Self {
    if err.is_timeout() {
      FetchError::Timeout
    } else if let Some(status) = err.status() {
      FetchError::Status(status.as_u16())
    } else {
      FetchError::Network(err.to_string())
    }
  }
}

#[async_trait]
impl ImageFetcher for HttpFetcher {
  async fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
    info!("下载图像: {}", url);
    let response = self.client.get(url.clone()).send().await?;

    let status = response.status();
    if !status.is_success() {
      warn!("图像下载失败: {} 返回 {}", url, status);
      return Err(FetchError::Status(status.as_u16()));
    }

    let bytes = response.bytes().await?;
    Ok(bytes.to_vec())
  }
}
