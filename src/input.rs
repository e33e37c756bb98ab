// 该文件是 Thermomark 项目的一部分。
// src/input.rs - 热像图获取与解码
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

use std::io::Cursor;

use async_trait::async_trait;
use image::{ImageReader, RgbImage};
use thiserror::Error;
use url::Url;

mod http_fetcher;
pub use self::http_fetcher::HttpFetcher;

#[derive(Error, Debug)]
pub enum FetchError {
  #[error("Failed to download image: request timed out")]
  Timeout,
  #[error("Failed to download image: HTTP status {0}")]
  Status(u16),
  #[error("Failed to download image: {0}")]
  Network(String),
}

#[derive(Error, Debug)]
pub enum DecodeError {
  #[error("I/O error: {0}")]
  IoError(#[from] std::io::Error),
  #[error("Image decoding error: {0}")]
  ImageError(#[from] image::ImageError),
}

/// 远程图像获取接口
#[async_trait]
pub trait ImageFetcher: Send + Sync {
  /// 下载原始字节，非 2xx 状态、超时与网络错误均视为失败
  async fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError>;
}

/// 将原始字节解码为 RGB 图像，格式由内容推断
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage, DecodeError> {
  let image = ImageReader::new(Cursor::new(bytes))
    .with_guessed_format()?
    .decode()?;
  Ok(image.to_rgb8())
}
