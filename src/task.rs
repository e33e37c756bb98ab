// 该文件是 Thermomark 项目的一部分。
// src/task.rs - 单次标注任务
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

use std::path::PathBuf;

use thiserror::Error;
use tracing::{info, warn};

use crate::{
  input::{DecodeError, decode_image},
  model::Defect,
  output::{Annotator, EncodeError, FontSet, encode_png},
};

#[derive(Error, Debug)]
pub enum TaskError {
  #[error("Failed to decode image: {0}")]
  Decode(#[from] DecodeError),
  #[error("Failed to encode image: {0}")]
  Encode(#[from] EncodeError),
}

/// 一次标注所需的全部输入，任务结束即丢弃
///
/// 字体在每次运行时重新加载，不跨请求缓存。
#[derive(Debug, Clone)]
pub struct MarkupTask {
  pub defects: Vec<Defect>,
  pub font_path: PathBuf,
  pub declared_size: (Option<u32>, Option<u32>),
}

impl MarkupTask {
  pub fn new(defects: Vec<Defect>, font_path: PathBuf) -> Self {
    Self {
      defects,
      font_path,
      declared_size: (None, None),
    }
  }

  pub fn with_declared_size(mut self, width: Option<u32>, height: Option<u32>) -> Self {
    self.declared_size = (width, height);
    self
  }

  /// 解码 -> 绘制 -> 编码，返回 PNG 字节
  pub fn run(&self, image_bytes: &[u8]) -> Result<Vec<u8>, TaskError> {
    let now = std::time::Instant::now();
    let base = decode_image(image_bytes)?;
    info!(
      "图像解码完成: {}x{}，耗时: {:.2?}",
      base.width(),
      base.height(),
      now.elapsed()
    );
    self.check_declared_size(base.width(), base.height());

    let annotator = Annotator::new(FontSet::load(&self.font_path));
    info!("开始标注 {} 个缺陷...", self.defects.len());
    let now = std::time::Instant::now();
    let annotated = annotator.render(base, &self.defects);
    info!("标注完成，耗时: {:.2?}", now.elapsed());

    let now = std::time::Instant::now();
    let bytes = encode_png(&annotated)?;
    info!("PNG 编码完成: {} 字节，耗时: {:.2?}", bytes.len(), now.elapsed());
    Ok(bytes)
  }

  fn check_declared_size(&self, width: u32, height: u32) {
    let (declared_width, declared_height) = self.declared_size;
    if declared_width.is_some_and(|w| w != width) || declared_height.is_some_and(|h| h != height) {
      warn!(
        "声明尺寸 {:?}x{:?} 与实际尺寸 {}x{} 不一致，按实际尺寸标注",
        declared_width, declared_height, width, height
      );
    }
  }
}
