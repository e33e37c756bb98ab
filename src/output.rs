// 该文件是 Thermomark 项目的一部分。
// src/output.rs - 标注渲染与输出编码
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

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ImageEncoder, RgbImage};
use thiserror::Error;

pub mod draw;
pub mod font;

pub use self::draw::{Annotator, DrawDefectsOnImage, MarkerLayout};
pub use self::font::{Face, FontSet};

pub const PNG_MIME: &str = "image/png";

#[derive(Error, Debug)]
pub enum EncodeError {
  #[error("图像编码错误: {0}")]
  ImageError(#[from] image::ImageError),
}

/// 将标注结果编码为 PNG
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, EncodeError> {
  let mut bytes = Vec::new();
  let encoder = PngEncoder::new_with_quality(&mut bytes, CompressionType::Best, FilterType::Adaptive);
  encoder.write_image(
    image.as_raw(),
    image.width(),
    image.height(),
    image::ExtendedColorType::Rgb8,
  )?;
  Ok(bytes)
}

/// 附件文件名，包含缺陷数量
pub fn attachment_name(defect_count: usize) -> String {
  format!("thermogram_marked_{defect_count}_defects.png")
}
