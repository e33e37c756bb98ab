// 该文件是 Thermomark 项目的一部分。
// src/output/font.rs - 标注字体（两级查找）
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

use std::path::Path;

use ab_glyph::{Font, FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_FONT_PATH: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf";

// 字号（像素）
pub const LABEL_FONT_SIZE: f32 = 22.0;
pub const NUMBER_FONT_SIZE: f32 = 26.0;

// 内置点阵字体：5x7 字形，字间留 1 列
const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;
const GLYPH_ADVANCE: u32 = GLYPH_WIDTH + 1;
const BUILTIN_PX_PER_BLOCK: f32 = 10.0;

#[derive(Error, Debug)]
pub enum FontError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("字体文件无效: {0}")]
  InvalidFont(#[from] ab_glyph::InvalidFont),
}

/// 当前生效的字形来源
///
/// 几何计算只通过 [`Face::measure`] 与 [`Face::draw`] 访问字体，
/// 不关心具体是哪一级。
#[derive(Clone)]
pub enum Face {
  TrueType { font: FontArc, scale: PxScale },
  Builtin { block: u32 },
}

impl Face {
  /// size 为每 em 的像素数，与常见排版工具的字号含义一致
  pub fn truetype(font: FontArc, size: f32) -> Self {
    let scale = em_scale(&font, size);
    Face::TrueType { font, scale }
  }

  pub fn builtin(size: f32) -> Self {
    Face::Builtin {
      block: ((size / BUILTIN_PX_PER_BLOCK).round() as u32).max(1),
    }
  }

  pub fn is_builtin(&self) -> bool {
    matches!(self, Face::Builtin { .. })
  }

  /// 文本渲染后的包围盒尺寸 (宽, 高)
  pub fn measure(&self, text: &str) -> (u32, u32) {
    match self {
      Face::TrueType { font, scale } => text_size(*scale, font, text),
      Face::Builtin { block } => {
        let count = text.chars().count() as u32;
        if count == 0 {
          return (0, 0);
        }
        ((count * GLYPH_ADVANCE - 1) * block, GLYPH_HEIGHT * block)
      }
    }
  }

  /// 以 (x, y) 为左上角绘制文本，超出画布部分被裁剪
  pub fn draw(&self, image: &mut RgbImage, color: Rgb<u8>, x: i32, y: i32, text: &str) {
    match self {
      Face::TrueType { font, scale } => draw_text_mut(image, color, x, y, *scale, font, text),
      Face::Builtin { block } => draw_builtin_text(image, color, x, y, *block as i32, text),
    }
  }
}

impl std::fmt::Debug for Face {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Face::TrueType { scale, .. } => write!(f, "TrueType({}px)", scale.y),
      Face::Builtin { block } => write!(f, "Builtin(x{block})"),
    }
  }
}

/// 一次请求使用的两种字号
#[derive(Debug, Clone)]
pub struct FontSet {
  pub label: Face,
  pub number: Face,
}

impl FontSet {
  /// 先尝试加载指定路径的 TrueType 字体，失败时退回内置点阵字体
  pub fn load(path: &Path) -> Self {
    match load_truetype(path) {
      Ok(font) => {
        debug!("已加载字体: {}", path.display());
        FontSet {
          label: Face::truetype(font.clone(), LABEL_FONT_SIZE),
          number: Face::truetype(font, NUMBER_FONT_SIZE),
        }
      }
      Err(e) => {
        warn!("字体加载失败 ({}): {}，使用内置字体", path.display(), e);
        FontSet::builtin()
      }
    }
  }

  pub fn builtin() -> Self {
    FontSet {
      label: Face::builtin(LABEL_FONT_SIZE),
      number: Face::builtin(NUMBER_FONT_SIZE),
    }
  }
}

// PxScale 指定的是字形高度（ascent - descent），需按 em 换算
fn em_scale(font: &FontArc, size: f32) -> PxScale {
  match font.units_per_em() {
    Some(units_per_em) if units_per_em > 0.0 => {
      PxScale::from(size * font.height_unscaled() / units_per_em)
    }
    _ => PxScale::from(size),
  }
}

fn load_truetype(path: &Path) -> Result<FontArc, FontError> {
  let data = std::fs::read(path)?;
  Ok(FontArc::try_from_vec(data)?)
}

fn glyph(c: char) -> [u8; GLYPH_HEIGHT as usize] {
  match c {
    '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
    '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
    '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
    '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
    '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
    '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
    '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
    '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
    '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
    '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
    '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
    'm' => [0x00, 0x00, 0x1A, 0x15, 0x15, 0x11, 0x11],
    ' ' => [0x00; GLYPH_HEIGHT as usize],
    _ => [0x1F, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1F],
  }
}

fn draw_builtin_text(image: &mut RgbImage, color: Rgb<u8>, x: i32, y: i32, block: i32, text: &str) {
  // 按 i64 计算，锚点位于 i32 边界时也不会溢出
  let (w, h) = (image.width() as i64, image.height() as i64);
  let (x, y, block) = (x as i64, y as i64, block as i64);

  for (i, c) in text.chars().enumerate() {
    let origin_x = x + i as i64 * GLYPH_ADVANCE as i64 * block;
    for (row, bits) in glyph(c).iter().enumerate() {
      for col in 0..GLYPH_WIDTH as i64 {
        if bits & (0x10 >> col) == 0 {
          continue;
        }
        let px = origin_x + col * block;
        let py = y + row as i64 * block;
        for dy in 0..block {
          for dx in 0..block {
            let (tx, ty) = (px + dx, py + dy);
            if tx >= 0 && ty >= 0 && tx < w && ty < h {
              image.put_pixel(tx as u32, ty as u32, color);
            }
          }
        }
      }
    }
  }
}
