// 该文件是 Thermomark 项目的一部分。
// src/model.rs - 缺陷标注数据模型
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

use url::Url;

/// 热像图所示面板的物理宽度（毫米）
pub const PANEL_WIDTH_MM: f64 = 300.0;

/// 像素半径上限，远大于任何可解码的画布
pub const MAX_RADIUS_PX: i32 = 1 << 24;

/// 缺陷未给出直径时使用的默认值（毫米）
pub const DEFAULT_DIAMETER_MM: f64 = 10.0;

/// 调用方给出的单个缺陷
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Defect {
  /// 像素列
  pub x: i32,
  /// 像素行
  pub y: i32,
  /// 物理直径（毫米），恒为正
  pub diameter_mm: f64,
}

impl Defect {
  pub fn new(x: i32, y: i32, diameter_mm: f64) -> Self {
    Self { x, y, diameter_mm }
  }
}

/// 校验后的标注请求
#[derive(Debug, Clone)]
pub struct AnnotationRequest {
  pub image_url: Url,
  /// 非空，顺序即徽章编号顺序
  pub defects: Vec<Defect>,
  /// 调用方声明的尺寸，仅作参考
  pub image_width: Option<u32>,
  pub image_height: Option<u32>,
}

/// 像素/毫米比例，假定图像宽度恰好覆盖 300mm
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalScale {
  pub pixels_per_mm: f64,
}

impl PhysicalScale {
  pub fn from_image_width(width: u32) -> Self {
    Self {
      pixels_per_mm: width as f64 / PANEL_WIDTH_MM,
    }
  }

  /// 直径换算为整数像素半径，四舍五入（远离零），上限为 [`MAX_RADIUS_PX`]
  pub fn radius_px(&self, diameter_mm: f64) -> i32 {
    (diameter_mm * self.pixels_per_mm / 2.0)
      .round()
      .clamp(0.0, MAX_RADIUS_PX as f64) as i32
  }
}

mod request;
pub use self::request::{RequestError, parse_defects, validate_request};
