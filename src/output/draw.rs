// 该文件是 Thermomark 项目的一部分。
// src/output/draw.rs - 缺陷标注渲染
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

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use tracing::debug;

use crate::model::{Defect, PhysicalScale};
use crate::output::font::FontSet;

// 标注常量
const MARKER_COLOR: Rgb<u8> = Rgb([255, 0, 0]); // 红色
const MARKER_STROKE: i32 = 5;
const LABEL_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const LABEL_BACKGROUND: Rgb<u8> = Rgb([0, 0, 0]);
const LABEL_GAP: i32 = 10; // 标签底部与圆顶的间距
const LABEL_PADDING_X: i32 = 5;
const LABEL_PADDING_Y: i32 = 3;
pub const BADGE_RADIUS: i32 = 25;
const BADGE_STROKE: i32 = 3;
const BADGE_FILL: Rgb<u8> = Rgb([255, 255, 255]);
const BADGE_OUTLINE: Rgb<u8> = Rgb([0, 0, 0]);
const INDEX_COLOR: Rgb<u8> = Rgb([0, 0, 0]);
const INDEX_NUDGE: i32 = 2;

/// 单个缺陷的标注几何，只依赖缺陷本身、序号、比例与字体
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerLayout {
  pub center: (i32, i32),
  /// 缺陷圆半径（像素）
  pub radius: i32,
  pub label: String,
  pub label_anchor: (i32, i32),
  pub label_background: Rect,
  pub badge_radius: i32,
  /// 1 起始的序号文本
  pub index: String,
  pub index_anchor: (i32, i32),
}

impl MarkerLayout {
  pub fn compute(defect: &Defect, position: usize, scale: PhysicalScale, fonts: &FontSet) -> Self {
    let Defect { x, y, diameter_mm } = *defect;
    let radius = scale.radius_px(diameter_mm);

    let label = format!("{:.1}mm", diameter_mm);
    let (text_width, text_height) = fonts.label.measure(&label);
    let (text_width, text_height) = (text_width as i32, text_height as i32);
    // 坐标可达 i32 边界，一律饱和运算
    let label_x = x.saturating_sub(text_width / 2);
    let label_y = y
      .saturating_sub(radius)
      .saturating_sub(text_height)
      .saturating_sub(LABEL_GAP);

    // 背景矩形的四个边界均包含在内
    let label_background = Rect::at(
      label_x.saturating_sub(LABEL_PADDING_X),
      label_y.saturating_sub(LABEL_PADDING_Y),
    )
    .of_size(
      (text_width + 2 * LABEL_PADDING_X + 1) as u32,
      (text_height + 2 * LABEL_PADDING_Y + 1) as u32,
    );

    let index = (position + 1).to_string();
    let (index_width, index_height) = fonts.number.measure(&index);
    let index_anchor = (
      x.saturating_sub(index_width as i32 / 2),
      y.saturating_sub(index_height as i32 / 2)
        .saturating_sub(INDEX_NUDGE),
    );

    MarkerLayout {
      center: (x, y),
      radius,
      label,
      label_anchor: (label_x, label_y),
      label_background,
      badge_radius: BADGE_RADIUS,
      index,
      index_anchor,
    }
  }
}

pub trait DrawDefectsOnImage {
  fn draw_defects_on_image(&self, image: &mut RgbImage, defects: &[Defect]);
}

/// 缺陷标注渲染器
///
/// 按输入顺序逐个绘制，后绘制的缺陷覆盖先绘制的像素，
/// 不做任何避让。
pub struct Annotator {
  fonts: FontSet,
}

impl Annotator {
  pub fn new(fonts: FontSet) -> Self {
    Self { fonts }
  }

  /// 计算整批缺陷的几何，比例只计算一次
  pub fn layout(&self, image_width: u32, defects: &[Defect]) -> Vec<MarkerLayout> {
    let scale = PhysicalScale::from_image_width(image_width);
    defects
      .iter()
      .enumerate()
      .map(|(i, defect)| MarkerLayout::compute(defect, i, scale, &self.fonts))
      .collect()
  }

  /// 在工作副本上绘制并返回，画布尺寸不变
  pub fn render(&self, base: RgbImage, defects: &[Defect]) -> RgbImage {
    let mut image = base;
    self.draw_defects_on_image(&mut image, defects);
    image
  }

  fn draw_marker(&self, image: &mut RgbImage, layout: &MarkerLayout) {
    draw_ring_mut(
      image,
      layout.center,
      layout.radius,
      Some(MARKER_STROKE),
      MARKER_COLOR,
    );

    let background = layout.label_background;
    if intersects_canvas(
      image,
      background.left(),
      background.top(),
      background.width(),
      background.height(),
    ) {
      draw_filled_rect_mut(image, background, LABEL_BACKGROUND);
      let (label_x, label_y) = layout.label_anchor;
      self
        .fonts
        .label
        .draw(image, LABEL_COLOR, label_x, label_y, &layout.label);
    }

    draw_ring_mut(image, layout.center, layout.badge_radius, None, BADGE_FILL);
    draw_ring_mut(
      image,
      layout.center,
      layout.badge_radius,
      Some(BADGE_STROKE),
      BADGE_OUTLINE,
    );

    let (index_x, index_y) = layout.index_anchor;
    let (index_width, index_height) = self.fonts.number.measure(&layout.index);
    if intersects_canvas(image, index_x, index_y, index_width, index_height) {
      self
        .fonts
        .number
        .draw(image, INDEX_COLOR, index_x, index_y, &layout.index);
    }
  }
}

/// 矩形是否与画布相交，按 i64 计算以免越界坐标溢出
fn intersects_canvas(image: &RgbImage, left: i32, top: i32, width: u32, height: u32) -> bool {
  let (left, top) = (left as i64, top as i64);
  left < image.width() as i64
    && top < image.height() as i64
    && left + width as i64 > 0
    && top + height as i64 > 0
}

impl DrawDefectsOnImage for Annotator {
  fn draw_defects_on_image(&self, image: &mut RgbImage, defects: &[Defect]) {
    for layout in self.layout(image.width(), defects) {
      debug!(
        "缺陷 {}: 中心=({}, {}), 直径标签={}, 半径={}px",
        layout.index, layout.center.0, layout.center.1, layout.label, layout.radius
      );
      self.draw_marker(image, &layout);
    }
  }
}

/// 绘制圆环，stroke 为 None 时绘制实心圆
///
/// 圆环从外半径向内延伸 stroke 像素：像素满足
/// `(r - stroke)^2 < dx^2 + dy^2 <= r^2` 时着色。
fn draw_ring_mut(
  image: &mut RgbImage,
  center: (i32, i32),
  radius: i32,
  stroke: Option<i32>,
  color: Rgb<u8>,
) {
  if radius < 0 {
    return;
  }
  let (w, h) = (image.width() as i64, image.height() as i64);
  let (cx, cy) = (center.0 as i64, center.1 as i64);
  let outer = radius as i64;
  let inner = stroke.map(|s| outer - s as i64).filter(|r| *r >= 0);

  let y_range = (cy - outer).max(0)..=(cy + outer).min(h - 1);
  let x_range = (cx - outer).max(0)..=(cx + outer).min(w - 1);

  for py in y_range {
    for px in x_range.clone() {
      let (dx, dy) = (px - cx, py - cy);
      let d2 = dx * dx + dy * dy;
      if d2 > outer * outer {
        continue;
      }
      if let Some(inner) = inner
        && d2 <= inner * inner
      {
        continue;
      }
      image.put_pixel(px as u32, py as u32, color);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const RED: [u8; 3] = [255, 0, 0];
  const BLACK: [u8; 3] = [0, 0, 0];
  const WHITE: [u8; 3] = [255, 255, 255];
  const GRAY: [u8; 3] = [128, 128, 128];

  fn gray(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb(GRAY))
  }

  fn annotator() -> Annotator {
    Annotator::new(FontSet::builtin())
  }

  #[test]
  fn marker_radius_is_pixel_exact() {
    // 900px -> 3 px/mm, 35mm -> 52.5 -> 53px
    let image = annotator().render(gray(900, 600), &[Defect::new(450, 300, 35.0)]);

    assert_eq!(image.get_pixel(450 + 53, 300).0, RED);
    assert_eq!(image.get_pixel(450 + 54, 300).0, GRAY);
    assert_eq!(image.get_pixel(450 - 53, 300).0, RED);
    assert_eq!(image.get_pixel(450, 300 + 53).0, RED);
    // 线宽 5：半径 49..=53 着色
    assert_eq!(image.get_pixel(450 + 49, 300).0, RED);
    assert_eq!(image.get_pixel(450 + 48, 300).0, GRAY);
  }

  #[test]
  fn badge_radius_is_fixed() {
    for diameter in [1.0, 20.0, 80.0] {
      let image = annotator().render(gray(900, 900), &[Defect::new(450, 450, diameter)]);
      // 黑色描边 23..=25，内部白色
      assert_eq!(image.get_pixel(450 + 25, 450).0, BLACK, "diameter {diameter}");
      assert_eq!(image.get_pixel(450 + 23, 450).0, BLACK, "diameter {diameter}");
      assert_eq!(image.get_pixel(450 + 22, 450).0, WHITE, "diameter {diameter}");
      assert_eq!(image.get_pixel(450, 450 + 20).0, WHITE, "diameter {diameter}");
    }

    let layouts = annotator().layout(900, &[Defect::new(1, 1, 0.5), Defect::new(1, 1, 200.0)]);
    assert!(layouts.iter().all(|l| l.badge_radius == 25));
  }

  #[test]
  fn label_sits_above_marker() {
    let layout = &annotator().layout(900, &[Defect::new(450, 300, 35.0)])[0];

    assert_eq!(layout.label, "35.0mm");
    // 内置字体: "35.0mm" 宽 70，高 14
    assert_eq!(layout.label_anchor, (450 - 35, 300 - 53 - 14 - 10));
    assert_eq!(layout.label_background, Rect::at(410, 220).of_size(81, 21));

    let image = annotator().render(gray(900, 600), &[Defect::new(450, 300, 35.0)]);
    assert_eq!(image.get_pixel(410, 220).0, BLACK);
    assert_eq!(image.get_pixel(490, 240).0, BLACK);
    assert_eq!(image.get_pixel(409, 220).0, GRAY);
    assert_eq!(image.get_pixel(491, 240).0, GRAY);

    let label_has_red = (223..237).any(|y| (415..485).any(|x| image.get_pixel(x, y).0 == RED));
    assert!(label_has_red);
  }

  #[test]
  fn label_uses_one_decimal() {
    let layouts = annotator().layout(300, &[Defect::new(0, 0, 12.34), Defect::new(0, 0, 10.0)]);
    assert_eq!(layouts[0].label, "12.3mm");
    assert_eq!(layouts[1].label, "10.0mm");
  }

  #[test]
  fn index_is_positional() {
    let defects = vec![Defect::new(10, 10, 99.0); 12];
    let layouts = annotator().layout(640, &defects);
    for (k, layout) in layouts.iter().enumerate() {
      assert_eq!(layout.index, (k + 1).to_string());
    }
  }

  #[test]
  fn index_is_centered_with_nudge() {
    let layout = &annotator().layout(900, &[Defect::new(100, 200, 5.0)])[0];
    // 内置数字字体: "1" 宽 15，高 21
    assert_eq!(layout.index_anchor, (100 - 7, 200 - 10 - 2));
  }

  #[test]
  fn later_defects_draw_on_top() {
    let a = Defect::new(300, 300, 30.0);
    let far = Defect::new(700, 700, 30.0);

    let stacked = annotator().render(gray(900, 900), &[a, a]);
    let separate = annotator().render(gray(900, 900), &[far, a]);
    let only_first = annotator().render(gray(900, 900), &[a]);

    let badge = |image: &RgbImage| -> Vec<[u8; 3]> {
      (275..=325)
        .flat_map(|y| (275..=325).map(move |x| (x, y)))
        .map(|(x, y)| image.get_pixel(x, y).0)
        .collect()
    };

    // 同一位置的第二个缺陷徽章显示 "2"，覆盖第一个的 "1"
    assert_eq!(badge(&stacked), badge(&separate));
    assert_ne!(badge(&stacked), badge(&only_first));
  }

  #[test]
  fn canvas_is_never_resized_and_offscreen_defects_are_clipped() {
    let defects = [
      Defect::new(-100, -100, 40.0),
      Defect::new(5000, 20, 10.0),
      Defect::new(0, 0, 300.0),
    ];
    let image = annotator().render(gray(120, 80), &defects);
    assert_eq!(image.dimensions(), (120, 80));
  }

  #[test]
  fn extreme_inputs_do_not_overflow() {
    let defects = [
      Defect::new(0, 0, 1e12),
      Defect::new(i32::MIN, 10, 10.0),
      Defect::new(i32::MAX, i32::MAX, 10.0),
      Defect::new(i32::MIN, i32::MIN, 1e12),
      Defect::new(i32::MAX, i32::MIN, f64::MAX),
    ];
    let image = annotator().render(RgbImage::new(300, 300), &defects);
    assert_eq!(image.dimensions(), (300, 300));

    let layout = &annotator().layout(300, &defects[3..4])[0];
    assert_eq!(layout.label_anchor.1, i32::MIN);
    assert_eq!(layout.label_background.top(), i32::MIN);
  }

  #[test]
  fn huge_marker_still_draws_visible_badge() {
    let image = annotator().render(gray(300, 300), &[Defect::new(150, 150, 1e12)]);
    // 圆环远在画布之外，徽章照常绘制
    assert_eq!(image.get_pixel(150 + 20, 150).0, WHITE);
    assert_eq!(image.get_pixel(0, 0).0, GRAY);
  }

  #[test]
  fn ring_with_zero_radius_marks_center() {
    let mut image = gray(5, 5);
    draw_ring_mut(&mut image, (2, 2), 0, Some(5), Rgb(RED));
    assert_eq!(image.get_pixel(2, 2).0, RED);
    assert_eq!(image.get_pixel(1, 2).0, GRAY);
  }
}
