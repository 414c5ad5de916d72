// 该文件是 Biaozhu （标注） 项目的一部分。
// src/output/draw.rs - 将标注烧录到图像上
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

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use imageproc::{
  drawing::{Blend, draw_filled_rect_mut, draw_text_mut, text_size},
  rect::Rect,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::{annotation::Annotation, frame::SourceImage, model::RelativeBox};

// 文本渲染常量
const LABEL_FONT_SIZE: f32 = 12.0;
const LABEL_BOX_HEIGHT: u32 = 16;
const LABEL_BOX_RISE: i32 = 18; // 标签背景顶部到边框上沿的距离
const LABEL_PADDING: u32 = 8;
const LABEL_TEXT_OFFSET_X: i32 = 4;
const LABEL_TEXT_BASELINE_RISE: i32 = 6;
const LINE_WIDTH: u32 = 2;
const LABEL_BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 153]); // rgba(0, 0, 0, 0.6)
const LABEL_TEXT_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

#[derive(Error, Debug)]
pub enum DrawError {
  #[error("字体文件读取错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("字体文件无效: {0}")]
  InvalidFont(#[from] ab_glyph::InvalidFont),
}

/// 像素坐标边界框
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBox {
  pub x_min: i32,
  pub y_min: i32,
  pub x_max: i32,
  pub y_max: i32,
}

impl PixelBox {
  /// 以图像固有尺寸换算相对坐标，四舍五入到整像素
  pub fn from_relative(bbox: &RelativeBox, width: u32, height: u32) -> Self {
    let (w, h) = (width as f64, height as f64);
    Self {
      x_min: (bbox.xmin * w).round() as i32,
      y_min: (bbox.ymin * h).round() as i32,
      x_max: (bbox.xmax * w).round() as i32,
      y_max: (bbox.ymax * h).round() as i32,
    }
  }
}

pub struct Draw {
  font: FontArc,
  font_size: f32,
}

impl Default for Draw {
  fn default() -> Self {
    let font_data: &'static [u8] = include_bytes!("../../assets/DejaVuSans.ttf"); // default font
    let font = FontArc::try_from_slice(font_data).expect("无法加载嵌入的字体文件");
    Self::with_font(font)
  }
}

impl Draw {
  pub fn with_font(font: FontArc) -> Self {
    Self {
      font,
      font_size: LABEL_FONT_SIZE,
    }
  }

  pub fn with_font_file(path: impl AsRef<Path>) -> Result<Self, DrawError> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    let font = FontArc::try_from_vec(data)?;
    info!("加载标签字体: {}", path.display());
    Ok(Self::with_font(font))
  }

  /// 标签文本宽度（像素）
  pub fn measure_text(&self, text: &str) -> u32 {
    text_size(PxScale::from(self.font_size), &self.font, text).0
  }

  /// 以原始分辨率复制源图像，并把所有标注烧录上去
  pub fn flatten(&self, image: &SourceImage, annotations: &[Annotation]) -> RgbaImage {
    let mut canvas = image.pixels().clone();
    debug!("烧录 {} 个标注", annotations.len());
    for annotation in annotations {
      canvas = self.draw_annotation(canvas, annotation);
    }
    canvas
  }

  fn draw_annotation(&self, mut canvas: RgbaImage, annotation: &Annotation) -> RgbaImage {
    let px = PixelBox::from_relative(&annotation.bbox, canvas.width(), canvas.height());

    // 2 像素线宽，以边框线为中心
    let half = (LINE_WIDTH / 2) as i32;
    let outer_w = (px.x_max - px.x_min).unsigned_abs() + LINE_WIDTH;
    let outer_h = (px.y_max - px.y_min).unsigned_abs() + LINE_WIDTH;
    let edges = [
      Rect::at(px.x_min - half, px.y_min - half).of_size(outer_w, LINE_WIDTH),
      Rect::at(px.x_min - half, px.y_max - half).of_size(outer_w, LINE_WIDTH),
      Rect::at(px.x_min - half, px.y_min - half).of_size(LINE_WIDTH, outer_h),
      Rect::at(px.x_max - half, px.y_min - half).of_size(LINE_WIDTH, outer_h),
    ];
    for edge in edges {
      draw_filled_rect_mut(&mut canvas, edge, annotation.color);
    }

    // 标签背景位于边框上方，不做边界修正，靠近顶部时会画到画布外
    let label_width = self.measure_text(&annotation.label) + LABEL_PADDING;
    let background =
      Rect::at(px.x_min, px.y_min - LABEL_BOX_RISE).of_size(label_width, LABEL_BOX_HEIGHT);
    let mut blended = Blend(canvas);
    draw_filled_rect_mut(&mut blended, background, LABEL_BACKGROUND);
    let mut canvas = blended.0;

    let scale = PxScale::from(self.font_size);
    let ascent = self.font.as_scaled(scale).ascent().round() as i32;
    let baseline = px.y_min - LABEL_TEXT_BASELINE_RISE;
    draw_text_mut(
      &mut canvas,
      LABEL_TEXT_COLOR,
      px.x_min + LABEL_TEXT_OFFSET_X,
      baseline - ascent,
      scale,
      &self.font,
      &annotation.label,
    );

    canvas
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::annotation::ACCENT_COLOR;

  const GREY: Rgba<u8> = Rgba([128, 128, 128, 255]);

  fn grey_image(w: u32, h: u32) -> SourceImage {
    SourceImage::new(RgbaImage::from_pixel(w, h, GREY))
  }

  fn annotation(label: &str, bbox: RelativeBox) -> Annotation {
    Annotation {
      label: label.to_string(),
      score: 0.9,
      bbox,
      color: ACCENT_COLOR,
    }
  }

  #[test]
  fn pixel_box_scales_with_natural_size() {
    let px = PixelBox::from_relative(&RelativeBox::new(0.1, 0.2, 0.5, 0.6), 800, 600);
    assert_eq!(
      px,
      PixelBox {
        x_min: 80,
        y_min: 120,
        x_max: 400,
        y_max: 360
      }
    );
  }

  #[test]
  fn pixel_box_rounds_to_nearest() {
    let px = PixelBox::from_relative(&RelativeBox::new(0.333, 0.5, 0.667, 0.75), 10, 3);
    assert_eq!((px.x_min, px.y_min, px.x_max, px.y_max), (3, 2, 7, 2));
  }

  #[test]
  fn strokes_two_pixel_border_on_box_edges() {
    let draw = Draw::default();
    let out = draw.flatten(
      &grey_image(800, 600),
      &[annotation("cat", RelativeBox::new(0.1, 0.2, 0.5, 0.6))],
    );

    assert_eq!(out.dimensions(), (800, 600));
    for x in [79, 80, 399, 400] {
      assert_eq!(*out.get_pixel(x, 240), ACCENT_COLOR, "column {x}");
    }
    for y in [119, 120, 359, 360] {
      assert_eq!(*out.get_pixel(240, y), ACCENT_COLOR, "row {y}");
    }
    assert_eq!(*out.get_pixel(78, 240), GREY);
    assert_eq!(*out.get_pixel(81, 240), GREY);
    assert_eq!(*out.get_pixel(240, 240), GREY);
    assert_eq!(*out.get_pixel(401, 240), GREY);
  }

  #[test]
  fn label_background_sits_above_box() {
    let draw = Draw::default();
    let out = draw.flatten(
      &grey_image(800, 600),
      &[annotation("cat", RelativeBox::new(0.1, 0.2, 0.5, 0.6))],
    );
    // 背景范围 x: 80..80+w+8, y: 102..118
    let right = 80 + draw.measure_text("cat") + 8;
    let shaded = *out.get_pixel(82, 110);
    assert!(shaded[0] < GREY[0]);
    assert_eq!(shaded[0], shaded[1]);
    assert_eq!(shaded[3], 255);
    assert_eq!(*out.get_pixel(85, 101), GREY);
    assert_eq!(*out.get_pixel(85, 118), GREY);
    assert_eq!(*out.get_pixel(right, 102), GREY);
    assert_ne!(*out.get_pixel(right - 1, 102), GREY);
  }

  #[test]
  fn label_text_is_white_inside_background() {
    let draw = Draw::default();
    let out = draw.flatten(
      &grey_image(800, 600),
      &[annotation("cat", RelativeBox::new(0.1, 0.2, 0.5, 0.6))],
    );
    let right = 80 + draw.measure_text("cat") + 8;
    let brightest = (84..right)
      .flat_map(|x| (102..118).map(move |y| (x, y)))
      .map(|(x, y)| out.get_pixel(x, y)[0])
      .max()
      .unwrap();
    // 背景混合后约为 51，白色文字明显更亮
    assert!(brightest > 150, "brightest label pixel {brightest}");
    assert!((80..84).all(|x| out.get_pixel(x, 110)[0] < GREY[0]));
  }

  #[test]
  fn full_image_box_is_clipped_without_overflow() {
    let draw = Draw::default();
    let out = draw.flatten(
      &grey_image(100, 50),
      &[annotation("everything", RelativeBox::new(0.0, 0.0, 1.0, 1.0))],
    );
    assert_eq!(*out.get_pixel(0, 25), ACCENT_COLOR);
    assert_eq!(*out.get_pixel(99, 25), ACCENT_COLOR);
    assert_eq!(*out.get_pixel(50, 0), ACCENT_COLOR);
    assert_eq!(*out.get_pixel(50, 49), ACCENT_COLOR);
    assert_eq!(*out.get_pixel(50, 25), GREY);
  }

  #[test]
  fn no_annotations_keeps_source_pixels() {
    let source = grey_image(16, 9);
    let out = Draw::default().flatten(&source, &[]);
    assert_eq!(&out, source.pixels());
  }

  #[test]
  fn zero_area_box_is_still_stroked() {
    let out = Draw::default().flatten(
      &grey_image(40, 40),
      &[annotation("dot", RelativeBox::new(0.5, 0.5, 0.5, 0.5))],
    );
    assert_eq!(*out.get_pixel(19, 19), ACCENT_COLOR);
    assert_eq!(*out.get_pixel(20, 20), ACCENT_COLOR);
    assert_eq!(*out.get_pixel(21, 21), GREY);
  }

  #[test]
  fn label_width_is_measured_from_glyphs() {
    let draw = Draw::default();
    let cat = draw.measure_text("cat");
    assert!(cat > 0);
    assert!(draw.measure_text("category") > cat);
    assert!(draw.measure_text("WWW") > draw.measure_text("iii"));
  }

  #[test]
  fn font_file_errors_are_reported() {
    assert!(matches!(
      Draw::with_font_file("/no/such/font.ttf"),
      Err(DrawError::IoError(_))
    ));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.ttf");
    std::fs::write(&path, b"not a font").unwrap();
    assert!(matches!(
      Draw::with_font_file(&path),
      Err(DrawError::InvalidFont(_))
    ));
  }
}
