// 该文件是 Biaozhu （标注） 项目的一部分。
// src/output/overlay.rs - 百分比定位的屏幕叠加层
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

use crate::{annotation::Annotation, model::RelativeBox};

pub const LABEL_BACKGROUND_CSS: &str = "rgba(0, 0, 0, 0.6)";

/// 相对图像渲染区域的百分比位置
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayBox {
  pub left: f64,
  pub top: f64,
  pub width: f64,
  pub height: f64,
}

impl From<&RelativeBox> for OverlayBox {
  fn from(bbox: &RelativeBox) -> Self {
    Self {
      left: 100.0 * bbox.xmin,
      top: 100.0 * bbox.ymin,
      width: 100.0 * (bbox.xmax - bbox.xmin),
      height: 100.0 * (bbox.ymax - bbox.ymin),
    }
  }
}

/// 一个叠加层元素，保留其来源标注
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayElement {
  pub annotation: Annotation,
  pub geometry: OverlayBox,
}

impl OverlayElement {
  pub fn new(annotation: &Annotation) -> Self {
    Self {
      geometry: OverlayBox::from(&annotation.bbox),
      annotation: annotation.clone(),
    }
  }

  pub fn box_style(&self) -> String {
    let OverlayBox {
      left,
      top,
      width,
      height,
    } = self.geometry;
    format!(
      "border-color: {}; left: {left}%; top: {top}%; width: {width}%; height: {height}%;",
      self.annotation.css_color()
    )
  }

  pub fn label_style(&self) -> String {
    format!("background-color: {LABEL_BACKGROUND_CSS};")
  }

  pub fn label(&self) -> &str {
    &self.annotation.label
  }
}

/// 按标注顺序生成叠加层
pub fn render_overlay(annotations: &[Annotation]) -> Vec<OverlayElement> {
  annotations.iter().map(OverlayElement::new).collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::annotation::ACCENT_COLOR;

  const EPS: f64 = 1e-9;

  fn annotation(bbox: RelativeBox) -> Annotation {
    Annotation {
      label: "cat".to_string(),
      score: 0.99,
      bbox,
      color: ACCENT_COLOR,
    }
  }

  #[test]
  fn cat_scenario_percentages() {
    let element = OverlayElement::new(&annotation(RelativeBox::new(0.1, 0.2, 0.5, 0.6)));
    let g = element.geometry;
    assert!((g.left - 10.0).abs() < EPS);
    assert!((g.top - 20.0).abs() < EPS);
    assert!((g.width - 40.0).abs() < EPS);
    assert!((g.height - 40.0).abs() < EPS);
  }

  #[test]
  fn percentages_stay_in_range_and_close_the_box() {
    let steps = [0.0, 0.05, 0.1, 0.25, 1.0 / 3.0, 0.5, 0.6, 0.75, 0.9, 1.0];
    for &xmin in &steps {
      for &xmax in steps.iter().filter(|&&v| v >= xmin) {
        for &ymin in &steps {
          for &ymax in steps.iter().filter(|&&v| v >= ymin) {
            let g = OverlayBox::from(&RelativeBox::new(xmin, ymin, xmax, ymax));
            for v in [g.left, g.top, g.width, g.height] {
              assert!((-EPS..=100.0 + EPS).contains(&v), "{v} out of range");
            }
            assert!((g.left + g.width - 100.0 * xmax).abs() < EPS);
            assert!((g.top + g.height - 100.0 * ymax).abs() < EPS);
          }
        }
      }
    }
  }

  #[test]
  fn elements_keep_their_annotation_and_order() {
    let first = annotation(RelativeBox::new(0.0, 0.0, 0.5, 0.5));
    let mut second = annotation(RelativeBox::new(0.5, 0.5, 1.0, 1.0));
    second.label = "dog".to_string();

    let overlay = render_overlay(&[first.clone(), second.clone()]);
    assert_eq!(overlay.len(), 2);
    assert_eq!(overlay[0].annotation, first);
    assert_eq!(overlay[1].annotation, second);
    assert_eq!(overlay[1].label(), "dog");
  }

  #[test]
  fn styles_use_accent_and_percentages() {
    let element = OverlayElement::new(&annotation(RelativeBox::new(0.0, 0.25, 0.5, 1.0)));
    assert_eq!(
      element.box_style(),
      "border-color: #00CFFF; left: 0%; top: 25%; width: 50%; height: 75%;"
    );
    assert_eq!(element.label_style(), "background-color: rgba(0, 0, 0, 0.6);");
  }
}
