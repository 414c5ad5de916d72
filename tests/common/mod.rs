// 该文件是 Biaozhu （标注） 项目的一部分。
// tests/common/mod.rs - 测试辅助
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

#![allow(dead_code)]

use std::cell::Cell;

use biaozhu::{
  frame::SourceImage,
  model::{DetectOptions, Detection, Detector, RelativeBox},
};
use image::{Rgba, RgbaImage};
use thiserror::Error;

/// 返回固定结果的检测器，并记录收到的参数
pub struct StaticDetector {
  pub detections: Vec<Detection>,
  pub calls: Cell<usize>,
  pub last_options: Cell<Option<DetectOptions>>,
}

impl StaticDetector {
  pub fn new(detections: Vec<Detection>) -> Self {
    Self {
      detections,
      calls: Cell::new(0),
      last_options: Cell::new(None),
    }
  }
}

impl Detector for StaticDetector {
  type Error = std::convert::Infallible;

  async fn detect(
    &self,
    _image: &SourceImage,
    options: &DetectOptions,
  ) -> Result<Vec<Detection>, Self::Error> {
    self.calls.set(self.calls.get() + 1);
    self.last_options.set(Some(*options));
    Ok(self.detections.clone())
  }
}

#[derive(Error, Debug)]
#[error("模型推理失败")]
pub struct DetectorDown;

pub struct FailingDetector;

impl Detector for FailingDetector {
  type Error = DetectorDown;

  async fn detect(
    &self,
    _image: &SourceImage,
    _options: &DetectOptions,
  ) -> Result<Vec<Detection>, Self::Error> {
    Err(DetectorDown)
  }
}

pub fn detection(label: &str, xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Detection {
  Detection {
    label: label.to_string(),
    score: 0.9,
    bbox: RelativeBox::new(xmin, ymin, xmax, ymax),
  }
}

pub fn cat() -> Detection {
  detection("cat", 0.1, 0.2, 0.5, 0.6)
}

/// 带渐变的测试图像，避免纯色掩盖绘制错误
pub fn gradient(w: u32, h: u32) -> SourceImage {
  SourceImage::new(RgbaImage::from_fn(w, h, |x, y| {
    Rgba([(x % 256) as u8, (y % 256) as u8, 90, 255])
  }))
}
