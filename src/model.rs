// 该文件是 Biaozhu （标注） 项目的一部分。
// src/model.rs - 检测器边界定义
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

use std::future::Future;

use thiserror::Error;
use url::Url;

use crate::{FromUrl, frame::SourceImage};

/// 固定的置信度阈值
pub const DETECT_THRESHOLD: f32 = 0.5;

/// 边界框，`xmin, ymin, xmax, ymax`
///
/// 通常为相对坐标，各分量位于 [0, 1]，相对于图像宽/高；
/// 仅当检测时 `DetectOptions::percentage` 为 false 时才是像素坐标。
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "json_detector", derive(serde::Deserialize))]
pub struct RelativeBox {
  pub xmin: f64,
  pub ymin: f64,
  pub xmax: f64,
  pub ymax: f64,
}

impl RelativeBox {
  pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
    Self {
      xmin,
      ymin,
      xmax,
      ymax,
    }
  }

  /// 是否满足 0 <= min <= max <= 1
  pub fn is_valid(&self) -> bool {
    let in_unit = |v: f64| (0.0..=1.0).contains(&v);
    in_unit(self.xmin)
      && in_unit(self.ymin)
      && in_unit(self.xmax)
      && in_unit(self.ymax)
      && self.xmin <= self.xmax
      && self.ymin <= self.ymax
  }
}

/// 检测器输出的单个目标
///
/// `bbox` 的坐标空间由请求时的 `DetectOptions::percentage` 决定，
/// 会话始终以相对坐标请求。
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
  pub label: String,
  pub score: f32,
  pub bbox: RelativeBox,
}

/// 调用检测器时的固定参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectOptions {
  pub threshold: f32,
  /// 为 true 时返回相对坐标，否则返回像素坐标
  pub percentage: bool,
}

impl Default for DetectOptions {
  fn default() -> Self {
    Self {
      threshold: DETECT_THRESHOLD,
      percentage: true,
    }
  }
}

/// 外部目标检测能力
///
/// 每次调用是一次性的异步任务，没有取消，也没有超时。
/// 实现者必须保证不会返回低于 `options.threshold` 的结果。
pub trait Detector {
  type Error: std::error::Error + Send + Sync + 'static;

  fn detect(
    &self,
    image: &SourceImage,
    options: &DetectOptions,
  ) -> impl Future<Output = Result<Vec<Detection>, Self::Error>>;
}

/// 永远不返回任何目标的检测器
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyDetector;

#[derive(Error, Debug)]
pub enum EmptyDetectorError {
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
}

impl crate::FromUrlWithScheme for EmptyDetector {
  const SCHEME: &'static str = "none";
}

impl FromUrl for EmptyDetector {
  type Error = EmptyDetectorError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    use crate::FromUrlWithScheme;

    if url.scheme() != Self::SCHEME {
      return Err(EmptyDetectorError::SchemeMismatch(url.scheme().to_string()));
    }
    Ok(EmptyDetector)
  }
}

impl Detector for EmptyDetector {
  type Error = std::convert::Infallible;

  async fn detect(
    &self,
    _image: &SourceImage,
    _options: &DetectOptions,
  ) -> Result<Vec<Detection>, Self::Error> {
    Ok(Vec::new())
  }
}

#[cfg(feature = "json_detector")]
mod json_detector;
#[cfg(feature = "json_detector")]
pub use self::json_detector::{JsonDetector, JsonDetectorError};

#[derive(Error, Debug)]
pub enum DetectorError {
  #[error("空检测器错误: {0}")]
  EmptyDetectorError(#[from] EmptyDetectorError),
  #[cfg(feature = "json_detector")]
  #[error("JSON 检测器错误: {0}")]
  JsonDetectorError(#[from] JsonDetectorError),
  #[error("URI 方案不匹配")]
  SchemeMismatch,
}

impl From<std::convert::Infallible> for DetectorError {
  fn from(err: std::convert::Infallible) -> Self {
    match err {}
  }
}

pub enum DetectorWrapper {
  Empty(EmptyDetector),
  #[cfg(feature = "json_detector")]
  Json(JsonDetector),
}

impl FromUrl for DetectorWrapper {
  type Error = DetectorError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    use crate::FromUrlWithScheme;

    match url.scheme() {
      EmptyDetector::SCHEME => Ok(DetectorWrapper::Empty(EmptyDetector::from_url(url)?)),
      #[cfg(feature = "json_detector")]
      JsonDetector::SCHEME => Ok(DetectorWrapper::Json(JsonDetector::from_url(url)?)),
      _ => Err(DetectorError::SchemeMismatch),
    }
  }
}

impl Detector for DetectorWrapper {
  type Error = DetectorError;

  async fn detect(
    &self,
    image: &SourceImage,
    options: &DetectOptions,
  ) -> Result<Vec<Detection>, Self::Error> {
    match self {
      DetectorWrapper::Empty(detector) => Ok(detector.detect(image, options).await?),
      #[cfg(feature = "json_detector")]
      DetectorWrapper::Json(detector) => Ok(detector.detect(image, options).await?),
    }
  }
}
