// 该文件是 Biaozhu （标注） 项目的一部分。
// src/model/json_detector.rs - 回放 JSON 检测结果
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

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::SourceImage,
  model::{DetectOptions, Detection, Detector, RelativeBox},
  url_file_path,
};

#[derive(Error, Debug)]
pub enum JsonDetectorError {
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("JSON 解析错误: {0}")]
  ParseError(#[from] serde_json::Error),
  #[error("第 {index} 个检测框坐标无效: {bbox:?}")]
  InvalidBox { index: usize, bbox: RelativeBox },
}

/// 检测管线的原始输出条目：`{ score, label, box: { xmin, ymin, xmax, ymax } }`
#[derive(Debug, Deserialize)]
struct RawDetection {
  #[serde(default = "full_score")]
  score: f32,
  label: String,
  #[serde(rename = "box")]
  bbox: RelativeBox,
}

fn full_score() -> f32 {
  1.0
}

/// 从文件回放预先计算好的检测结果
///
/// 文件中的坐标为相对坐标。每次检测都会重新读取文件。
pub struct JsonDetector {
  path: String,
}

impl FromUrlWithScheme for JsonDetector {
  const SCHEME: &'static str = "json";
}

impl FromUrl for JsonDetector {
  type Error = JsonDetectorError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(JsonDetectorError::SchemeMismatch(format!(
        "期望方案 '{}', 实际方案 '{}'",
        Self::SCHEME,
        url.scheme()
      )));
    }

    Ok(JsonDetector {
      path: url_file_path(url),
    })
  }
}

impl JsonDetector {
  pub fn new(path: impl Into<String>) -> Self {
    Self { path: path.into() }
  }

  fn parse(
    data: &[u8],
    image: &SourceImage,
    options: &DetectOptions,
  ) -> Result<Vec<Detection>, JsonDetectorError> {
    let raw: Vec<RawDetection> = serde_json::from_slice(data)?;
    debug!("读取到 {} 个原始检测结果", raw.len());

    let (w, h) = (
      image.natural_width() as f64,
      image.natural_height() as f64,
    );

    let mut detections = Vec::with_capacity(raw.len());
    for (index, item) in raw.into_iter().enumerate() {
      if item.score < options.threshold {
        continue;
      }
      if !item.bbox.is_valid() {
        return Err(JsonDetectorError::InvalidBox {
          index,
          bbox: item.bbox,
        });
      }

      let bbox = if options.percentage {
        item.bbox
      } else {
        RelativeBox::new(
          item.bbox.xmin * w,
          item.bbox.ymin * h,
          item.bbox.xmax * w,
          item.bbox.ymax * h,
        )
      };

      detections.push(Detection {
        label: item.label,
        score: item.score,
        bbox,
      });
    }
    Ok(detections)
  }
}

impl Detector for JsonDetector {
  type Error = JsonDetectorError;

  async fn detect(
    &self,
    image: &SourceImage,
    options: &DetectOptions,
  ) -> Result<Vec<Detection>, Self::Error> {
    info!("读取检测结果文件: {}", self.path);
    let data = tokio::fs::read(&self.path).await?;
    let detections = Self::parse(&data, image, options)?;
    if detections.is_empty() {
      warn!("阈值 {} 下没有检测到任何目标", options.threshold);
    }
    Ok(detections)
  }
}
