// 该文件是 Biaozhu （标注） 项目的一部分。
// src/annotation.rs - 检测结果规范化
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

use image::Rgba;

use crate::model::{Detection, RelativeBox};

/// 所有标注共用的强调色 #00CFFF
pub const ACCENT_COLOR: Rgba<u8> = Rgba([0x00, 0xCF, 0xFF, 0xFF]);

/// 绑定了显示颜色的检测结果，是可渲染、可导出的基本单元
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
  pub label: String,
  pub score: f32,
  pub bbox: RelativeBox,
  pub color: Rgba<u8>,
}

impl Annotation {
  pub fn new(detection: Detection, color: Rgba<u8>) -> Self {
    let Detection { label, score, bbox } = detection;
    Self {
      label,
      score,
      bbox,
      color,
    }
  }

  /// CSS 十六进制颜色，例如 `#00CFFF`
  pub fn css_color(&self) -> String {
    let Rgba([r, g, b, _]) = self.color;
    format!("#{r:02X}{g:02X}{b:02X}")
  }
}

/// 将检测器输出转换为标注列表
///
/// 保持检测器的输出顺序，不排序、不去重、不校验坐标。
pub fn normalize(detections: impl IntoIterator<Item = Detection>) -> Vec<Annotation> {
  detections
    .into_iter()
    .map(|detection| Annotation::new(detection, ACCENT_COLOR))
    .collect()
}
