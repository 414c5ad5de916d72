// 该文件是 Biaozhu （标注） 项目的一部分。
// src/frame.rs - 源图像定义
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

use std::sync::Arc;

use image::{DynamicImage, RgbaImage};

/// 已解码的源图像
///
/// 核心流程只读取它的固有尺寸和像素，从不修改。克隆只复制引用。
#[derive(Debug, Clone)]
pub struct SourceImage {
  pixels: Arc<RgbaImage>,
  origin: Option<String>,
}

impl SourceImage {
  pub fn new(pixels: RgbaImage) -> Self {
    Self {
      pixels: Arc::new(pixels),
      origin: None,
    }
  }

  /// 记录图像来源（例如文件路径），供叠加层页面引用
  pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
    self.origin = Some(origin.into());
    self
  }

  pub fn natural_width(&self) -> u32 {
    self.pixels.width()
  }

  pub fn natural_height(&self) -> u32 {
    self.pixels.height()
  }

  pub fn pixels(&self) -> &RgbaImage {
    &self.pixels
  }

  pub fn origin(&self) -> Option<&str> {
    self.origin.as_deref()
  }
}

impl From<DynamicImage> for SourceImage {
  fn from(image: DynamicImage) -> Self {
    Self::new(image.to_rgba8())
  }
}

impl From<RgbaImage> for SourceImage {
  fn from(image: RgbaImage) -> Self {
    Self::new(image)
  }
}
