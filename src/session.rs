// 该文件是 Biaozhu （标注） 项目的一部分。
// src/session.rs - 单图像标注会话
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

use std::fmt;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
  annotation::{Annotation, normalize},
  frame::SourceImage,
  model::{DetectOptions, Detection, Detector},
  output::{
    draw::Draw,
    encode_png,
    overlay::{OverlayElement, render_overlay},
  },
};

/// 导出文件名，不可配置
pub const EXPORT_FILE_NAME: &str = "detected_objects.png";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
  Idle,
  Loaded,
  Detecting,
  Annotated,
  Exported,
}

/// 界面状态文本
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
  LoadingModel,
  Ready,
  Analysing,
  Done,
}

impl fmt::Display for Status {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let text = match self {
      Status::LoadingModel => "Loading model...",
      Status::Ready => "Ready",
      Status::Analysing => "Analysing...",
      Status::Done => "",
    };
    f.write_str(text)
  }
}

#[derive(Error, Debug)]
pub enum ExportError {
  #[error("PNG 编码错误: {0}")]
  EncodeError(#[from] image::ImageError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedImage {
  pub file_name: &'static str,
  pub bytes: Vec<u8>,
}

/// 一次进行中的检测请求，记录发起时的图像代数
#[derive(Debug, Clone)]
pub struct DetectionRequest {
  generation: u64,
  image: SourceImage,
}

impl DetectionRequest {
  pub fn image(&self) -> &SourceImage {
    &self.image
  }
}

/// 当前图像及其标注集合
///
/// 加载新图像时整体替换，旧标注全部丢弃。
#[derive(Debug)]
pub struct Session {
  image: Option<SourceImage>,
  annotations: Vec<Annotation>,
  state: SessionState,
  generation: u64,
}

impl Default for Session {
  fn default() -> Self {
    Self::new()
  }
}

impl Session {
  pub fn new() -> Self {
    Self {
      image: None,
      annotations: Vec::new(),
      state: SessionState::Idle,
      generation: 0,
    }
  }

  pub fn state(&self) -> SessionState {
    self.state
  }

  pub fn status(&self) -> Status {
    match self.state {
      SessionState::Idle | SessionState::Loaded => Status::Ready,
      SessionState::Detecting => Status::Analysing,
      SessionState::Annotated | SessionState::Exported => Status::Done,
    }
  }

  /// 导出按钮是否可用
  pub fn can_export(&self) -> bool {
    matches!(
      self.state,
      SessionState::Annotated | SessionState::Exported
    )
  }

  pub fn image(&self) -> Option<&SourceImage> {
    self.image.as_ref()
  }

  pub fn annotations(&self) -> &[Annotation] {
    &self.annotations
  }

  pub fn load_image(&mut self, image: SourceImage) {
    if self.state == SessionState::Detecting {
      warn!("检测尚未完成即加载了新图像，进行中的结果仍会应用到新图像上");
    }
    info!(
      "加载图像: {}x{}",
      image.natural_width(),
      image.natural_height()
    );
    self.annotations.clear();
    self.image = Some(image);
    self.state = SessionState::Loaded;
    self.generation += 1;
  }

  /// 进入检测阶段；没有图像时返回 `None`
  pub fn begin_detection(&mut self) -> Option<DetectionRequest> {
    let image = self.image.clone()?;
    self.state = SessionState::Detecting;
    Some(DetectionRequest {
      generation: self.generation,
      image,
    })
  }

  /// 应用检测结果
  ///
  /// 结果总是应用到当前图像。若期间已加载新图像，只记录警告。
  pub fn complete_detection(&mut self, request: DetectionRequest, detections: Vec<Detection>) {
    if request.generation != self.generation {
      warn!(
        "检测结果属于第 {} 代图像，当前为第 {} 代",
        request.generation, self.generation
      );
    }
    self.annotations = normalize(detections);
    self.state = SessionState::Annotated;
    info!("检测完成，共 {} 个标注", self.annotations.len());
  }

  /// 检测失败后回到已加载状态，不保留任何部分结果
  pub fn fail_detection(&mut self, request: DetectionRequest) {
    if request.generation == self.generation {
      self.annotations.clear();
      self.state = SessionState::Loaded;
    }
  }

  /// 对当前图像执行一次检测；没有图像时什么也不做并返回 0
  pub async fn run_detection<D: Detector>(&mut self, detector: &D) -> Result<usize, D::Error> {
    let Some(request) = self.begin_detection() else {
      debug!("没有图像，忽略检测请求");
      return Ok(0);
    };

    let options = DetectOptions::default();
    let result = detector.detect(request.image(), &options).await;
    match result {
      Ok(detections) => {
        self.complete_detection(request, detections);
        Ok(self.annotations.len())
      }
      Err(err) => {
        self.fail_detection(request);
        Err(err)
      }
    }
  }

  pub fn overlay(&self) -> Vec<OverlayElement> {
    render_overlay(&self.annotations)
  }

  /// 将标注烧录到图像并编码为 PNG
  ///
  /// 仅在检测完成后可用；没有图像或尚未完成检测时返回 `Ok(None)`。
  pub fn export(&mut self, draw: &Draw) -> Result<Option<ExportedImage>, ExportError> {
    let Some(image) = self.image.as_ref() else {
      debug!("没有图像，忽略导出请求");
      return Ok(None);
    };
    if !self.can_export() {
      debug!("当前状态 {:?} 不可导出", self.state);
      return Ok(None);
    }

    let flattened = draw.flatten(image, &self.annotations);
    let bytes = encode_png(&flattened)?;
    self.state = SessionState::Exported;
    info!("导出 {} ({} 字节)", EXPORT_FILE_NAME, bytes.len());

    Ok(Some(ExportedImage {
      file_name: EXPORT_FILE_NAME,
      bytes,
    }))
  }
}
