// 该文件是 Biaozhu （标注） 项目的一部分。
// src/output.rs - 输出定义
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

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbaImage};
use thiserror::Error;
use url::Url;

use crate::{FromUrl, session::Session};

pub trait Render: Sized {
  type Error;
  fn render_result(&self, session: &mut Session) -> Result<(), Self::Error>;
}

pub mod draw;
pub mod overlay;

#[cfg(feature = "save_image_file")]
mod save_image_file;
#[cfg(feature = "save_image_file")]
pub use self::save_image_file::{SaveImageFileError, SaveImageFileOutput};

#[cfg(feature = "html_overlay")]
mod html_overlay;
#[cfg(feature = "html_overlay")]
pub use self::html_overlay::{HtmlOverlayError, HtmlOverlayOutput};

/// 编码为 PNG，相同输入得到相同字节
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, image::ImageError> {
  let mut bytes = Vec::new();
  DynamicImage::ImageRgba8(image.clone()).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
  Ok(bytes)
}

#[derive(Error, Debug)]
pub enum OutputError {
  #[cfg(feature = "save_image_file")]
  #[error("保存图像文件错误: {0}")]
  SaveImageFileError(#[from] SaveImageFileError),
  #[cfg(feature = "html_overlay")]
  #[error("叠加层页面输出错误: {0}")]
  HtmlOverlayError(#[from] HtmlOverlayError),
  #[error("URI 方案不匹配")]
  SchemeMismatch,
}

pub enum OutputWrapper {
  #[cfg(feature = "save_image_file")]
  SaveImageFileOutput(SaveImageFileOutput),
  #[cfg(feature = "html_overlay")]
  HtmlOverlayOutput(HtmlOverlayOutput),
}

impl FromUrl for OutputWrapper {
  type Error = OutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    #[cfg(any(feature = "save_image_file", feature = "html_overlay"))]
    use crate::FromUrlWithScheme;

    match url.scheme() {
      #[cfg(feature = "save_image_file")]
      SaveImageFileOutput::SCHEME => {
        let output = SaveImageFileOutput::from_url(url)?;
        Ok(OutputWrapper::SaveImageFileOutput(output))
      }
      #[cfg(feature = "html_overlay")]
      HtmlOverlayOutput::SCHEME => {
        let output = HtmlOverlayOutput::from_url(url)?;
        Ok(OutputWrapper::HtmlOverlayOutput(output))
      }
      _ => Err(OutputError::SchemeMismatch),
    }
  }
}

impl Render for OutputWrapper {
  type Error = OutputError;

  fn render_result(&self, session: &mut Session) -> Result<(), Self::Error> {
    match self {
      #[cfg(feature = "save_image_file")]
      OutputWrapper::SaveImageFileOutput(output) => output
        .render_result(session)
        .map_err(OutputError::from),
      #[cfg(feature = "html_overlay")]
      OutputWrapper::HtmlOverlayOutput(output) => output
        .render_result(session)
        .map_err(OutputError::from),
    }
  }
}

impl Render for Vec<OutputWrapper> {
  type Error = OutputError;

  fn render_result(&self, session: &mut Session) -> Result<(), Self::Error> {
    for output in self {
      output.render_result(session)?;
    }
    Ok(())
  }
}
