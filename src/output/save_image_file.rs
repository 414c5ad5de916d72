// 该文件是 Biaozhu （标注） 项目的一部分。
// src/output/save_image_file.rs - 保存图像文件
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

use std::path::PathBuf;

use thiserror::Error;
use tracing::warn;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  output::{
    Render,
    draw::{Draw, DrawError},
  },
  session::{ExportError, ExportedImage, Session},
  url_file_path,
};

/// 把导出的 PNG 写入目录，文件名固定为 `detected_objects.png`
///
/// URL 形如 `image:///output/dir?font=/usr/share/fonts/Roboto.ttf`。
pub struct SaveImageFileOutput {
  dir: PathBuf,
  draw: Draw,
}

#[derive(Error, Debug)]
pub enum SaveImageFileError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("导出错误: {0}")]
  ExportError(#[from] ExportError),
  #[error("字体错误: {0}")]
  DrawError(#[from] DrawError),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
}

impl FromUrlWithScheme for SaveImageFileOutput {
  const SCHEME: &'static str = "image";
}

impl FromUrl for SaveImageFileOutput {
  type Error = SaveImageFileError;

  fn from_url(uri: &Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(SaveImageFileError::SchemeMismatch(format!(
        "期望保存方式 '{}', 实际保存方式 '{}'",
        Self::SCHEME,
        uri.scheme()
      )));
    }

    let draw = match uri.query_pairs().find(|(key, _)| key == "font") {
      Some((_, font)) => Draw::with_font_file(font.into_owned())?,
      None => Draw::default(),
    };

    Ok(SaveImageFileOutput::new(url_file_path(uri), draw))
  }
}

impl SaveImageFileOutput {
  pub fn new(dir: impl Into<PathBuf>, draw: Draw) -> Self {
    Self {
      dir: dir.into(),
      draw,
    }
  }

  pub fn path(&self) -> PathBuf {
    self.dir.join(crate::session::EXPORT_FILE_NAME)
  }

  fn save_image(&self, exported: &ExportedImage) -> Result<(), SaveImageFileError> {
    if !self.dir.as_os_str().is_empty() {
      std::fs::create_dir_all(&self.dir)?;
    }

    let path = self.dir.join(exported.file_name);
    std::fs::write(&path, &exported.bytes)?;

    warn!("保存图像到文件: {}", path.display());

    Ok(())
  }
}

impl Render for SaveImageFileOutput {
  type Error = SaveImageFileError;

  fn render_result(&self, session: &mut Session) -> Result<(), Self::Error> {
    match session.export(&self.draw)? {
      Some(exported) => self.save_image(&exported),
      None => {
        warn!("当前没有可导出的图像，跳过保存");
        Ok(())
      }
    }
  }
}
