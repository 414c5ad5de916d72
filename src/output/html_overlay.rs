// 该文件是 Biaozhu （标注） 项目的一部分。
// src/output/html_overlay.rs - 叠加层页面输出
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

use std::fmt::Write as _;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  output::{Render, overlay::OverlayElement},
  session::Session,
  url_file_path,
};

const PAGE_STYLE: &str = "\
.image-container { position: relative; display: inline-block; }
.image-container img { display: block; max-width: 100%; }
.bounding-box { position: absolute; box-sizing: border-box; border: 2px solid; }
.bounding-box-label { position: absolute; top: -18px; left: 0; padding: 0 4px; \
color: #fff; font: 12px Roboto, sans-serif; white-space: nowrap; }";

#[derive(Error, Debug)]
pub enum HtmlOverlayError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("页面生成错误: {0}")]
  FormatError(#[from] std::fmt::Error),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
}

/// 把百分比定位的叠加层写成一个 HTML 页面
pub struct HtmlOverlayOutput {
  path: PathBuf,
}

impl FromUrlWithScheme for HtmlOverlayOutput {
  const SCHEME: &'static str = "html";
}

impl FromUrl for HtmlOverlayOutput {
  type Error = HtmlOverlayError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(HtmlOverlayError::SchemeMismatch(url.scheme().to_string()));
    }
    Ok(HtmlOverlayOutput::new(url_file_path(url)))
  }
}

impl HtmlOverlayOutput {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }
}

fn escape(text: &str) -> String {
  let mut escaped = String::with_capacity(text.len());
  for c in text.chars() {
    match c {
      '&' => escaped.push_str("&amp;"),
      '<' => escaped.push_str("&lt;"),
      '>' => escaped.push_str("&gt;"),
      '"' => escaped.push_str("&quot;"),
      _ => escaped.push(c),
    }
  }
  escaped
}

/// 生成叠加层页面
pub fn overlay_page(
  image_src: Option<&str>,
  elements: &[OverlayElement],
) -> Result<String, std::fmt::Error> {
  let mut html = String::new();
  writeln!(html, "<!DOCTYPE html>")?;
  writeln!(html, "<html><head><meta charset=\"utf-8\">")?;
  writeln!(html, "<style>\n{PAGE_STYLE}\n</style></head><body>")?;
  writeln!(html, "<div class=\"image-container\">")?;
  if let Some(src) = image_src {
    writeln!(html, "<img src=\"{}\">", escape(src))?;
  }
  for element in elements {
    writeln!(
      html,
      "<div class=\"bounding-box\" style=\"{}\"><span class=\"bounding-box-label\" style=\"{}\">{}</span></div>",
      element.box_style(),
      element.label_style(),
      escape(element.label())
    )?;
  }
  writeln!(html, "</div>\n</body></html>")?;
  Ok(html)
}

impl Render for HtmlOverlayOutput {
  type Error = HtmlOverlayError;

  fn render_result(&self, session: &mut Session) -> Result<(), Self::Error> {
    let Some(image) = session.image() else {
      warn!("当前没有图像，跳过叠加层页面");
      return Ok(());
    };

    let elements = session.overlay();
    let page = overlay_page(image.origin(), &elements)?;

    if let Some(parent) = self.path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&self.path, page)?;
    info!(
      "写入叠加层页面: {} ({} 个框)",
      self.path.display(),
      elements.len()
    );
    Ok(())
  }
}
