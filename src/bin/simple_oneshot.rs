// 该文件是 Biaozhu （标注） 项目的一部分。
// src/bin/simple_oneshot.rs - 单张图像检测与导出
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use anyhow::Result;
use clap::Parser;
use url::Url;

use biaozhu::{
  FromUrl,
  input::InputWrapper,
  model::DetectorWrapper,
  output::OutputWrapper,
  session::Status,
  task::{OneShotTask, Task},
};
use tracing::info;

/// Biaozhu 项目参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 输入图像，例如 image:///data/photo.jpg
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
  /// 检测器，例如 json:///data/detections.json 或 none:
  #[arg(long, value_name = "DETECTOR")]
  pub detector: Url,
  /// 输出，可重复：image:///out/dir[?font=FILE] 或 html:///out/overlay.html
  #[arg(long, value_name = "OUTPUT", required = true)]
  pub output: Vec<Url>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("输入来源: {}", args.input);
  info!("检测器: {}", args.detector);
  for output in &args.output {
    info!("输出路径: {}", output);
  }

  info!("状态: {}", Status::LoadingModel);
  let detector = DetectorWrapper::from_url(&args.detector)?;
  let input = InputWrapper::from_url(&args.input)?;
  let outputs = args
    .output
    .iter()
    .map(OutputWrapper::from_url)
    .collect::<Result<Vec<_>, _>>()?;
  info!("状态: {}", Status::Ready);

  let session = OneShotTask.run_task(input, detector, outputs).await?;
  info!(
    "处理完成! 标注数: {}, 状态: {:?}",
    session.annotations().len(),
    session.state()
  );

  Ok(())
}
