// 该文件是 Biaozhu （标注） 项目的一部分。
// src/task.rs - 任务流程
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

use tracing::info;

use crate::{frame::SourceImage, model::Detector, output::Render, session::Session};

pub trait Task<I, D, O>: Sized {
  type Error;
  fn run_task(
    self,
    input: I,
    detector: D,
    output: O,
  ) -> impl Future<Output = Result<Session, Self::Error>>;
}

/// 取一张图像，检测一次，渲染全部输出
pub struct OneShotTask;

impl<RE, I, D, O> Task<I, D, O> for OneShotTask
where
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = SourceImage>,
  D: Detector,
  O: Render<Error = RE>,
{
  type Error = anyhow::Error;

  async fn run_task(self, mut input: I, detector: D, output: O) -> Result<Session, Self::Error> {
    info!("开始任务...");
    let image = input.next().ok_or_else(|| anyhow::anyhow!("没有输入图像"))?;

    let mut session = Session::new();
    session.load_image(image);
    info!("状态: {}", session.status());

    info!("输入图像获取成功，开始检测...");
    let now = std::time::Instant::now();
    let count = session.run_detection(&detector).await?;
    let elapsed = now.elapsed();
    info!("检测完成，{} 个目标，耗时: {:.2?}", count, elapsed);

    let now = std::time::Instant::now();
    output.render_result(&mut session)?;
    info!("渲染完成，耗时: {:.2?}", now.elapsed());

    Ok(session)
  }
}
