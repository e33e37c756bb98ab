// 该文件是 Thermomark 项目的一部分。
// src/main.rs - 标注服务主程序
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

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use thermomark::{
  args::{Args, ServerConfig},
  input::HttpFetcher,
  server::{AppState, build_router},
};

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log)))
    .with(tracing_subscriber::fmt::layer())
    .init();

  let config = ServerConfig::from(&args);
  info!("Thermomark 热像图标注服务");
  info!("监听地址: {}", config.addr);
  info!("标注字体: {}", config.font_path.display());
  info!("下载超时: {:?}", config.fetch_timeout);

  let fetcher = HttpFetcher::new(config.fetch_timeout).context("无法创建 HTTP 客户端")?;
  let addr = config.addr;
  let app = build_router(AppState::new(config, Arc::new(fetcher)));

  let listener = tokio::net::TcpListener::bind(addr)
    .await
    .with_context(|| format!("无法监听 {}", addr))?;
  info!("服务已启动: http://{}", addr);
  axum::serve(listener, app).await.context("服务异常退出")?;

  Ok(())
}
