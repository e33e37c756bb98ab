// 该文件是 Thermomark 项目的一部分。
// src/server.rs - HTTP 服务
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

use axum::Router;
use axum::extract::DefaultBodyLimit;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::args::ServerConfig;
use crate::input::ImageFetcher;

mod error;
mod routes;

pub use self::error::{MarkupError, panic_response};

/// 所有处理函数共享的状态，启动时构造一次
#[derive(Clone)]
pub struct AppState {
  pub config: Arc<ServerConfig>,
  pub fetcher: Arc<dyn ImageFetcher>,
}

impl AppState {
  pub fn new(config: ServerConfig, fetcher: Arc<dyn ImageFetcher>) -> Self {
    Self {
      config: Arc::new(config),
      fetcher,
    }
  }
}

/// 构造带中间件的完整路由
pub fn build_router(state: AppState) -> Router {
  with_middleware(routes::router(), &state.config).with_state(state)
}

// 请求体上限与 panic 处理，出错时均为 JSON 响应；请求超时在处理函数内计算
fn with_middleware(router: Router<AppState>, config: &ServerConfig) -> Router<AppState> {
  router
    .layer(DefaultBodyLimit::max(config.body_limit))
    .layer(CatchPanicLayer::custom(panic_response))
    .layer(
      TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO)),
    )
}
