// 该文件是 Thermomark 项目的一部分。
// src/server/error.rs - HTTP 错误响应
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

use std::any::Any;
use std::time::Duration;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::input::FetchError;
use crate::model::RequestError;
use crate::task::TaskError;

/// 标注请求的错误分类，所有错误都在处理函数顶层转换为 JSON 响应
#[derive(Error, Debug)]
pub enum MarkupError {
  #[error(transparent)]
  InvalidRequest(#[from] RequestError),
  #[error(transparent)]
  FetchFailed(#[from] FetchError),
  #[error(transparent)]
  ProcessingFailed(#[from] TaskError),
  #[error("Rendering task failed: {0}")]
  RenderFailed(String),
  #[error("Request timed out after {}s", .0.as_secs_f64())]
  Timeout(Duration),
  #[error("Internal server error: {0}")]
  Internal(String),
}

impl MarkupError {
  pub fn status(&self) -> StatusCode {
    match self {
      MarkupError::InvalidRequest(_) | MarkupError::FetchFailed(_) => StatusCode::BAD_REQUEST,
      MarkupError::ProcessingFailed(_)
      | MarkupError::RenderFailed(_)
      | MarkupError::Timeout(_)
      | MarkupError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for MarkupError {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = self.to_string();

    if status.is_server_error() {
      error!(error = ?self, "标注处理失败: {}", message);
    } else {
      warn!("请求被拒绝 ({}): {}", status.as_u16(), message);
    }

    (status, Json(json!({ "error": message }))).into_response()
  }
}

/// 处理函数 panic 时的响应，与其它错误一样返回 JSON
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
  let details = if let Some(s) = payload.downcast_ref::<String>() {
    s.clone()
  } else if let Some(s) = payload.downcast_ref::<&str>() {
    s.to_string()
  } else {
    "unknown panic".to_string()
  };
  MarkupError::Internal(details).into_response()
}
