// 该文件是 Thermomark 项目的一部分。
// src/server/routes.rs - 路由与处理函数
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

use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use super::{AppState, MarkupError};
use crate::model::{AnnotationRequest, RequestError, validate_request};
use crate::output::{PNG_MIME, attachment_name};
use crate::task::MarkupTask;

pub const MARKUP_PATH: &str = "/markup";

/// GET / 的服务描述
#[derive(Serialize)]
pub struct ServiceInfo {
  pub status: &'static str,
  pub service: &'static str,
  pub endpoint: &'static str,
  pub method: &'static str,
}

async fn home() -> Json<ServiceInfo> {
  Json(ServiceInfo {
    status: "running",
    service: "Thermogram Markup API",
    endpoint: MARKUP_PATH,
    method: "POST",
  })
}

fn parse_body(body: &[u8]) -> Result<Value, RequestError> {
  if body.iter().all(u8::is_ascii_whitespace) {
    return Ok(Value::Null);
  }
  serde_json::from_slice(body).map_err(|e| RequestError::MalformedJson(e.to_string()))
}

/// POST /markup：校验 -> 下载 -> 标注 -> 返回 PNG 附件
async fn markup(
  State(state): State<AppState>,
  body: Result<Bytes, BytesRejection>,
) -> Result<Response, MarkupError> {
  let body = body.map_err(|e| RequestError::UnreadableBody(e.body_text()))?;
  let request = validate_request(&parse_body(&body)?)?;
  info!("收到标注请求: {} 个缺陷", request.defects.len());

  match state.config.request_timeout {
    Some(limit) => tokio::time::timeout(limit, annotate(&state, request))
      .await
      .map_err(|_| MarkupError::Timeout(limit))?,
    None => annotate(&state, request).await,
  }
}

async fn annotate(state: &AppState, request: AnnotationRequest) -> Result<Response, MarkupError> {
  let defect_count = request.defects.len();
  let image_bytes = state.fetcher.fetch(&request.image_url).await?;

  let task = MarkupTask::new(request.defects, state.config.font_path.clone())
    .with_declared_size(request.image_width, request.image_height);
  let png = tokio::task::spawn_blocking(move || task.run(&image_bytes))
    .await
    .map_err(|e| MarkupError::RenderFailed(e.to_string()))??;

  let disposition = format!("attachment; filename=\"{}\"", attachment_name(defect_count));
  Ok(([(CONTENT_TYPE, PNG_MIME.to_string()), (CONTENT_DISPOSITION, disposition)], png).into_response())
}

pub fn router() -> Router<AppState> {
  Router::new()
    .route("/", get(home))
    .route(MARKUP_PATH, post(markup))
}
