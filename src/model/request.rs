// 该文件是 Thermomark 项目的一部分。
// src/model/request.rs - 请求体校验
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

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;
use url::Url;

use super::{AnnotationRequest, DEFAULT_DIAMETER_MM, Defect};

const IMAGE_URL_KEY: &str = "imageUrl";
const DEFECTS_KEY: &str = "defects";
const DIAMETER_KEY: &str = "diameterMm";
const LEGACY_DIAMETER_KEY: &str = "diameter_mm";

#[derive(Error, Debug, PartialEq)]
pub enum RequestError {
  #[error("No JSON data provided")]
  NoBody,
  #[error("Could not read request body: {0}")]
  UnreadableBody(String),
  #[error("Malformed JSON body: {0}")]
  MalformedJson(String),
  #[error("imageUrl is required")]
  MissingImageUrl,
  #[error("imageUrl is not a valid http(s) URL: {0}")]
  InvalidImageUrl(String),
  #[error("No defects provided")]
  NoDefects,
  #[error("defects[{index}].{field}: {reason}")]
  InvalidDefect {
    index: usize,
    field: &'static str,
    reason: String,
  },
  #[error("{field}: {reason}")]
  InvalidField { field: &'static str, reason: String },
}

/// 将未经信任的 JSON 请求体转换为 [`AnnotationRequest`]
///
/// 纯函数，不访问网络。
pub fn validate_request(body: &Value) -> Result<AnnotationRequest, RequestError> {
  let body = match body {
    Value::Object(map) if !map.is_empty() => map,
    _ => return Err(RequestError::NoBody),
  };

  let image_url = match body.get(IMAGE_URL_KEY) {
    Some(Value::String(s)) if !s.trim().is_empty() => parse_image_url(s.trim())?,
    Some(Value::Null) | Some(Value::String(_)) | None => {
      return Err(RequestError::MissingImageUrl);
    }
    Some(other) => return Err(RequestError::InvalidImageUrl(other.to_string())),
  };

  let defects = parse_defects(body.get(DEFECTS_KEY).unwrap_or(&Value::Null))?;

  Ok(AnnotationRequest {
    image_url,
    defects,
    image_width: optional_dimension(body, "imageWidth"),
    image_height: optional_dimension(body, "imageHeight"),
  })
}

/// 解析缺陷数组，顺序保持不变
pub fn parse_defects(value: &Value) -> Result<Vec<Defect>, RequestError> {
  let items = match value {
    Value::Array(items) if !items.is_empty() => items,
    Value::Array(_) | Value::Null => return Err(RequestError::NoDefects),
    _ => {
      return Err(RequestError::InvalidField {
        field: DEFECTS_KEY,
        reason: "expected an array".to_string(),
      });
    }
  };

  items
    .iter()
    .enumerate()
    .map(|(index, item)| parse_defect(index, item))
    .collect()
}

fn parse_image_url(raw: &str) -> Result<Url, RequestError> {
  let url = Url::parse(raw).map_err(|e| RequestError::InvalidImageUrl(e.to_string()))?;
  match url.scheme() {
    "http" | "https" => Ok(url),
    scheme => Err(RequestError::InvalidImageUrl(format!(
      "unsupported scheme '{scheme}'"
    ))),
  }
}

fn parse_defect(index: usize, item: &Value) -> Result<Defect, RequestError> {
  let Value::Object(fields) = item else {
    return Err(RequestError::InvalidDefect {
      index,
      field: "*",
      reason: "expected an object".to_string(),
    });
  };

  let invalid = |field: &'static str, reason: String| RequestError::InvalidDefect {
    index,
    field,
    reason,
  };

  let x = coordinate(fields.get("x")).map_err(|r| invalid("x", r))?;
  let y = coordinate(fields.get("y")).map_err(|r| invalid("y", r))?;

  let diameter = match fields.get(DIAMETER_KEY) {
    Some(Value::Null) | None => fields.get(LEGACY_DIAMETER_KEY),
    present => present,
  };
  let diameter_mm = diameter_mm(diameter).map_err(|r| invalid(DIAMETER_KEY, r))?;

  Ok(Defect::new(x, y, diameter_mm))
}

fn number(value: &Value) -> Result<f64, String> {
  match value {
    Value::Number(n) => n.as_f64().ok_or_else(|| format!("unrepresentable number {n}")),
    Value::String(s) => s
      .trim()
      .parse::<f64>()
      .map_err(|_| format!("'{s}' is not a number")),
    other => Err(format!("expected a number, got {other}")),
  }
}

// 浮点坐标向零截断
fn coordinate(value: Option<&Value>) -> Result<i32, String> {
  let value = match value {
    Some(Value::Null) | None => return Ok(0),
    Some(Value::Number(n)) if n.is_i64() => {
      let v = n.as_i64().unwrap_or_default();
      return i32::try_from(v).map_err(|_| format!("{v} is out of range"));
    }
    Some(value) => number(value)?,
  };

  if !value.is_finite() || value < i32::MIN as f64 || value > i32::MAX as f64 {
    return Err(format!("{value} is out of range"));
  }
  Ok(value.trunc() as i32)
}

fn diameter_mm(value: Option<&Value>) -> Result<f64, String> {
  let value = match value {
    Some(Value::Null) | None => return Ok(DEFAULT_DIAMETER_MM),
    Some(value) => number(value)?,
  };

  if value.is_finite() && value > 0.0 {
    Ok(value)
  } else {
    Err(format!("diameter must be a positive number, got {value}"))
  }
}

// 声明尺寸仅作参考，格式不对时记录警告并忽略
fn optional_dimension(body: &Map<String, Value>, field: &'static str) -> Option<u32> {
  let value = body.get(field)?;
  if value.is_null() {
    return None;
  }
  let dimension = value.as_u64().and_then(|v| u32::try_from(v).ok());
  if dimension.is_none() {
    warn!("忽略无效的 {}: {}", field, value);
  }
  dimension
}
