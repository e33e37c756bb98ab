// 该文件是 Thermomark 项目的一部分。
// src/args.rs - 服务参数配置
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

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::output::font::DEFAULT_FONT_PATH;

pub const DEFAULT_BODY_LIMIT: usize = 16 * 1024 * 1024;

/// Thermomark 服务参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 监听地址
  #[arg(long, env = "THERMOMARK_HOST", default_value = "0.0.0.0")]
  pub host: IpAddr,

  /// 监听端口
  #[arg(long, env = "PORT", default_value = "5000")]
  pub port: u16,

  /// 标注字体（TrueType），加载失败时使用内置字体
  #[arg(long, env = "THERMOMARK_FONT", default_value = DEFAULT_FONT_PATH, value_name = "FILE")]
  pub font: PathBuf,

  /// 图像下载超时（秒）
  #[arg(long, env = "FETCH_TIMEOUT_SECS", default_value = "30", value_name = "SECONDS")]
  pub fetch_timeout: u64,

  /// 整个请求的超时（秒），0 表示不限制
  #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "60", value_name = "SECONDS")]
  pub request_timeout: u64,

  /// 请求体大小上限（字节）
  #[arg(long, env = "BODY_LIMIT_BYTES", default_value_t = DEFAULT_BODY_LIMIT, value_name = "BYTES")]
  pub body_limit: usize,

  /// 日志过滤规则（RUST_LOG 优先）
  #[arg(long, default_value = "thermomark=info,tower_http=info", value_name = "FILTER")]
  pub log: String,
}

/// 启动时构造一次的不可变服务配置
#[derive(Debug, Clone)]
pub struct ServerConfig {
  pub addr: SocketAddr,
  pub font_path: PathBuf,
  pub fetch_timeout: Duration,
  pub request_timeout: Option<Duration>,
  pub body_limit: usize,
}

impl From<&Args> for ServerConfig {
  fn from(args: &Args) -> Self {
    ServerConfig {
      addr: SocketAddr::new(args.host, args.port),
      font_path: args.font.clone(),
      fetch_timeout: Duration::from_secs(args.fetch_timeout),
      request_timeout: (args.request_timeout > 0).then(|| Duration::from_secs(args.request_timeout)),
      body_limit: args.body_limit,
    }
  }
}
