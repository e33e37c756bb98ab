// 该文件是 Thermomark 项目的一部分。
// src/bin/annotate_file.rs - 离线标注本地图像
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

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use thermomark::{model::parse_defects, output::font::DEFAULT_FONT_PATH, task::MarkupTask};

/// 离线标注参数
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 输入热像图
  #[arg(long, value_name = "FILE")]
  pub image: PathBuf,
  /// 缺陷列表 JSON 文件（数组，或含 defects 字段的对象）
  #[arg(long, value_name = "FILE")]
  pub defects: PathBuf,
  /// 输出 PNG 路径
  #[arg(long, value_name = "OUTPUT")]
  pub output: PathBuf,
  /// 标注字体
  #[arg(long, default_value = DEFAULT_FONT_PATH, value_name = "FILE")]
  pub font: PathBuf,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("输入图像: {}", args.image.display());
  info!("缺陷列表: {}", args.defects.display());
  info!("输出路径: {}", args.output.display());

  let raw = std::fs::read(&args.defects)
    .with_context(|| format!("无法读取缺陷列表: {}", args.defects.display()))?;
  let value: serde_json::Value = serde_json::from_slice(&raw).context("缺陷列表不是合法 JSON")?;
  let defects = parse_defects(value.get("defects").unwrap_or(&value))?;

  let image = std::fs::read(&args.image)
    .with_context(|| format!("无法读取图像: {}", args.image.display()))?;

  let png = MarkupTask::new(defects, args.font).run(&image)?;

  if let Some(parent) = args.output.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)?;
  }
  std::fs::write(&args.output, png)?;
  info!("已保存标注结果: {}", args.output.display());

  Ok(())
}
