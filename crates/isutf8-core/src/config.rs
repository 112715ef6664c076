//! 配置文件加载（TOML）
//!
//! ```toml
//! [check]
//! max_window_bytes = 65536
//! align_bytes = 4096
//! threads = 4
//! format = "json"
//! ```
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::options::{CheckOptions, OutputFormat};

/// `[check]` 表；所有字段可选，缺省时沿用已有值
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckSection {
    #[serde(default)]
    pub max_window_bytes: Option<usize>,
    #[serde(default)]
    pub align_bytes: Option<usize>,
    #[serde(default)]
    pub threads: Option<usize>,
    #[serde(default)]
    pub format: Option<OutputFormat>,
}

/// 顶层配置文件结构
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    check: CheckSection,
}

impl CheckSection {
    /// 用本节中出现的字段覆盖 `opts`
    pub fn apply(&self, opts: &mut CheckOptions) {
        if let Some(v) = self.max_window_bytes { opts.scan.max_window_bytes = v; }
        if let Some(v) = self.align_bytes { opts.scan.align_bytes = v; }
        if let Some(v) = self.threads { opts.threads = Some(v); }
        if let Some(v) = self.format { opts.format = v; }
    }
}

/// 解析 TOML 文本
pub fn parse_config(txt: &str) -> Result<CheckSection> {
    let parsed: ConfigFile = toml::from_str(txt).context("parse config")?;
    Ok(parsed.check)
}

/// 从文件加载配置
pub fn load_config(path: &Path) -> Result<CheckSection> {
    let txt = std::fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    parse_config(&txt).with_context(|| format!("invalid config {}", path.display()))
}
