//! 检查选项与统计信息（模块）
use serde::Deserialize;

use crate::error::CheckError;
use crate::validator::MAX_SEQUENCE_LEN;
use crate::view::DEFAULT_ALIGN;

/// 默认窗口上限（字节）：每个窗口需要一块同样大小的读缓冲
pub const DEFAULT_MAX_WINDOW_BYTES: usize = 4 * 1024 * 1024; // 4 MiB

/// 单文件扫描配置（显式传入扫描器，便于测试注入小窗口）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    /// 每个窗口最多读取的字节数；越小窗口越多，越能覆盖跨边界逻辑
    pub max_window_bytes: usize,
    /// 读取起点的对齐粒度，必须是 2 的幂
    pub align_bytes: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self { max_window_bytes: DEFAULT_MAX_WINDOW_BYTES, align_bytes: DEFAULT_ALIGN }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<(), CheckError> {
        if self.max_window_bytes < MAX_SEQUENCE_LEN {
            return Err(CheckError::ConfigInvalid(format!(
                "max window bytes ({}) < max sequence length ({MAX_SEQUENCE_LEN})",
                self.max_window_bytes
            )));
        }
        if !self.align_bytes.is_power_of_two() {
            return Err(CheckError::ConfigInvalid(format!(
                "align bytes ({}) is not a power of two",
                self.align_bytes
            )));
        }
        Ok(())
    }
}

/// 报告输出格式
/// - Text：每行 `true <path>` / `false <path>`
/// - Json：流式 JSON 数组
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// 多文件检查选项
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    pub scan: ScanConfig,
    /// 线程数：None 表示自动（等于 CPU 核数）；Some(1) 走串行
    pub threads: Option<usize>,
    pub format: OutputFormat,
}

/// 检查统计信息（便于 CLI 决定退出码）
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CheckStats {
    pub files_checked: usize,
    pub well_formed: usize,
    pub not_well_formed: usize,
    pub errors: usize,
}

impl CheckStats {
    /// 所有文件都是良构 UTF-8 且没有错误
    pub fn all_well_formed(&self) -> bool {
        self.not_well_formed == 0 && self.errors == 0
    }
}
