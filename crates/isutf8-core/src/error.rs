//! 单文件检查的错误类型
//!
//! 注意：“不是良构 UTF-8”不是错误，而是正常结果（`Ok(false)`）。
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// 单个文件检查失败的原因；只影响该文件，不中断整次运行
#[derive(Debug, Error)]
pub enum CheckError {
    /// 路径不存在
    #[error("{}: no such file or directory", .path.display())]
    NotFound { path: PathBuf },

    /// 路径存在但无法打开或 stat（权限等）
    #[error("{}: open failed: {source}", .path.display())]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 目录、设备、管道等非普通文件
    #[error("{}: not a regular file", .path.display())]
    NotARegularFile { path: PathBuf },

    /// 窗口字节视图获取失败（范围与文件长度不一致、读取不足等）
    #[error("window [{offset}, {end}) unavailable: {reason}")]
    MapFailed { offset: u64, end: u64, reason: String },

    /// 配置非法，或内部不变量被破坏
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),
}

impl CheckError {
    /// 供日志/报告使用的简短类别名
    pub fn kind_name(&self) -> &'static str {
        match self {
            CheckError::NotFound { .. } => "not_found",
            CheckError::OpenFailed { .. } => "open_failed",
            CheckError::NotARegularFile { .. } => "not_a_regular_file",
            CheckError::MapFailed { .. } => "map_failed",
            CheckError::ConfigInvalid(_) => "config_invalid",
        }
    }
}
