//! 窗口字节视图：按对齐边界定位读取文件的一段字节
//!
//! 读取起点向下对齐到 `align`（类似按页对齐的映射），因此窗口内容前面会多出
//! `offset % align` 字节，校验从该位置开始。缓冲区在整个文件检查期间复用，
//! 视图借用结束即视为释放。
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};

use crate::error::CheckError;
use crate::planner::Window;

/// 默认对齐粒度（常见页大小）
pub const DEFAULT_ALIGN: usize = 4096;

/// 一次窗口读取得到的只读视图
#[derive(Debug)]
pub(crate) struct WindowView<'a> {
    /// 对齐后读到的全部字节（含预留尾部）
    pub(crate) bytes: &'a [u8],
    /// 窗口逻辑起点在 `bytes` 中的下标
    pub(crate) start: usize,
    /// 检查区终点在 `bytes` 中的下标
    pub(crate) check_end: usize,
}

/// 单个文件的窗口读取器（独占文件句柄与缓冲区）
pub(crate) struct WindowReader {
    file: File,
    file_len: u64,
    align: usize,
    buf: Vec<u8>,
}

impl WindowReader {
    pub(crate) fn new(file: File, file_len: u64, align: usize) -> Self {
        Self { file, file_len, align: align.max(1), buf: Vec::new() }
    }

    /// 获取窗口 `[offset, offset + length)` 的视图
    pub(crate) fn acquire(&mut self, window: &Window) -> Result<WindowView<'_>, CheckError> {
        if window.check_length > window.length {
            return Err(CheckError::ConfigInvalid(format!(
                "check length ({}) > window length ({})",
                window.check_length, window.length
            )));
        }
        let end = window.end().filter(|&e| e <= self.file_len).ok_or_else(|| {
            CheckError::MapFailed {
                offset: window.offset,
                end: window.offset.saturating_add(window.length as u64),
                reason: format!("range exceeds file length {}", self.file_len),
            }
        })?;

        let start = (window.offset % self.align as u64) as usize;
        let read_from = window.offset - start as u64;
        let total = start.checked_add(window.length).ok_or_else(|| {
            CheckError::ConfigInvalid(format!("window length {} overflows with alignment", window.length))
        })?;

        let map_failed = |e: std::io::Error| CheckError::MapFailed { offset: window.offset, end, reason: e.to_string() };
        if self.buf.len() < total {
            self.buf.resize(total, 0);
        }
        self.file.seek(SeekFrom::Start(read_from)).map_err(map_failed)?;
        // 文件在检查期间被截断时这里会读不足
        self.file.read_exact(&mut self.buf[..total]).map_err(map_failed)?;

        Ok(WindowView { bytes: &self.buf[..total], start, check_end: start + window.check_length })
    }
}
