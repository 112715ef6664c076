//! 窗口规划：把文件切分为有上限的窗口
//!
//! 非最终窗口在检查区末尾预留 `MAX_SEQUENCE_LEN - 1` 字节：起始于其中的
//! 多字节序列可以被完整读到（前瞻），但若序列本身起始于预留区，则留到下一个
//! 窗口开头重新检查。最终窗口不预留，截断的尾部序列就是真实的错误。
use std::iter::FusedIterator;

use crate::error::CheckError;
use crate::validator::MAX_SEQUENCE_LEN;

/// 非最终窗口检查区末尾预留的字节数
pub const RESERVED_TAIL: usize = MAX_SEQUENCE_LEN - 1;

/// 一个窗口：`[offset, offset + length)`，其中前 `check_length` 字节需要检查
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub offset: u64,
    pub length: usize,
    pub check_length: usize,
}

impl Window {
    /// 窗口在文件中的结束位置（不含）；溢出时为 None
    pub fn end(&self) -> Option<u64> {
        self.offset.checked_add(self.length as u64)
    }

    /// 检查区是否覆盖整个窗口（即最终窗口）
    pub fn is_final(&self) -> bool {
        self.check_length == self.length
    }
}

/// 惰性窗口序列
///
/// 每产出一个窗口后，调用方可用 [`WindowPlan::confirm`] 告知实际确认的字节数，
/// 下一个窗口从 `offset + confirmed` 开始；未确认时按整个检查区推进。
#[derive(Debug, Clone)]
pub struct WindowPlan {
    file_len: u64,
    max_window: usize,
    offset: u64,
    last: Option<Window>,
    confirmed: Option<u64>,
}

/// 为长度为 `file_len` 的文件规划窗口；窗口上限不足以容纳一个最长序列时报错
pub fn plan(file_len: u64, max_window_bytes: usize) -> Result<WindowPlan, CheckError> {
    if max_window_bytes < MAX_SEQUENCE_LEN {
        return Err(CheckError::ConfigInvalid(format!(
            "max window bytes ({max_window_bytes}) < max sequence length ({MAX_SEQUENCE_LEN})"
        )));
    }
    Ok(WindowPlan { file_len, max_window: max_window_bytes, offset: 0, last: None, confirmed: None })
}

impl WindowPlan {
    /// 确认上一个窗口中已校验通过的字节数
    pub fn confirm(&mut self, bytes: u64) {
        self.confirmed = Some(bytes);
    }

    fn window_at(&self, offset: u64) -> Window {
        let remaining = self.file_len - offset;
        if remaining <= self.max_window as u64 {
            let length = remaining as usize;
            Window { offset, length, check_length: length }
        } else {
            Window { offset, length: self.max_window, check_length: self.max_window - RESERVED_TAIL }
        }
    }
}

impl Iterator for WindowPlan {
    type Item = Window;

    fn next(&mut self) -> Option<Window> {
        if let Some(prev) = self.last.take() {
            let step = self.confirmed.take().unwrap_or(prev.check_length as u64);
            self.offset = self.offset.saturating_add(step);
        }
        if self.offset >= self.file_len {
            return None;
        }
        let window = self.window_at(self.offset);
        self.last = Some(window);
        Some(window)
    }
}

impl FusedIterator for WindowPlan {}
