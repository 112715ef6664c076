//! 单文件扫描：按规划逐窗口读取并校验，聚合为一个结论
//!
//! 同一文件内的窗口必须顺序处理：下一个窗口的起点取决于上一个窗口实际确认的字节数。
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::debug;

use crate::error::CheckError;
use crate::options::ScanConfig;
use crate::planner::plan;
use crate::validator::validate;
use crate::view::WindowReader;

/// 单文件检查的详细结论
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileVerdict {
    pub well_formed: bool,
    /// 首个非法（或被截断）序列的文件偏移；良构时等于文件长度
    pub valid_up_to: u64,
    pub file_len: u64,
    /// 实际读取的窗口数
    pub windows: usize,
}

/// 一次文件检查的累加状态，检查结束即丢弃
#[derive(Debug, Default)]
struct ScanState {
    /// 已确认部分的末尾（文件偏移）
    offset: u64,
    windows: usize,
}

impl ScanState {
    /// 推进到已确认字节之后
    fn advance(&mut self, confirmed: u64) {
        self.offset += confirmed;
    }
}

/// 文件是否为良构 UTF-8；“不是”属于正常结果 `Ok(false)`
pub fn check_file(path: &Path, config: &ScanConfig) -> Result<bool, CheckError> {
    inspect_file(path, config).map(|v| v.well_formed)
}

/// 与 [`check_file`] 相同，但返回失败位置与窗口统计
pub fn inspect_file(path: &Path, config: &ScanConfig) -> Result<FileVerdict, CheckError> {
    config.validate()?;
    let (file, file_len) = open_regular(path)?;
    let mut reader = WindowReader::new(file, file_len, config.align_bytes);
    let mut windows = plan(file_len, config.max_window_bytes)?;
    let mut state = ScanState::default();

    while let Some(window) = windows.next() {
        debug_assert_eq!(window.offset, state.offset);
        state.windows += 1;
        // 视图只在本轮循环内存活
        let outcome = {
            let view = reader.acquire(&window)?;
            validate(view.bytes, view.start, view.check_end)
        };
        debug!(
            path = %path.display(),
            offset = window.offset,
            length = window.length,
            check_length = window.check_length,
            is_final = window.is_final(),
            confirmed = outcome.bytes_confirmed,
            well_formed = outcome.is_well_formed,
            "window checked"
        );

        if !outcome.is_well_formed {
            return Ok(FileVerdict {
                well_formed: false,
                valid_up_to: state.offset + outcome.bytes_confirmed,
                file_len,
                windows: state.windows,
            });
        }
        if outcome.bytes_confirmed == 0 && window.check_length > 0 {
            return Err(CheckError::ConfigInvalid(format!("window at offset {} confirmed no bytes", window.offset)));
        }
        state.advance(outcome.bytes_confirmed);
        windows.confirm(outcome.bytes_confirmed);
    }

    Ok(FileVerdict { well_formed: true, valid_up_to: state.offset, file_len, windows: state.windows })
}

/// 打开普通文件并返回其长度
///
/// 先按路径 stat 再打开，避免在 FIFO 等特殊文件上阻塞；打开后再次 fstat，
/// 以句柄实际指向的文件为准。
fn open_regular(path: &Path) -> Result<(File, u64), CheckError> {
    let classify = |e: io::Error| match e.kind() {
        io::ErrorKind::NotFound => CheckError::NotFound { path: path.to_path_buf() },
        _ => CheckError::OpenFailed { path: path.to_path_buf(), source: e },
    };
    let not_regular = || CheckError::NotARegularFile { path: path.to_path_buf() };

    if !std::fs::metadata(path).map_err(classify)?.is_file() {
        return Err(not_regular());
    }
    let file = File::open(path).map_err(classify)?;
    let md = file.metadata().map_err(classify)?;
    if !md.is_file() {
        return Err(not_regular());
    }
    Ok((file, md.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn fixture(content: &[u8]) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content).unwrap();
        f.flush().unwrap();
        f
    }

    fn cfg(max_window_bytes: usize) -> ScanConfig {
        ScanConfig { max_window_bytes, ..ScanConfig::default() }
    }

    const WINDOW_SIZES: [usize; 6] = [4, 5, 6, 7, 4096, usize::MAX >> 1];

    fn sample_text() -> Vec<u8> {
        "Grüße, 世界! 😀 ü€𐍈 ß \u{10FFFF}\u{FFFD} ascii tail".repeat(40).into_bytes()
    }

    #[test]
    fn hello_is_well_formed() {
        let f = fixture(b"Hello");
        assert!(check_file(f.path(), &ScanConfig::default()).unwrap());
    }

    #[test]
    fn bad_continuation_is_not_well_formed() {
        let f = fixture(&[0xC2, 0x28]);
        let v = inspect_file(f.path(), &ScanConfig::default()).unwrap();
        assert!(!v.well_formed);
        assert_eq!(v.valid_up_to, 0);
    }

    #[test]
    fn empty_file_is_well_formed() {
        let f = fixture(b"");
        let v = inspect_file(f.path(), &cfg(4)).unwrap();
        assert!(v.well_formed);
        assert_eq!(v.windows, 0);
    }

    #[test]
    fn ascii_is_well_formed_for_every_window_size() {
        let content: Vec<u8> = (0u8..=0x7F).cycle().take(1000).collect();
        let f = fixture(&content);
        for max in WINDOW_SIZES {
            assert!(check_file(f.path(), &cfg(max)).unwrap(), "max window {max}");
        }
    }

    #[test]
    fn verdict_does_not_depend_on_window_size() {
        let text = sample_text();
        let f = fixture(&text);
        for max in WINDOW_SIZES {
            let v = inspect_file(f.path(), &cfg(max)).unwrap();
            assert!(v.well_formed, "max window {max}");
            assert_eq!(v.valid_up_to, text.len() as u64);
        }
        let small = inspect_file(f.path(), &cfg(4)).unwrap();
        assert!(small.windows > 1);
    }

    #[test]
    fn invalid_byte_found_in_later_window() {
        let mut content = sample_text();
        let bad_at = content.len() - 7;
        content.insert(bad_at, 0xFF);
        let f = fixture(&content);
        for max in WINDOW_SIZES {
            let v = inspect_file(f.path(), &cfg(max)).unwrap();
            assert!(!v.well_formed, "max window {max}");
            assert_eq!(v.valid_up_to, bad_at as u64, "max window {max}");
        }
    }

    #[test]
    fn truncated_lead_byte_at_end_of_file() {
        let f = fixture(b"abcdefgh\xC2");
        for max in WINDOW_SIZES {
            assert!(!check_file(f.path(), &cfg(max)).unwrap(), "max window {max}");
        }
        // 同样的首字节出现在文件中部且后跟合法后续字节时被接受
        let f = fixture(b"abcdefgh\xC2\xA9ij");
        for max in WINDOW_SIZES {
            assert!(check_file(f.path(), &cfg(max)).unwrap(), "max window {max}");
        }
    }

    #[test]
    fn sequence_straddling_window_boundary() {
        // 窗口 5、检查区 2：4 字节序列起始于检查区最后一个字节
        let f = fixture(b"a\xF0\x9F\x98\x80bcdefg");
        let v = inspect_file(f.path(), &cfg(5)).unwrap();
        assert!(v.well_formed);
        assert!(v.windows >= 2);
    }

    #[test]
    fn unaligned_reads_give_same_verdict() {
        let text = sample_text();
        let f = fixture(&text);
        for align in [1, 2, 8, 4096] {
            let config = ScanConfig { max_window_bytes: 7, align_bytes: align };
            assert!(check_file(f.path(), &config).unwrap(), "align {align}");
        }
    }

    #[test]
    fn directory_is_not_a_regular_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = check_file(dir.path(), &ScanConfig::default()).unwrap_err();
        assert!(matches!(err, CheckError::NotARegularFile { .. }));
    }

    #[test]
    fn missing_path_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = check_file(&dir.path().join("missing.txt"), &ScanConfig::default()).unwrap_err();
        assert!(matches!(err, CheckError::NotFound { .. }));
    }

    #[test]
    fn too_small_window_is_config_invalid() {
        let f = fixture(b"abc");
        let err = check_file(f.path(), &cfg(3)).unwrap_err();
        assert!(matches!(err, CheckError::ConfigInvalid(_)));
    }

    #[test]
    fn repeated_checks_are_idempotent() {
        let content = b"caf\xC3\xA9 \xED\xA0\x80".to_vec();
        let f = fixture(&content);
        let first = inspect_file(f.path(), &cfg(4)).unwrap();
        let second = inspect_file(f.path(), &cfg(4)).unwrap();
        assert_eq!(first, second);
        assert!(!first.well_formed);
        assert_eq!(std::fs::read(f.path()).unwrap(), content);
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 64, ..ProptestConfig::default() })]

        #[test]
        fn window_size_never_changes_verdict(
            chars in proptest::collection::vec(any::<char>(), 0..48),
            noise in proptest::option::of((any::<prop::sample::Index>(), any::<u8>())),
            max in 4usize..16,
        ) {
            let mut bytes = chars.into_iter().collect::<String>().into_bytes();
            if let Some((idx, b)) = noise {
                if !bytes.is_empty() {
                    let i = idx.index(bytes.len());
                    bytes[i] = b;
                }
            }
            let f = fixture(&bytes);
            let v = inspect_file(f.path(), &cfg(max)).unwrap();
            match std::str::from_utf8(&bytes) {
                Ok(_) => prop_assert!(v.well_formed),
                Err(e) => {
                    prop_assert!(!v.well_formed);
                    prop_assert_eq!(v.valid_up_to, e.valid_up_to() as u64);
                }
            }
        }
    }
}
