//! 核心校验库：判断文件内容是否为良构 UTF-8，且不要求整个文件驻留内存
//!
//! 设计要点：
//! - 文件按有上限的窗口分段读取，逐窗口按 Unicode 表 3-7 校验字节文法。
//! - 非最终窗口在检查区末尾预留 3 字节，跨窗口边界的多字节序列留到下一个窗口重新检查。
//! - 文件偏移只按“已确认”的字节数推进，而不是整个窗口长度。
//! - “不是良构 UTF-8”是正常结果；打开失败、非普通文件等才是错误，且只影响该文件。

mod config;
mod error;
mod options;
mod planner;
mod scan;
mod scanner;
mod types;
mod validator;
mod view;

pub use config::{load_config, parse_config, CheckSection};
pub use error::CheckError;
pub use options::{CheckOptions, CheckStats, OutputFormat, ScanConfig, DEFAULT_MAX_WINDOW_BYTES};
pub use planner::{plan, Window, WindowPlan, RESERVED_TAIL};
pub use scan::check_and_write;
pub use scanner::{check_file, inspect_file, FileVerdict};
pub use types::ReportItem;
pub use validator::{validate, validate_all, ValidationOutcome, MAX_SEQUENCE_LEN};
pub use view::DEFAULT_ALIGN;
