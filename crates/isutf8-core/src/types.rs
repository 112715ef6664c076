//! 公共类型（对外暴露）
use serde::Serialize;

/// 输出项结构（JSON 报告数组中的单个元素）
#[derive(Debug, Clone, Serialize)]
pub struct ReportItem<'a> {
    pub path: &'a str,
    pub well_formed: bool,
    /// 首个非法序列的偏移；良构时为文件长度；出错时为空
    pub valid_up_to: Option<u64>,
    /// 无法检查时的错误信息
    pub error: Option<String>,
}
