//! 良构 UTF-8 字节序列校验
//!
//! 依据 Unicode 标准第 3 章表 3-7（Well-Formed UTF-8 Byte Sequences）：
//! 按首字节区间查表，得到后续字节个数及每个后续字节的合法区间。
//! 表本身已排除代理区（U+D800..U+DFFF）与超长编码。

/// 单个码点编码的最大字节数
pub const MAX_SEQUENCE_LEN: usize = 4;

/// 闭区间 `[lo, hi]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ByteRange {
    lo: u8,
    hi: u8,
}

impl ByteRange {
    const fn new(lo: u8, hi: u8) -> Self {
        Self { lo, hi }
    }

    #[inline]
    fn contains(self, b: u8) -> bool {
        self.lo <= b && b <= self.hi
    }
}

const CONT: ByteRange = ByteRange::new(0x80, 0xBF);

/// 一条文法规则：首字节区间 + 各后续字节区间
struct SequenceRule {
    lead: ByteRange,
    tail: &'static [ByteRange],
}

#[rustfmt::skip]
static GRAMMAR: [SequenceRule; 9] = [
    // U+0000..U+007F
    SequenceRule { lead: ByteRange::new(0x00, 0x7F), tail: &[] },
    // U+0080..U+07FF
    SequenceRule { lead: ByteRange::new(0xC2, 0xDF), tail: &[CONT] },
    // U+0800..U+0FFF
    SequenceRule { lead: ByteRange::new(0xE0, 0xE0), tail: &[ByteRange::new(0xA0, 0xBF), CONT] },
    // U+1000..U+CFFF
    SequenceRule { lead: ByteRange::new(0xE1, 0xEC), tail: &[CONT, CONT] },
    // U+D000..U+D7FF
    SequenceRule { lead: ByteRange::new(0xED, 0xED), tail: &[ByteRange::new(0x80, 0x9F), CONT] },
    // U+E000..U+FFFF
    SequenceRule { lead: ByteRange::new(0xEE, 0xEF), tail: &[CONT, CONT] },
    // U+10000..U+3FFFF
    SequenceRule { lead: ByteRange::new(0xF0, 0xF0), tail: &[ByteRange::new(0x90, 0xBF), CONT, CONT] },
    // U+40000..U+FFFFF
    SequenceRule { lead: ByteRange::new(0xF1, 0xF3), tail: &[CONT, CONT, CONT] },
    // U+100000..U+10FFFF
    SequenceRule { lead: ByteRange::new(0xF4, 0xF4), tail: &[ByteRange::new(0x80, 0x8F), CONT, CONT] },
];

/// 一次窗口校验的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOutcome {
    /// 检查区内未发现非法序列
    pub is_well_formed: bool,
    /// 自 `start` 起已确认为完整合法码点的字节数。
    /// 失败时为非法序列之前的前缀长度；成功时最后一个序列可能跨过
    /// `check_end` 伸入预留尾部，因此最多超出检查区 `MAX_SEQUENCE_LEN - 1` 字节。
    pub bytes_confirmed: u64,
}

/// 光标处单步状态转移
enum Step {
    /// 接受一个完整序列，光标前进 n 字节
    Accept(usize),
    /// 首字节无匹配规则、后续字节越界或不足
    Reject,
}

#[inline]
fn step(bytes: &[u8], i: usize) -> Step {
    let lead = bytes[i];
    let Some(rule) = GRAMMAR.iter().find(|r| r.lead.contains(lead)) else {
        return Step::Reject;
    };
    let len = 1 + rule.tail.len();
    // 前瞻以窗口实际长度为界，而不是 check_end
    let Some(tail) = bytes.get(i + 1..i + len) else {
        return Step::Reject;
    };
    if tail.iter().zip(rule.tail).all(|(&b, range)| range.contains(b)) {
        Step::Accept(len)
    } else {
        Step::Reject
    }
}

/// 校验 `bytes[start..check_end]` 内起始的所有码点
///
/// - `bytes`：整个可用窗口；`check_end` 之后的尾部只用于跨边界前瞻
/// - `start`：检查起点（对齐读取时窗口前部可能有不关心的字节）
/// - `check_end`：检查终点，只有起始于它之前的序列才会被检查
///
/// 遇到第一个非法序列立即停止。`check_end` 超出窗口时按窗口长度截断。
pub fn validate(bytes: &[u8], start: usize, check_end: usize) -> ValidationOutcome {
    let end = check_end.min(bytes.len());
    let mut i = start;
    while i < end {
        match step(bytes, i) {
            Step::Accept(n) => i += n,
            Step::Reject => {
                return ValidationOutcome { is_well_formed: false, bytes_confirmed: (i - start) as u64 };
            }
        }
    }
    ValidationOutcome { is_well_formed: true, bytes_confirmed: i.saturating_sub(start) as u64 }
}

/// 整段校验（检查区即整个切片）
pub fn validate_all(bytes: &[u8]) -> ValidationOutcome {
    validate(bytes, 0, bytes.len())
}
