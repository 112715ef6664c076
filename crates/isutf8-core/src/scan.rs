//! 多文件检查主流程与并行调度
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::CheckError;
use crate::options::{CheckOptions, CheckStats, OutputFormat, ScanConfig};
use crate::scanner::{inspect_file, FileVerdict};
use crate::types::ReportItem;

/// 单个文件的检查结果（worker → writer）
type FileResult = Result<FileVerdict, CheckError>;

/// 依次检查 `paths` 中的每个文件，并按参数顺序把报告写入 `out`
///
/// 单个文件的错误不会中断整次运行：写出失败行并计入 `CheckStats::errors`。
/// 文件之间可并行（线程数 > 1），同一文件内的窗口始终串行。
pub fn check_and_write(paths: &[PathBuf], out: &mut dyn Write, opts: &CheckOptions) -> Result<CheckStats> {
    let mut stats = CheckStats::default();
    let mut writer = ReportWriter::begin(out, opts.format)?;

    let threads = opts.threads.unwrap_or_else(num_cpus::get).max(1);
    if threads > 1 && paths.len() > 1 {
        check_parallel(paths, &mut writer, &opts.scan, &mut stats, threads)?;
    } else {
        for path in paths {
            let res = check_one(path, &opts.scan);
            writer.write(path, &res, &mut stats)?;
        }
    }

    writer.finish()?;
    Ok(stats)
}

/// 检查单个文件并记录日志
fn check_one(path: &Path, config: &ScanConfig) -> FileResult {
    let res = inspect_file(path, config);
    match &res {
        Ok(v) if v.well_formed => info!(path = %path.display(), bytes = v.file_len, windows = v.windows, "well-formed"),
        Ok(v) => info!(path = %path.display(), valid_up_to = v.valid_up_to, "not well-formed"),
        Err(e) => warn!(path = %path.display(), kind = e.kind_name(), "{e}"),
    }
    res
}

/// 并行调度：
/// - Rayon 线程池并行检查各文件
/// - 单线程 Writer 按 idx 重排后流式输出，保证与参数顺序一致
fn check_parallel(
    paths: &[PathBuf],
    writer: &mut ReportWriter<'_>,
    config: &ScanConfig,
    stats: &mut CheckStats,
    threads: usize,
) -> Result<()> {
    use crossbeam_channel as channel;
    use rayon::prelude::*;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .context("build rayon pool")?;

    type Msg = (usize /*idx*/, FileResult);
    let (tx, rx) = channel::bounded::<Msg>(256);

    let config = *config;
    let jobs: Vec<(usize, PathBuf)> = paths.iter().cloned().enumerate().collect();

    // Writer 留在当前线程；检查在后台线程内的线程池中执行
    let check_thread = std::thread::spawn(move || {
        pool.install(|| {
            jobs.par_iter().for_each(|(idx, path)| {
                let _ = tx.send((*idx, check_one(path, &config)));
            });
        });
        // 结束后 Sender 被丢弃，Receiver 收到关闭信号
    });

    let mut next_idx: usize = 0;
    let mut pending: BTreeMap<usize, FileResult> = BTreeMap::new();
    while let Ok((idx, res)) = rx.recv() {
        pending.insert(idx, res);
        while let Some(res) = pending.remove(&next_idx) {
            writer.write(&paths[next_idx], &res, stats)?;
            next_idx += 1;
        }
    }

    if check_thread.join().is_err() {
        anyhow::bail!("check worker panicked");
    }
    debug_assert!(pending.is_empty());
    Ok(())
}

/// 报告写出器：文本逐行，JSON 为流式数组
struct ReportWriter<'a> {
    out: &'a mut dyn Write,
    format: OutputFormat,
    first: bool,
}

impl<'a> ReportWriter<'a> {
    fn begin(out: &'a mut dyn Write, format: OutputFormat) -> Result<Self> {
        if format == OutputFormat::Json {
            write!(out, "[")?;
        }
        Ok(Self { out, format, first: true })
    }

    fn write(&mut self, path: &Path, res: &FileResult, stats: &mut CheckStats) -> Result<()> {
        stats.files_checked += 1;
        match res {
            Ok(v) if v.well_formed => stats.well_formed += 1,
            Ok(_) => stats.not_well_formed += 1,
            Err(_) => stats.errors += 1,
        }
        let well_formed = matches!(res, Ok(v) if v.well_formed);
        let shown = path.to_string_lossy();

        match self.format {
            OutputFormat::Text => {
                writeln!(self.out, "{} {}", well_formed, shown).context("write report")?;
            }
            OutputFormat::Json => {
                if !self.first { write!(self.out, ",")?; } else { self.first = false; }
                let item = ReportItem {
                    path: &shown,
                    well_formed,
                    valid_up_to: res.as_ref().ok().map(|v| v.valid_up_to),
                    error: res.as_ref().err().map(|e| e.to_string()),
                };
                serde_json::to_writer(&mut *self.out, &item).context("write report")?;
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<()> {
        if self.format == OutputFormat::Json {
            writeln!(self.out, "]")?;
        }
        Ok(())
    }
}
