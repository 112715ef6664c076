use anyhow::{Context, Result};
use clap::Parser;
use isutf8_core::{check_and_write, load_config, CheckOptions, OutputFormat};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

/// 命令行入口（基于 clap）
#[derive(Parser, Debug)]
#[command(name = "isutf8", version, about = "检查文件内容是否为良构 UTF-8")]
struct Cli {
    /// 待检查的文件（按参数顺序逐个检查并输出）
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// 每个窗口最多读取的字节数（至少 4；主要用于测试跨窗口边界）
    #[arg(long)]
    max_window_bytes: Option<usize>,

    /// 读取起点对齐粒度（2 的幂）
    #[arg(long)]
    align_bytes: Option<usize>,

    /// 线程数（文件间并行；"auto"=CPU 核心数）
    #[arg(long)]
    threads: Option<String>,

    /// 输出格式：text 或 json（默认 text）
    #[arg(long, value_parser = ["text", "json"])]
    format: Option<String>,

    /// 配置文件路径（TOML，[check] 表）；命令行参数优先
    #[arg(long)]
    config: Option<PathBuf>,
}

/// 退出码：全部良构
const EXIT_OK: u8 = 0;
/// 退出码：存在非良构文件
const EXIT_NOT_UTF8: u8 = 1;
/// 退出码：存在无法检查的文件
const EXIT_ERROR: u8 = 2;

fn main() -> Result<ExitCode> {
    // 初始化日志（支持通过 RUST_LOG 控制等级，例如 info、debug）
    init_tracing();
    let cli = Cli::parse();

    let opts = build_options(&cli)?;
    info!(files = cli.files.len(), max_window_bytes = opts.scan.max_window_bytes, "starting check");

    // 报告写到 stdout，日志写到 stderr
    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let stats = check_and_write(&cli.files, &mut out, &opts).context("check and write failed")?;
    out.flush().context("flush report")?;

    info!(
        files_checked = stats.files_checked,
        well_formed = stats.well_formed,
        not_well_formed = stats.not_well_formed,
        errors = stats.errors,
        "check finished"
    );

    let code = if stats.all_well_formed() {
        EXIT_OK
    } else if stats.errors > 0 {
        EXIT_ERROR
    } else {
        EXIT_NOT_UTF8
    };
    Ok(ExitCode::from(code))
}

/// 组装检查参数：内置默认值 < 配置文件 < 命令行
fn build_options(cli: &Cli) -> Result<CheckOptions> {
    let mut opts = CheckOptions::default();
    if let Some(path) = &cli.config {
        load_config(path)?.apply(&mut opts);
    }
    if let Some(v) = cli.max_window_bytes { opts.scan.max_window_bytes = v; }
    if let Some(v) = cli.align_bytes { opts.scan.align_bytes = v; }
    if let Some(t) = &cli.threads { opts.threads = parse_threads(t); }
    if let Some(f) = &cli.format {
        opts.format = match f.as_str() {
            "json" => OutputFormat::Json,
            _ => OutputFormat::Text,
        };
    }
    // 非法窗口配置不在这里拦截：按单文件错误报告，其余文件照常输出
    Ok(opts)
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    // 支持通过环境变量 RUST_LOG 控制日志等级，如：RUST_LOG=debug
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// 解析线程参数
fn parse_threads(s: &str) -> Option<usize> {
    if s.eq_ignore_ascii_case("auto") { return None; }
    match s.parse::<usize>() {
        Ok(n) if n >= 1 => Some(n),
        _ => None,
    }
}
