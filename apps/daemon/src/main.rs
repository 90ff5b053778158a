//! SFP 监控守护进程主入口
//!
//! 周期性扫描 I2C 总线范围发现 SFP 模块，并持续刷新诊断数据。
//!
//! ```bash
//! # 探测 /dev/i2c-0 ~ /dev/i2c-4（默认）
//! sfp-monitor
//!
//! # 只探测 /dev/i2c-2 ~ /dev/i2c-3，同时写入日志文件
//! sfp-monitor -m 2 -n 3 --log-dir /var/log/sfp-monitor
//!
//! # 扫描一次并以 JSON 输出所有模块信息
//! sfp-monitor --once
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use sfp_driver::{
    MetricsSnapshot, ModuleDiagnostics, ModuleStatisticsReport, ModuleSummary, MonitorConfig,
    Scheduler, SfpMonitor,
};
use sfp_i2c::I2cTransport;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// 未设置 `RUST_LOG` 时的日志过滤
const DEFAULT_LOG_FILTER: &str = "sfp_monitor=info,sfp_driver=info";

/// SFP 光模块监控守护进程
#[derive(Parser, Debug)]
#[command(name = "sfp-monitor")]
#[command(about = "SFP transceiver monitor - discovers modules on I2C buses and tracks diagnostics", long_about = None)]
#[command(version)]
struct Args {
    /// TOML 配置文件
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 第一个探测的总线编号（覆盖配置文件）
    #[arg(short = 'm', long)]
    bus_min: Option<u32>,

    /// 最后一个探测的总线编号（覆盖配置文件）
    #[arg(short = 'n', long)]
    bus_max: Option<u32>,

    /// 日志目录（按天轮转），默认只输出到 stderr
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// 扫描一次，以 JSON 打印结果后退出
    #[arg(long)]
    once: bool,
}

/// `--once` 模式的输出
#[derive(Debug, Serialize)]
struct Dump {
    modules: Vec<ModuleSummary>,
    diagnostics: Vec<ModuleDiagnostics>,
    statistics: Vec<ModuleStatisticsReport>,
    metrics: MetricsSnapshot,
}

fn init_logging(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter =
        || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_filter(filter());

    let Some(dir) = log_dir else {
        tracing_subscriber::registry().with(stderr_layer).init();
        return Ok(None);
    };

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    let appender = tracing_appender::rolling::daily(dir, "sfp-monitor.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_filter(filter());

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();
    Ok(Some(guard))
}

/// 加载配置文件（可选），再应用命令行覆盖
fn build_config(args: &Args) -> Result<MonitorConfig> {
    let mut config = match &args.config {
        Some(path) => MonitorConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => MonitorConfig::default(),
    };

    if let Some(bus_min) = args.bus_min {
        config.bus_min = bus_min;
    }
    if let Some(bus_max) = args.bus_max {
        config.bus_max = bus_max;
    }
    config.validate().context("Invalid bus range")?;
    Ok(config)
}

/// 执行一轮发现，返回 JSON 文本
fn dump_once<T: I2cTransport>(monitor: &mut SfpMonitor<T>) -> Result<String> {
    monitor.run_autodiscovery();
    let dump = Dump {
        modules: monitor.list_modules(None)?,
        diagnostics: monitor.get_diagnostics(None)?,
        statistics: monitor.get_statistics(None)?,
        metrics: monitor.metrics().snapshot(),
    };
    Ok(serde_json::to_string_pretty(&dump)?)
}

fn serve<T: I2cTransport>(mut monitor: SfpMonitor<T>, args: &Args) -> Result<()> {
    if args.once {
        println!("{}", dump_once(&mut monitor)?);
        return Ok(());
    }

    let running = Arc::new(AtomicBool::new(true));
    let running_for_handler = Arc::clone(&running);
    ctrlc::set_handler(move || {
        running_for_handler.store(false, Ordering::SeqCst);
    })
    .context("Failed to set signal handler")?;

    info!("SFP monitor started. Press Ctrl+C to stop.");
    let mut scheduler = Scheduler::new(monitor.config(), Instant::now());
    scheduler.run(&mut monitor, &running);

    info!(
        "SFP monitor stopped with {} module(s) registered: {:?}",
        monitor.registry().len(),
        monitor.metrics().snapshot()
    );
    Ok(())
}

#[cfg(target_os = "linux")]
fn start(args: &Args, config: MonitorConfig) -> Result<()> {
    let monitor = SfpMonitor::linux(config)?;
    serve(monitor, args)
}

#[cfg(not(target_os = "linux"))]
fn start(_args: &Args, _config: MonitorConfig) -> Result<()> {
    anyhow::bail!("I2C bus access is only supported on Linux (i2c-dev)")
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = init_logging(args.log_dir.as_deref())?;

    let config = build_config(&args)?;
    info!(
        "Probing {}{}..={} every {} ms (diagnostics every {} ms, statistics window {})",
        config.bus_path_prefix,
        config.bus_min,
        config.bus_max,
        config.discovery_interval_ms,
        config.diagnostics_interval_ms,
        config.statistics_window
    );

    start(&args, config)
}
