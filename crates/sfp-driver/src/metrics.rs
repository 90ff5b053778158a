//! 监控器运行指标
//!
//! 原子计数器，可以在任何线程读取快照（例如信号处理或退出日志），
//! 不需要借用监控器本身。

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// 监控器实时指标
#[derive(Debug, Default)]
pub struct MonitorMetrics {
    /// 探测的总线次数（跳过的已占用总线不计）
    pub discovery_attempts: AtomicU64,
    /// 成功发现并注册的模块数
    pub modules_discovered: AtomicU64,
    /// 总线/从设备不可用次数（空槽位）
    pub bus_unavailable: AtomicU64,
    /// 传输中途 IO 错误次数
    pub io_failures: AtomicU64,
    /// 标识页校验和失败次数
    pub checksum_failures: AtomicU64,
    /// 短读等其它解析失败次数
    pub decode_failures: AtomicU64,
    /// 注册时序列号冲突次数
    pub duplicate_keys: AtomicU64,
    /// 诊断刷新成功次数
    pub refreshes_total: AtomicU64,
    /// 诊断刷新失败次数
    pub refresh_failures: AtomicU64,
}

impl MonitorMetrics {
    /// 创建新的指标实例（所有计数器初始化为 0）
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// 获取指标快照
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            discovery_attempts: self.discovery_attempts.load(Ordering::Relaxed),
            modules_discovered: self.modules_discovered.load(Ordering::Relaxed),
            bus_unavailable: self.bus_unavailable.load(Ordering::Relaxed),
            io_failures: self.io_failures.load(Ordering::Relaxed),
            checksum_failures: self.checksum_failures.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            duplicate_keys: self.duplicate_keys.load(Ordering::Relaxed),
            refreshes_total: self.refreshes_total.load(Ordering::Relaxed),
            refresh_failures: self.refresh_failures.load(Ordering::Relaxed),
        }
    }
}

/// 指标快照（普通数值）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub discovery_attempts: u64,
    pub modules_discovered: u64,
    pub bus_unavailable: u64,
    pub io_failures: u64,
    pub checksum_failures: u64,
    pub decode_failures: u64,
    pub duplicate_keys: u64,
    pub refreshes_total: u64,
    pub refresh_failures: u64,
}
