//! 监控器配置
//!
//! 对应进程启动时传入的参数：探测的总线范围、各周期任务的间隔、统计窗口大小。
//! 可以从 TOML 文件加载，所有字段都有默认值。
//!
//! ```toml
//! bus_min = 0
//! bus_max = 4
//! discovery_interval_ms = 10000
//! diagnostics_interval_ms = 100
//! statistics_window = 600
//! ```

use serde::{Deserialize, Serialize};
use sfp_i2c::{DEFAULT_BUS_PATH_PREFIX, bus_device_path};
use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// 监控器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// 第一个探测的总线编号（包含）
    pub bus_min: u32,
    /// 最后一个探测的总线编号（包含）
    pub bus_max: u32,
    /// 总线设备路径前缀，路径 = 前缀 + 编号
    pub bus_path_prefix: String,
    /// 自动发现间隔（毫秒）
    pub discovery_interval_ms: u64,
    /// 诊断数据周期刷新间隔（毫秒），0 表示只在查询时刷新
    pub diagnostics_interval_ms: u64,
    /// 滚动统计窗口大小（样本数），0 表示关闭统计
    pub statistics_window: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            bus_min: 0,
            bus_max: 4,
            bus_path_prefix: DEFAULT_BUS_PATH_PREFIX.to_string(),
            discovery_interval_ms: 10_000,
            diagnostics_interval_ms: 100,
            statistics_window: 600,
        }
    }
}

impl MonitorConfig {
    /// 从 TOML 字符串解析并校验
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 从 TOML 文件加载并校验
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bus_min > self.bus_max {
            return Err(ConfigError::Invalid(format!(
                "bus_min ({}) is greater than bus_max ({})",
                self.bus_min, self.bus_max
            )));
        }
        if self.discovery_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "discovery_interval_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// 探测的总线编号范围
    pub fn bus_range(&self) -> RangeInclusive<u32> {
        self.bus_min..=self.bus_max
    }

    /// 总线编号对应的设备路径
    pub fn bus_path(&self, index: u32) -> String {
        bus_device_path(&self.bus_path_prefix, index)
    }

    pub fn discovery_interval(&self) -> Duration {
        Duration::from_millis(self.discovery_interval_ms)
    }

    /// 诊断刷新间隔，关闭时返回 `None`
    pub fn diagnostics_interval(&self) -> Option<Duration> {
        (self.diagnostics_interval_ms > 0).then(|| Duration::from_millis(self.diagnostics_interval_ms))
    }

    /// 统计窗口大小，关闭时返回 `None`
    pub fn statistics_window(&self) -> Option<usize> {
        (self.statistics_window > 0).then_some(self.statistics_window)
    }
}
