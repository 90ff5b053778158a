//! # SFP Driver
//!
//! 驱动层：模块发现、注册表、诊断刷新、滚动统计与查询接口。
//!
//! - [`SfpMonitor`]：持有传输层和注册表的上下文，注册表的唯一写入者
//! - [`Scheduler`]：自动发现与诊断刷新两个周期任务
//! - 查询接口：[`SfpMonitor::list_modules`]、[`SfpMonitor::get_diagnostics`]、
//!   [`SfpMonitor::get_statistics`]、[`SfpMonitor::get_vendor_specific`]
//!
//! # 示例
//!
//! ```no_run
//! # #[cfg(target_os = "linux")]
//! # fn main() -> Result<(), sfp_driver::DriverError> {
//! use sfp_driver::{MonitorConfig, SfpMonitor};
//!
//! let mut monitor = SfpMonitor::linux(MonitorConfig::default())?;
//! monitor.run_autodiscovery();
//! for module in monitor.list_modules(None)? {
//!     println!("{} on {}", module.serial_number, module.bus);
//! }
//! # Ok(())
//! # }
//! # #[cfg(not(target_os = "linux"))]
//! # fn main() {}
//! ```

pub mod config;
mod error;
pub mod metrics;
mod module;
mod monitor;
pub mod query;
mod registry;
pub mod scheduler;
pub mod statistics;

pub use config::{ConfigError, MonitorConfig};
pub use error::DriverError;
pub use metrics::{MetricsSnapshot, MonitorMetrics};
pub use module::SfpModule;
pub use monitor::SfpMonitor;
pub use query::{
    MeasurementReport, ModuleDiagnostics, ModuleStatisticsReport, ModuleSummary, VendorSpecific,
    WindowReport,
};
pub use registry::ModuleRegistry;
pub use scheduler::{PeriodicTask, ScheduledTask, Scheduler};
pub use statistics::{ModuleStatistics, RollingWindow, WindowSnapshot};
