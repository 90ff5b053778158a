//! 监控器上下文
//!
//! `SfpMonitor` 持有 I2C 传输层、模块注册表、配置和指标，
//! 是发现、刷新和查询的唯一入口。所有可变操作都通过 `&mut self` 完成，
//! 保证注册表只有一个写入者。

use crate::config::MonitorConfig;
use crate::error::DriverError;
use crate::metrics::MonitorMetrics;
use crate::module::SfpModule;
use crate::registry::ModuleRegistry;
use sfp_i2c::{I2cDevice, I2cError, I2cTransport};
use sfp_protocol::{
    DiagnosticsPage, I2C_DIAG_ADDRESS, I2C_INFO_ADDRESS, IdentificationPage, PAGE_SIZE,
    ProtocolError,
};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

#[cfg(target_os = "linux")]
use sfp_i2c::LinuxI2cTransport;

/// SFP 监控器
pub struct SfpMonitor<T: I2cTransport> {
    transport: T,
    config: MonitorConfig,
    registry: ModuleRegistry,
    metrics: Arc<MonitorMetrics>,
}

#[cfg(target_os = "linux")]
impl SfpMonitor<LinuxI2cTransport> {
    /// 使用 Linux i2c-dev 后端创建监控器
    pub fn linux(config: MonitorConfig) -> Result<Self, DriverError> {
        Self::new(LinuxI2cTransport::new(), config)
    }
}

impl<T: I2cTransport> SfpMonitor<T> {
    /// 创建监控器（注册表为空）
    ///
    /// # 错误
    /// - `DriverError::Config`: 配置未通过校验
    pub fn new(transport: T, config: MonitorConfig) -> Result<Self, DriverError> {
        config.validate()?;
        Ok(Self {
            transport,
            config,
            registry: ModuleRegistry::new(),
            metrics: Arc::new(MonitorMetrics::new()),
        })
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// 指标句柄（可以在监控循环之外持有）
    pub fn metrics(&self) -> Arc<MonitorMetrics> {
        Arc::clone(&self.metrics)
    }

    /// 探测单条总线并注册模块
    ///
    /// 依次读取并解析标识页和诊断页，两页都成功后才插入注册表。
    /// 任一步失败时返回错误，注册表不变。
    pub fn discover_bus(&mut self, bus: &str) -> Result<(), DriverError> {
        let page = read_page(&self.transport, bus, I2C_INFO_ADDRESS)?;
        let info = IdentificationPage::try_from(page.as_slice())?;
        let diagnostics = read_diagnostics(&self.transport, bus)?;

        info!(
            "Discovered SFP module on {}: manufacturer={:?} revision={:?} serial={:?} \
             type=0x{:02x} ({}) connector=0x{:02x} ({}) bitrate={} MBd wavelength={} nm",
            bus,
            info.manufacturer,
            info.revision,
            info.serial_number,
            info.transceiver_type,
            info.identifier(),
            info.connector,
            info.connector_kind(),
            info.bitrate_mbd,
            info.wavelength_nm,
        );

        let module = SfpModule::new(bus, info, diagnostics, self.config.statistics_window());
        self.registry.insert(module)?;
        MonitorMetrics::incr(&self.metrics.modules_discovered);
        Ok(())
    }

    /// 执行一轮自动发现
    ///
    /// 已登记过模块的总线直接跳过（按总线去重）。单条总线的失败在这里被吸收，
    /// 只记录日志和指标，不会中断本轮扫描。
    ///
    /// 返回本轮新注册的模块数。
    pub fn run_autodiscovery(&mut self) -> usize {
        let mut discovered = 0;

        for index in self.config.bus_range() {
            let bus = self.config.bus_path(index);
            if self.registry.contains_bus(&bus) {
                trace!("Skipping {}: module already registered", bus);
                continue;
            }

            MonitorMetrics::incr(&self.metrics.discovery_attempts);
            match self.discover_bus(&bus) {
                Ok(()) => discovered += 1,
                Err(e) if e.is_routine() => self.record_discovery_failure(&bus, &e),
                Err(e) => warn!("Unexpected discovery failure on {}: {}", bus, e),
            }
        }

        if discovered > 0 {
            debug!(
                "Autodiscovery found {} new module(s), {} registered",
                discovered,
                self.registry.len()
            );
        }
        discovered
    }

    /// 刷新单个模块的诊断数据
    ///
    /// 成功时整体替换诊断快照并把实时值压入统计窗口；
    /// 失败时旧快照保持不变，错误返回给调用方。
    ///
    /// # 错误
    /// - `DriverError::NotFound`: 序列号未注册
    /// - `DriverError::Bus` / `DriverError::Protocol`: 读取或解析失败
    pub fn refresh(&mut self, serial_number: &str) -> Result<(), DriverError> {
        let module = self
            .registry
            .find_mut(serial_number)
            .ok_or_else(|| DriverError::NotFound(serial_number.to_string()))?;

        match read_diagnostics(&self.transport, module.bus()) {
            Ok(diagnostics) => {
                module.apply_diagnostics(diagnostics);
                MonitorMetrics::incr(&self.metrics.refreshes_total);
                Ok(())
            },
            Err(e) => {
                MonitorMetrics::incr(&self.metrics.refresh_failures);
                Err(e)
            },
        }
    }

    /// 刷新所有已注册模块
    ///
    /// 每个模块的失败单独记录日志，不影响其它模块。返回成功刷新的模块数。
    pub fn refresh_all(&mut self) -> usize {
        let mut refreshed = 0;

        for module in self.registry.iter_mut() {
            match read_diagnostics(&self.transport, module.bus()) {
                Ok(diagnostics) => {
                    module.apply_diagnostics(diagnostics);
                    MonitorMetrics::incr(&self.metrics.refreshes_total);
                    refreshed += 1;
                },
                Err(e) => {
                    MonitorMetrics::incr(&self.metrics.refresh_failures);
                    warn!(
                        "Failed to refresh diagnostics of {} on {}: {}",
                        module.serial_number(),
                        module.bus(),
                        e
                    );
                },
            }
        }
        refreshed
    }

    /// 按错误类别更新指标，只处理 [`DriverError::is_routine`] 的错误
    fn record_discovery_failure(&self, bus: &str, error: &DriverError) {
        match error {
            DriverError::Bus(I2cError::Unavailable(e)) => {
                MonitorMetrics::incr(&self.metrics.bus_unavailable);
                if e.is_fatal() {
                    warn!("Cannot scan {}: {}", bus, e);
                } else {
                    trace!("No module on {}: {}", bus, e);
                }
            },
            DriverError::Bus(I2cError::Io(e)) => {
                MonitorMetrics::incr(&self.metrics.io_failures);
                debug!("I/O error while probing {}: {}", bus, e);
            },
            DriverError::Protocol(ProtocolError::ChecksumMismatch { .. }) => {
                MonitorMetrics::incr(&self.metrics.checksum_failures);
                debug!("Ignoring module on {}: {}", bus, error);
            },
            DriverError::Protocol(e) => {
                MonitorMetrics::incr(&self.metrics.decode_failures);
                debug!("Failed to decode page on {}: {}", bus, e);
            },
            DriverError::DuplicateKey(serial) => {
                MonitorMetrics::incr(&self.metrics.duplicate_keys);
                warn!(
                    "Module on {} reports serial {:?} which is already registered, keeping the first one",
                    bus, serial
                );
            },
            // 非常规错误已在 run_autodiscovery 中记录
            _ => {},
        }
    }
}

/// 打开 -> 读取整页 -> 关闭（句柄在返回时 drop）
fn read_page<T: I2cTransport>(transport: &T, bus: &str, address: u16) -> Result<Vec<u8>, I2cError> {
    let mut device = transport.open(bus, address)?;
    device.read_page(PAGE_SIZE)
}

fn read_diagnostics<T: I2cTransport>(
    transport: &T,
    bus: &str,
) -> Result<DiagnosticsPage, DriverError> {
    let page = read_page(transport, bus, I2C_DIAG_ADDRESS)?;
    Ok(DiagnosticsPage::try_from(page.as_slice())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sfp_i2c::MockI2cTransport;
    use sfp_protocol::{CHECKSUM_OFFSET, SERIAL_NO_OFFSET, compute_checksum};

    fn info_page(serial: &str) -> Vec<u8> {
        let mut page = vec![0x20u8; PAGE_SIZE];
        page[0] = 0x03;
        page[2] = 0x07;
        page[SERIAL_NO_OFFSET..SERIAL_NO_OFFSET + serial.len()].copy_from_slice(serial.as_bytes());
        page[CHECKSUM_OFFSET] = compute_checksum(&page[..CHECKSUM_OFFSET]);
        page
    }

    fn diag_page(temperature: i8) -> Vec<u8> {
        let mut page = vec![0u8; PAGE_SIZE];
        page[96] = temperature as u8;
        page
    }

    fn config() -> MonitorConfig {
        MonitorConfig {
            bus_min: 0,
            bus_max: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = MonitorConfig {
            bus_min: 3,
            bus_max: 1,
            ..Default::default()
        };
        let result = SfpMonitor::new(MockI2cTransport::new(), config);
        assert!(matches!(result, Err(DriverError::Config(_))));
    }

    #[test]
    fn test_discover_bus() {
        let transport = MockI2cTransport::new();
        transport.set_page("/dev/i2c-1", I2C_INFO_ADDRESS, info_page("SN0001"));
        transport.set_page("/dev/i2c-1", I2C_DIAG_ADDRESS, diag_page(40));

        let mut monitor = SfpMonitor::new(transport, config()).unwrap();
        monitor.discover_bus("/dev/i2c-1").unwrap();

        let module = monitor.registry().find("SN0001").unwrap();
        assert_eq!(module.bus(), "/dev/i2c-1");
        assert_eq!(module.diagnostics().value.temperature, 40.0);
        assert_eq!(module.statistics().unwrap().temperature.samples(), 1);
    }

    #[test]
    fn test_discover_requires_diagnostics_page() {
        let transport = MockI2cTransport::new();
        transport.set_page("/dev/i2c-1", I2C_INFO_ADDRESS, info_page("SN0001"));

        let mut monitor = SfpMonitor::new(transport, config()).unwrap();
        let err = monitor.discover_bus("/dev/i2c-1").unwrap_err();
        assert!(matches!(err, DriverError::Bus(ref e) if e.is_unavailable()));
        assert!(monitor.registry().is_empty());
    }

    #[test]
    fn test_failure_metrics() {
        let transport = MockI2cTransport::new();
        let mut bad = info_page("SN0001");
        bad[CHECKSUM_OFFSET] ^= 0xFF;
        transport.set_page("/dev/i2c-0", I2C_INFO_ADDRESS, bad);
        transport.set_page("/dev/i2c-2", I2C_INFO_ADDRESS, info_page("SN0002"));
        transport.set_page("/dev/i2c-2", I2C_DIAG_ADDRESS, diag_page(20));
        transport.truncate_reads("/dev/i2c-2", I2C_INFO_ADDRESS, 10);

        let mut monitor = SfpMonitor::new(transport, config()).unwrap();
        assert_eq!(monitor.run_autodiscovery(), 0);

        let snapshot = monitor.metrics().snapshot();
        assert_eq!(snapshot.discovery_attempts, 3);
        assert_eq!(snapshot.checksum_failures, 1);
        assert_eq!(snapshot.bus_unavailable, 1);
        assert_eq!(snapshot.decode_failures, 1);
    }

    #[test]
    fn test_refresh_unknown_serial() {
        let mut monitor = SfpMonitor::new(MockI2cTransport::new(), config()).unwrap();
        let err = monitor.refresh("MISSING").unwrap_err();
        assert!(matches!(err, DriverError::NotFound(ref s) if s == "MISSING"));
    }

    #[test]
    fn test_refresh_all_counts_successes() {
        let transport = MockI2cTransport::new();
        for (bus, serial) in [("/dev/i2c-0", "SN-A"), ("/dev/i2c-1", "SN-B")] {
            transport.set_page(bus, I2C_INFO_ADDRESS, info_page(serial));
            transport.set_page(bus, I2C_DIAG_ADDRESS, diag_page(30));
        }

        let mut monitor = SfpMonitor::new(transport.clone(), config()).unwrap();
        assert_eq!(monitor.run_autodiscovery(), 2);

        transport.fail_seek("/dev/i2c-1", I2C_DIAG_ADDRESS);
        assert_eq!(monitor.refresh_all(), 1);

        let snapshot = monitor.metrics().snapshot();
        assert_eq!(snapshot.refreshes_total, 1);
        assert_eq!(snapshot.refresh_failures, 1);
    }
}
