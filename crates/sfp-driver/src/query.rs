//! 查询接口
//!
//! 供外部 RPC 层调用的只读视图。所有结果都实现 `Serialize`，
//! 诊断和统计中的小数统一格式化为保留 4 位小数的字符串。

use crate::error::DriverError;
use crate::module::SfpModule;
use crate::monitor::SfpMonitor;
use crate::statistics::{ModuleStatistics, RollingWindow, WindowSnapshot};
use serde::{Serialize, Serializer};
use sfp_i2c::I2cTransport;
use sfp_protocol::{DiagnosticsPage, Measurements};
use tracing::warn;

/// 小数格式化（固定 4 位小数）
pub fn format_decimal(value: f64) -> String {
    format!("{:.4}", value)
}

/// `list_modules` 的单条结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleSummary {
    pub bus: String,
    pub manufacturer: String,
    pub revision: String,
    pub serial_number: String,
    #[serde(rename = "type")]
    pub transceiver_type: u8,
    pub connector: u8,
    /// MBd
    pub bitrate: u32,
    /// nm
    pub wavelength: u16,
}

impl From<&SfpModule> for ModuleSummary {
    fn from(module: &SfpModule) -> Self {
        let info = module.info();
        Self {
            bus: module.bus().to_string(),
            manufacturer: info.manufacturer.clone(),
            revision: info.revision.clone(),
            serial_number: info.serial_number.clone(),
            transceiver_type: info.transceiver_type,
            connector: info.connector,
            bitrate: info.bitrate_mbd,
            wavelength: info.wavelength_nm,
        }
    }
}

/// 一个通道的五个测量值（已格式化）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeasurementReport {
    pub temperature: String,
    pub vcc: String,
    pub tx_bias: String,
    pub tx_power: String,
    pub rx_power: String,
}

impl From<&Measurements> for MeasurementReport {
    fn from(m: &Measurements) -> Self {
        Self {
            temperature: format_decimal(m.temperature),
            vcc: format_decimal(m.vcc),
            tx_bias: format_decimal(m.tx_bias),
            tx_power: format_decimal(m.tx_power),
            rx_power: format_decimal(m.rx_power),
        }
    }
}

/// `get_diagnostics` 的单条结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleDiagnostics {
    pub serial_number: String,
    pub value: MeasurementReport,
    pub error_upper: MeasurementReport,
    pub error_lower: MeasurementReport,
    pub warning_upper: MeasurementReport,
    pub warning_lower: MeasurementReport,
}

impl ModuleDiagnostics {
    fn new(serial_number: &str, page: &DiagnosticsPage) -> Self {
        Self {
            serial_number: serial_number.to_string(),
            value: (&page.value).into(),
            error_upper: (&page.error_upper).into(),
            error_lower: (&page.error_lower).into(),
            warning_upper: (&page.warning_upper).into(),
            warning_lower: (&page.warning_lower).into(),
        }
    }
}

/// 单个测量量的统计结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowReport {
    pub average: String,
    pub count: usize,
    pub variance: String,
    pub minimum: String,
    pub maximum: String,
}

impl WindowReport {
    /// 统计关闭或窗口为空
    fn empty() -> Self {
        Self {
            average: format_decimal(0.0),
            count: 0,
            variance: format_decimal(0.0),
            minimum: format_decimal(0.0),
            maximum: format_decimal(0.0),
        }
    }
}

impl From<WindowSnapshot> for WindowReport {
    fn from(snapshot: WindowSnapshot) -> Self {
        // 空窗口的极值是 ±inf，对外统一报 0
        if snapshot.count == 0 {
            return Self::empty();
        }
        Self {
            average: format_decimal(snapshot.average),
            count: snapshot.count,
            variance: format_decimal(snapshot.variance),
            minimum: format_decimal(snapshot.minimum),
            maximum: format_decimal(snapshot.maximum),
        }
    }
}

/// `get_statistics` 的单条结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleStatisticsReport {
    pub serial_number: String,
    pub temperature: WindowReport,
    pub vcc: WindowReport,
    pub tx_bias: WindowReport,
    pub tx_power: WindowReport,
    pub rx_power: WindowReport,
}

impl From<&SfpModule> for ModuleStatisticsReport {
    fn from(module: &SfpModule) -> Self {
        let report = |select: fn(&ModuleStatistics) -> &RollingWindow| {
            module
                .statistics()
                .map(|stats| WindowReport::from(select(stats).snapshot()))
                .unwrap_or_else(WindowReport::empty)
        };
        Self {
            serial_number: module.serial_number().to_string(),
            temperature: report(|s| &s.temperature),
            vcc: report(|s| &s.vcc),
            tx_bias: report(|s| &s.tx_bias),
            tx_power: report(|s| &s.tx_power),
            rx_power: report(|s| &s.rx_power),
        }
    }
}

/// `get_vendor_specific` 的结果（序列化为十六进制字符串）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VendorSpecific {
    pub serial_number: String,
    #[serde(serialize_with = "serialize_hex")]
    pub data: Vec<u8>,
}

impl VendorSpecific {
    pub fn to_hex(&self) -> String {
        hex::encode(&self.data)
    }
}

fn serialize_hex<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(data))
}

impl<T: I2cTransport> SfpMonitor<T> {
    /// 按过滤条件选出模块；过滤的序列号不存在时返回 `NotFound`
    fn select(&self, filter: Option<&str>) -> Result<Vec<&SfpModule>, DriverError> {
        match filter {
            Some(serial) => self
                .registry()
                .find(serial)
                .map(|module| vec![module])
                .ok_or_else(|| DriverError::NotFound(serial.to_string())),
            None => Ok(self.registry().iter().collect()),
        }
    }

    /// 列出模块标识信息
    pub fn list_modules(&self, filter: Option<&str>) -> Result<Vec<ModuleSummary>, DriverError> {
        Ok(self.select(filter)?.into_iter().map(ModuleSummary::from).collect())
    }

    /// 获取诊断数据
    ///
    /// 先刷新被选中的模块，刷新失败只记录日志，返回上一次成功的快照。
    pub fn get_diagnostics(
        &mut self,
        filter: Option<&str>,
    ) -> Result<Vec<ModuleDiagnostics>, DriverError> {
        match filter {
            Some(serial) => {
                if let Err(e) = self.refresh(serial) {
                    if e.is_user_error() {
                        return Err(e);
                    }
                    warn!("Serving stale diagnostics for {}: {}", serial, e);
                }
            },
            None => {
                self.refresh_all();
            },
        }

        Ok(self
            .select(filter)?
            .into_iter()
            .map(|module| ModuleDiagnostics::new(module.serial_number(), module.diagnostics()))
            .collect())
    }

    /// 获取滚动统计
    pub fn get_statistics(
        &self,
        filter: Option<&str>,
    ) -> Result<Vec<ModuleStatisticsReport>, DriverError> {
        Ok(self
            .select(filter)?
            .into_iter()
            .map(ModuleStatisticsReport::from)
            .collect())
    }

    /// 获取厂商自定义数据块
    ///
    /// # 错误
    /// - `DriverError::InvalidArgument`: 未提供序列号
    /// - `DriverError::NotFound`: 序列号未注册
    pub fn get_vendor_specific(
        &self,
        serial_number: Option<&str>,
    ) -> Result<VendorSpecific, DriverError> {
        let serial = serial_number
            .ok_or_else(|| DriverError::InvalidArgument("serial_number is required".to_string()))?;
        let module = self
            .registry()
            .find(serial)
            .ok_or_else(|| DriverError::NotFound(serial.to_string()))?;

        Ok(VendorSpecific {
            serial_number: module.serial_number().to_string(),
            data: module.vendor_specific().to_vec(),
        })
    }
}
