//! 模块记录
//!
//! 每个物理光模块一条记录，以序列号为标识。
//! 记录独占其所有可变长字段，随记录一起释放。

use crate::statistics::ModuleStatistics;
use sfp_protocol::{DiagnosticsPage, IdentificationPage};

/// 已发现的 SFP 模块
#[derive(Debug, Clone)]
pub struct SfpModule {
    bus: String,
    info: IdentificationPage,
    diagnostics: DiagnosticsPage,
    statistics: Option<ModuleStatistics>,
}

impl SfpModule {
    /// 由发现流程创建记录
    ///
    /// `statistics_window` 为 `Some` 时启用滚动统计，并把首个诊断快照作为第一个样本。
    pub fn new(
        bus: impl Into<String>,
        info: IdentificationPage,
        diagnostics: DiagnosticsPage,
        statistics_window: Option<usize>,
    ) -> Self {
        let statistics = statistics_window.map(|capacity| {
            let mut stats = ModuleStatistics::new(capacity);
            stats.push(&diagnostics.value);
            stats
        });
        Self {
            bus: bus.into(),
            info,
            diagnostics,
            statistics,
        }
    }

    /// 发现该模块的总线路径（创建后不再变化）
    pub fn bus(&self) -> &str {
        &self.bus
    }

    pub fn serial_number(&self) -> &str {
        &self.info.serial_number
    }

    pub fn info(&self) -> &IdentificationPage {
        &self.info
    }

    pub fn vendor_specific(&self) -> &[u8] {
        &self.info.vendor_specific
    }

    pub fn diagnostics(&self) -> &DiagnosticsPage {
        &self.diagnostics
    }

    pub fn statistics(&self) -> Option<&ModuleStatistics> {
        self.statistics.as_ref()
    }

    /// 用新解析的诊断页整体替换快照，并更新统计
    pub(crate) fn apply_diagnostics(&mut self, diagnostics: DiagnosticsPage) {
        self.diagnostics = diagnostics;
        if let Some(stats) = self.statistics.as_mut() {
            stats.push(&self.diagnostics.value);
        }
    }
}
