//! 模块注册表
//!
//! 以序列号为键的有序映射，独占所有模块记录。
//! 只支持插入、按键查找和遍历；记录不会被删除。

use crate::error::DriverError;
use crate::module::SfpModule;
use std::collections::BTreeMap;

/// 模块注册表
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    modules: BTreeMap<String, SfpModule>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入记录
    ///
    /// # 错误
    /// - `DriverError::DuplicateKey`: 序列号已存在，新记录被丢弃，旧记录保留
    pub fn insert(&mut self, module: SfpModule) -> Result<(), DriverError> {
        let serial = module.serial_number().to_string();
        if self.modules.contains_key(&serial) {
            return Err(DriverError::DuplicateKey(serial));
        }
        self.modules.insert(serial, module);
        Ok(())
    }

    pub fn find(&self, serial_number: &str) -> Option<&SfpModule> {
        self.modules.get(serial_number)
    }

    pub(crate) fn find_mut(&mut self, serial_number: &str) -> Option<&mut SfpModule> {
        self.modules.get_mut(serial_number)
    }

    /// 遍历所有记录（按序列号排序）
    pub fn iter(&self) -> impl Iterator<Item = &SfpModule> {
        self.modules.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut SfpModule> {
        self.modules.values_mut()
    }

    /// 是否已有模块登记在该总线上
    pub fn contains_bus(&self, bus: &str) -> bool {
        self.modules.values().any(|m| m.bus() == bus)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
