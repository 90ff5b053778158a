//! Mock I2C 总线
//!
//! 内存中的 `(总线, 地址) -> 页面` 映射，用于无硬件测试。
//! 与 i2c-dev 一致：总线存在时打开任何地址都成功，
//! 空地址的无应答在第一次写入时才报告。
//! `MockI2cTransport` 可克隆，克隆体共享同一份状态，
//! 测试可以在监控器持有 transport 之后继续插拔模块或注入故障。

use crate::{BusDeviceError, BusDeviceErrorKind, I2cDevice, I2cError, I2cTransport};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::Arc;

type SlaveKey = (String, u16);

#[derive(Debug, Default)]
struct MockState {
    buses: HashSet<String>,
    pages: HashMap<SlaveKey, Vec<u8>>,
    seek_failures: HashSet<SlaveKey>,
    truncated_reads: HashMap<SlaveKey, usize>,
    open_count: usize,
}

/// Mock 总线打开器
#[derive(Debug, Clone, Default)]
pub struct MockI2cTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockI2cTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加一条没有任何从设备的总线（空槽位）
    pub fn add_bus(&self, bus: &str) {
        self.state.lock().buses.insert(bus.to_string());
    }

    /// 在指定总线/地址上放置一个页面（模拟插入模块）
    ///
    /// 总线不存在时自动添加。
    pub fn set_page(&self, bus: &str, address: u16, page: impl Into<Vec<u8>>) {
        let mut state = self.state.lock();
        state.buses.insert(bus.to_string());
        state.pages.insert((bus.to_string(), address), page.into());
    }

    /// 移除页面（模拟拔出模块，总线保留）
    pub fn remove_page(&self, bus: &str, address: u16) {
        self.state.lock().pages.remove(&(bus.to_string(), address));
    }

    /// 让寻址写入以 IO 错误失败（不同于空地址的无应答）
    pub fn fail_seek(&self, bus: &str, address: u16) {
        self.state
            .lock()
            .seek_failures
            .insert((bus.to_string(), address));
    }

    /// 读取 `after` 字节后出错（短读）
    pub fn truncate_reads(&self, bus: &str, address: u16, after: usize) {
        self.state
            .lock()
            .truncated_reads
            .insert((bus.to_string(), address), after);
    }

    /// 清除指定从设备上的所有故障注入
    pub fn clear_faults(&self, bus: &str, address: u16) {
        let key = (bus.to_string(), address);
        let mut state = self.state.lock();
        state.seek_failures.remove(&key);
        state.truncated_reads.remove(&key);
    }

    /// 成功打开的次数
    pub fn open_count(&self) -> usize {
        self.state.lock().open_count
    }
}

impl I2cTransport for MockI2cTransport {
    type Device = MockI2cDevice;

    fn open(&self, bus: &str, address: u16) -> Result<Self::Device, I2cError> {
        let mut state = self.state.lock();
        if !state.buses.contains(bus) {
            return Err(BusDeviceError::new(
                BusDeviceErrorKind::NotFound,
                format!("Failed to open I2C bus '{}'", bus),
            )
            .into());
        }

        let key = (bus.to_string(), address);
        state.open_count += 1;
        Ok(MockI2cDevice {
            bus: bus.to_string(),
            address,
            page: state.pages.get(&key).cloned(),
            cursor: 0,
            fail_seek: state.seek_failures.contains(&key),
            read_limit: state.truncated_reads.get(&key).copied(),
            bytes_read: 0,
        })
    }
}

/// Mock 从设备句柄（打开时拷贝页面快照）
///
/// `page` 为 `None` 表示该地址没有从设备。
#[derive(Debug)]
pub struct MockI2cDevice {
    bus: String,
    address: u16,
    page: Option<Vec<u8>>,
    cursor: usize,
    fail_seek: bool,
    read_limit: Option<usize>,
    bytes_read: usize,
}

impl MockI2cDevice {
    fn no_acknowledge(&self) -> I2cError {
        BusDeviceError::new(
            BusDeviceErrorKind::NoAcknowledge,
            format!("No acknowledge from 0x{:02X} on '{}'", self.address, self.bus),
        )
        .into()
    }
}

impl I2cDevice for MockI2cDevice {
    fn write_byte(&mut self, byte: u8) -> Result<(), I2cError> {
        if self.page.is_none() {
            return Err(self.no_acknowledge());
        }
        if self.fail_seek {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "mock: bus error on write").into());
        }
        self.cursor = byte as usize;
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8, I2cError> {
        let Some(page) = &self.page else {
            return Err(self.no_acknowledge());
        };
        if self.read_limit.is_some_and(|limit| self.bytes_read >= limit) {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "mock: bus error").into());
        }
        let byte = *page
            .get(self.cursor)
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "mock: end of page"))?;
        self.cursor += 1;
        self.bytes_read += 1;
        Ok(byte)
    }
}
