//! # SFP I2C Transport Layer
//!
//! I2C 硬件抽象层，提供统一的 EEPROM 页面读取接口。
//!
//! ## 后端
//!
//! - `linux`: Linux i2c-dev 字符设备（`/dev/i2c-N`），仅 Linux 平台
//! - `mock`: 内存模拟总线（`mock` feature），用于测试
//!
//! ## 读取语义
//!
//! 一次页面读取 = 写入一个 0x00 字节（将 EEPROM 地址指针移到页首），
//! 然后逐字节读取。读取中途出错时提前停止并返回已读到的字节，
//! 由协议层把短读当作解析失败处理。

use sfp_protocol::PAGE_SIZE;
use thiserror::Error;
use tracing::trace;

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(target_os = "linux")]
pub use linux::{LinuxI2cDevice, LinuxI2cTransport};

#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockI2cDevice, MockI2cTransport};

/// Linux i2c-dev 设备路径前缀
pub const DEFAULT_BUS_PATH_PREFIX: &str = "/dev/i2c-";

/// 构造总线设备路径（如 `/dev/i2c-1`）
pub fn bus_device_path(prefix: &str, index: u32) -> String {
    format!("{}{}", prefix, index)
}

/// I2C 传输层统一错误类型
#[derive(Error, Debug)]
pub enum I2cError {
    /// 总线或从设备不可用（空槽位属于正常情况）
    #[error("Bus unavailable: {0}")]
    Unavailable(#[from] BusDeviceError),
    /// 传输过程中的 IO 错误
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
}

impl I2cError {
    /// 是否为“总线/从设备不存在”类错误
    pub fn is_unavailable(&self) -> bool {
        matches!(self, I2cError::Unavailable(_))
    }
}

/// 设备/后端错误的结构化分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusDeviceErrorKind {
    /// 设备节点不存在
    NotFound,
    /// 权限不足
    AccessDenied,
    /// 地址已被内核驱动占用
    Busy,
    /// 从设备无应答
    NoAcknowledge,
    /// 非法的从设备地址
    InvalidAddress,
    Backend,
}

/// 结构化设备错误
#[derive(Error, Debug, Clone)]
#[error("{kind:?}: {message}")]
pub struct BusDeviceError {
    pub kind: BusDeviceErrorKind,
    pub message: String,
}

impl BusDeviceError {
    pub fn new(kind: BusDeviceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// 重试也无法恢复的错误（配置、权限或地址被占用，而不是空槽位）
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind,
            BusDeviceErrorKind::AccessDenied
                | BusDeviceErrorKind::InvalidAddress
                | BusDeviceErrorKind::Busy
        )
    }
}

/// 已寻址到某个从设备的 I2C 句柄
///
/// 句柄在 drop 时关闭。
pub trait I2cDevice {
    /// 写入单个字节
    fn write_byte(&mut self, byte: u8) -> Result<(), I2cError>;

    /// 读取单个字节
    fn read_byte(&mut self) -> Result<u8, I2cError>;

    /// 读取一个页面（最多 [`PAGE_SIZE`] 字节）
    ///
    /// # 错误
    /// - `I2cError::Io`: 起始的寻址写入失败
    ///
    /// 读取阶段的错误不会返回 `Err`，而是截断结果。
    fn read_page(&mut self, length: usize) -> Result<Vec<u8>, I2cError> {
        let length = length.min(PAGE_SIZE);

        // 将 EEPROM 内部地址指针移到 0
        self.write_byte(0x00)?;

        let mut data = Vec::with_capacity(length);
        while data.len() < length {
            match self.read_byte() {
                Ok(byte) => data.push(byte),
                Err(e) => {
                    trace!("Page read stopped after {} bytes: {}", data.len(), e);
                    break;
                },
            }
        }
        Ok(data)
    }
}

/// I2C 总线打开器
///
/// 每次页面读取都重新打开设备，与“打开 -> 读取 -> 关闭”的使用方式对应。
pub trait I2cTransport {
    type Device: I2cDevice;

    /// 打开总线并寻址从设备
    ///
    /// 不存在的总线或无应答的地址必须立即返回 `I2cError::Unavailable`，不能阻塞。
    fn open(&self, bus: &str, address: u16) -> Result<Self::Device, I2cError>;
}
