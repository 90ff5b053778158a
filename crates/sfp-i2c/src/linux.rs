//! Linux i2c-dev 适配器实现
//!
//! 通过 `/dev/i2c-N` 字符设备访问 I2C 总线，使用 `ioctl(I2C_SLAVE)` 选择从设备。
//!
//! ## 依赖
//!
//! - 内核模块 `i2c-dev` 已加载
//! - 对设备节点有读写权限（通常需要 `i2c` 组或 root）
//!
//! ## 限制
//!
//! - 若地址已被内核驱动（如 `optoe`、`at24`）绑定，`I2C_SLAVE` 会返回 `EBUSY`
//! - 总线 IO 没有额外超时，依赖内核适配器驱动的默认行为

use crate::{BusDeviceError, BusDeviceErrorKind, I2cDevice, I2cError, I2cTransport};
use nix::errno::Errno;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::unix::io::AsRawFd;
use tracing::trace;

mod ioctl {
    // <linux/i2c-dev.h>: #define I2C_SLAVE 0x0703
    nix::ioctl_write_int_bad!(set_slave_address, 0x0703);
}

/// 7 位地址上限
const MAX_7BIT_ADDRESS: u16 = 0x7F;

/// Linux i2c-dev 总线打开器
#[derive(Debug, Clone, Copy, Default)]
pub struct LinuxI2cTransport;

impl LinuxI2cTransport {
    pub fn new() -> Self {
        Self
    }
}

impl I2cTransport for LinuxI2cTransport {
    type Device = LinuxI2cDevice;

    fn open(&self, bus: &str, address: u16) -> Result<Self::Device, I2cError> {
        LinuxI2cDevice::open(bus, address)
    }
}

/// 已寻址的 i2c-dev 句柄
///
/// 文件描述符在 drop 时关闭。
#[derive(Debug)]
pub struct LinuxI2cDevice {
    file: File,
    bus: String,
    address: u16,
}

impl LinuxI2cDevice {
    /// 打开总线并寻址从设备
    ///
    /// # 错误
    /// - `I2cError::Unavailable`:
    ///   - 设备节点不存在（`NotFound`）
    ///   - 权限不足（`AccessDenied`）
    ///   - 地址非法或已被占用（`InvalidAddress` / `Busy`）
    pub fn open(bus: &str, address: u16) -> Result<Self, I2cError> {
        if address > MAX_7BIT_ADDRESS {
            return Err(BusDeviceError::new(
                BusDeviceErrorKind::InvalidAddress,
                format!("0x{:02X} is not a 7-bit I2C address", address),
            )
            .into());
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(bus)
            .map_err(|e| open_error(bus, e))?;

        // SAFETY: fd 在 `file` 的生命周期内有效，I2C_SLAVE 只接受一个整型参数
        let result = unsafe { ioctl::set_slave_address(file.as_raw_fd(), address as i32) };
        if let Err(errno) = result {
            let kind = match errno {
                Errno::EBUSY => BusDeviceErrorKind::Busy,
                Errno::EINVAL => BusDeviceErrorKind::InvalidAddress,
                _ => BusDeviceErrorKind::Backend,
            };
            return Err(BusDeviceError::new(
                kind,
                format!(
                    "Failed to address slave 0x{:02X} on '{}': {}",
                    address, bus, errno
                ),
            )
            .into());
        }

        trace!("Opened I2C bus '{}' at address 0x{:02X}", bus, address);

        Ok(Self {
            file,
            bus: bus.to_string(),
            address,
        })
    }

    pub fn bus(&self) -> &str {
        &self.bus
    }

    pub fn address(&self) -> u16 {
        self.address
    }
}

impl I2cDevice for LinuxI2cDevice {
    fn write_byte(&mut self, byte: u8) -> Result<(), I2cError> {
        self.file
            .write_all(&[byte])
            .map_err(|e| write_error(&self.bus, self.address, e))
    }

    fn read_byte(&mut self) -> Result<u8, I2cError> {
        let mut buf = [0u8; 1];
        match self.file.read(&mut buf)? {
            1 => Ok(buf[0]),
            _ => Err(io::Error::new(io::ErrorKind::UnexpectedEof, "I2C read returned no data").into()),
        }
    }
}

/// 写入错误分类
///
/// `I2C_SLAVE` 不会探测从设备，空槽位的无应答要到第一次传输才出现
/// （ENXIO / EREMOTEIO，部分适配器驱动报 EIO），归为从设备不可用。
fn write_error(bus: &str, address: u16, e: io::Error) -> I2cError {
    let nak = e
        .raw_os_error()
        .map(Errno::from_raw)
        .is_some_and(|errno| matches!(errno, Errno::ENXIO | Errno::EREMOTEIO | Errno::EIO));
    if !nak {
        return e.into();
    }
    BusDeviceError::new(
        BusDeviceErrorKind::NoAcknowledge,
        format!("No acknowledge from 0x{:02X} on '{}': {}", address, bus, e),
    )
    .into()
}

fn open_error(bus: &str, e: io::Error) -> I2cError {
    let kind = match e.kind() {
        io::ErrorKind::NotFound => BusDeviceErrorKind::NotFound,
        io::ErrorKind::PermissionDenied => BusDeviceErrorKind::AccessDenied,
        _ => BusDeviceErrorKind::Backend,
    };
    BusDeviceError::new(kind, format!("Failed to open I2C bus '{}': {}", bus, e)).into()
}
