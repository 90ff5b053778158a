//! 驱动层错误类型定义

use crate::config::ConfigError;
use sfp_i2c::I2cError;
use sfp_protocol::ProtocolError;
use thiserror::Error;

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// I2C 总线错误（总线不可用或传输失败）
    #[error("I2C bus error: {0}")]
    Bus(#[from] I2cError),

    /// 页面解析错误（短读、校验和不匹配）
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 注册表中已存在相同序列号
    #[error("Duplicate module serial number: {0}")]
    DuplicateKey(String),

    /// 查询的模块不存在
    #[error("Module not found: {0}")]
    NotFound(String),

    /// 查询参数缺失或非法
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// 配置错误
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl DriverError {
    /// 发现过程中的常规失败（空槽位、短读、校验失败、重复序列号）
    ///
    /// 调度器吸收这类错误，不向上传播。
    pub fn is_routine(&self) -> bool {
        matches!(
            self,
            DriverError::Bus(_) | DriverError::Protocol(_) | DriverError::DuplicateKey(_)
        )
    }

    /// 查询调用方的错误（返回给调用方，不作为系统错误记录）
    pub fn is_user_error(&self) -> bool {
        matches!(self, DriverError::NotFound(_) | DriverError::InvalidArgument(_))
    }
}

#[cfg(test)]
mod tests {
    use super::DriverError;
    use sfp_i2c::{BusDeviceError, BusDeviceErrorKind, I2cError};
    use sfp_protocol::ProtocolError;

    /// 测试 DriverError 的 Display 实现
    #[test]
    fn test_driver_error_display() {
        let bus_error = I2cError::from(BusDeviceError::new(
            BusDeviceErrorKind::NotFound,
            "/dev/i2c-7",
        ));
        let msg = DriverError::Bus(bus_error).to_string();
        assert!(msg.contains("I2C bus error") && msg.contains("/dev/i2c-7"), "{}", msg);

        let msg = DriverError::Protocol(ProtocolError::ChecksumMismatch {
            expected: 1,
            actual: 2,
        })
        .to_string();
        assert!(msg.contains("Checksum mismatch"), "{}", msg);

        assert_eq!(
            DriverError::NotFound("ABC".to_string()).to_string(),
            "Module not found: ABC"
        );
        assert_eq!(
            DriverError::InvalidArgument("module".to_string()).to_string(),
            "Invalid argument: module"
        );
    }

    /// 测试错误分类
    #[test]
    fn test_error_classification() {
        let routine = DriverError::Protocol(ProtocolError::InvalidLength {
            expected: 256,
            actual: 0,
        });
        assert!(routine.is_routine());
        assert!(!routine.is_user_error());

        assert!(DriverError::DuplicateKey("X".into()).is_routine());

        let user = DriverError::NotFound("X".into());
        assert!(user.is_user_error());
        assert!(!user.is_routine());
    }

    /// 测试 From<I2cError> 转换
    #[test]
    fn test_from_i2c_error() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "bus stuck");
        let driver_error: DriverError = I2cError::Io(io).into();
        match driver_error {
            DriverError::Bus(I2cError::Io(e)) => {
                assert_eq!(e.kind(), std::io::ErrorKind::TimedOut)
            },
            other => panic!("Expected Bus(Io) variant, got {:?}", other),
        }
    }
}
