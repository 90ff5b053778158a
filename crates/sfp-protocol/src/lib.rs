//! # SFP Protocol
//!
//! SFP 光模块 EEPROM 页面协议定义（无硬件依赖）
//!
//! ## 模块
//!
//! - `constants`: I2C 从设备地址、字段偏移量等协议常量
//! - `identification`: 标识页（A0h）解析与校验和验证
//! - `diagnostics`: 诊断页（A2h）解析与校准值转换
//!
//! ## 字节序
//!
//! 页面中的多字节数值均为大端字节序（MSB 在前）。
//! 本模块提供了字节序转换工具函数。

pub mod constants;
pub mod diagnostics;
pub mod identification;

// 重新导出常用类型
pub use constants::*;
pub use diagnostics::{DiagnosticsPage, Measurements, convert_signed, convert_unsigned};
pub use identification::{Connector, IdentificationPage, Identifier, compute_checksum};

use thiserror::Error;

/// 协议解析错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Invalid page length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Checksum mismatch: computed 0x{expected:02X}, page carries 0x{actual:02X}")]
    ChecksumMismatch { expected: u8, actual: u8 },
}

/// 确认页面长度足够
///
/// 短读（I2C 读取中途失败）在这里统一转换为解析失败。
pub(crate) fn ensure_page_length(page: &[u8]) -> Result<(), ProtocolError> {
    if page.len() < PAGE_SIZE {
        return Err(ProtocolError::InvalidLength {
            expected: PAGE_SIZE,
            actual: page.len(),
        });
    }
    Ok(())
}

/// 大端字节序转 i16
pub fn bytes_to_i16_be(bytes: [u8; 2]) -> i16 {
    i16::from_be_bytes(bytes)
}

/// 大端字节序转 u16
pub fn bytes_to_u16_be(bytes: [u8; 2]) -> u16 {
    u16::from_be_bytes(bytes)
}

/// 从页面指定偏移读取 2 字节
///
/// 调用者需保证 `offset + 1 < page.len()`（页面长度已经过 [`ensure_page_length`] 检查）。
pub(crate) fn read_word(page: &[u8], offset: usize) -> [u8; 2] {
    [page[offset], page[offset + 1]]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_to_i16_be() {
        assert_eq!(bytes_to_i16_be([0x12, 0x34]), 0x1234);
        assert_eq!(bytes_to_i16_be([0xFF, 0xFF]), -1);
        assert_eq!(bytes_to_i16_be([0x80, 0x00]), i16::MIN);
    }

    #[test]
    fn test_bytes_to_u16_be() {
        assert_eq!(bytes_to_u16_be([0x03, 0x8A]), 906);
        assert_eq!(bytes_to_u16_be([0xFF, 0xFF]), u16::MAX);
    }

    #[test]
    fn test_ensure_page_length() {
        assert!(ensure_page_length(&[0u8; PAGE_SIZE]).is_ok());

        let err = ensure_page_length(&[0u8; 17]).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::InvalidLength {
                expected: PAGE_SIZE,
                actual: 17
            }
        );
    }

    #[test]
    fn test_protocol_error_display() {
        let err = ProtocolError::ChecksumMismatch {
            expected: 0x1F,
            actual: 0x20,
        };
        assert_eq!(
            err.to_string(),
            "Checksum mismatch: computed 0x1F, page carries 0x20"
        );
    }
}
