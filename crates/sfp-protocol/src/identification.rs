//! 标识页（A0h）结构体定义
//!
//! 包含模块静态信息（厂商、序列号、波长等）的解析，以及页面校验和验证。

use crate::constants::*;
use crate::{ProtocolError, bytes_to_u16_be, ensure_page_length, read_word};
use std::fmt;

// ============================================================================
// 枚举类型定义
// ============================================================================

/// 模块类型标识（SFF-8024 Identifier，Byte 0）
///
/// 记录中保存原始字节，此枚举只用于日志和展示。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identifier {
    Unknown,
    Gbic,
    Soldered,
    Sfp,
    Xfp,
    Qsfp,
    QsfpPlus,
    Qsfp28,
    Other(u8),
}

impl From<u8> for Identifier {
    fn from(value: u8) -> Self {
        match value {
            0x00 => Identifier::Unknown,
            0x01 => Identifier::Gbic,
            0x02 => Identifier::Soldered,
            0x03 => Identifier::Sfp,
            0x06 => Identifier::Xfp,
            0x0C => Identifier::Qsfp,
            0x0D => Identifier::QsfpPlus,
            0x11 => Identifier::Qsfp28,
            other => Identifier::Other(other),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Unknown => write!(f, "unknown"),
            Identifier::Gbic => write!(f, "GBIC"),
            Identifier::Soldered => write!(f, "soldered"),
            Identifier::Sfp => write!(f, "SFP/SFP+"),
            Identifier::Xfp => write!(f, "XFP"),
            Identifier::Qsfp => write!(f, "QSFP"),
            Identifier::QsfpPlus => write!(f, "QSFP+"),
            Identifier::Qsfp28 => write!(f, "QSFP28"),
            Identifier::Other(code) => write!(f, "vendor 0x{:02X}", code),
        }
    }
}

/// 连接器类型（SFF-8024 Connector，Byte 2）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connector {
    Unknown,
    Sc,
    FiberChannelCopper1,
    FiberChannelCopper2,
    Bnc,
    FiberChannelCoax,
    FiberJack,
    Lc,
    MtRj,
    Mu,
    Sg,
    OpticalPigtail,
    Mpo1x12,
    Mpo2x16,
    HssdcII,
    CopperPigtail,
    Rj45,
    NoSeparable,
    Other(u8),
}

impl From<u8> for Connector {
    fn from(value: u8) -> Self {
        match value {
            0x00 => Connector::Unknown,
            0x01 => Connector::Sc,
            0x02 => Connector::FiberChannelCopper1,
            0x03 => Connector::FiberChannelCopper2,
            0x04 => Connector::Bnc,
            0x05 => Connector::FiberChannelCoax,
            0x06 => Connector::FiberJack,
            0x07 => Connector::Lc,
            0x08 => Connector::MtRj,
            0x09 => Connector::Mu,
            0x0A => Connector::Sg,
            0x0B => Connector::OpticalPigtail,
            0x0C => Connector::Mpo1x12,
            0x0D => Connector::Mpo2x16,
            0x20 => Connector::HssdcII,
            0x21 => Connector::CopperPigtail,
            0x22 => Connector::Rj45,
            0x23 => Connector::NoSeparable,
            other => Connector::Other(other),
        }
    }
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Connector::Unknown => "unknown",
            Connector::Sc => "SC",
            Connector::FiberChannelCopper1 => "FC style 1 copper",
            Connector::FiberChannelCopper2 => "FC style 2 copper",
            Connector::Bnc => "BNC/TNC",
            Connector::FiberChannelCoax => "FC coax",
            Connector::FiberJack => "Fiber Jack",
            Connector::Lc => "LC",
            Connector::MtRj => "MT-RJ",
            Connector::Mu => "MU",
            Connector::Sg => "SG",
            Connector::OpticalPigtail => "optical pigtail",
            Connector::Mpo1x12 => "MPO 1x12",
            Connector::Mpo2x16 => "MPO 2x16",
            Connector::HssdcII => "HSSDC II",
            Connector::CopperPigtail => "copper pigtail",
            Connector::Rj45 => "RJ45",
            Connector::NoSeparable => "no separable connector",
            Connector::Other(code) => return write!(f, "vendor 0x{:02X}", code),
        };
        f.write_str(name)
    }
}

// ============================================================================
// 标识页
// ============================================================================

/// 标识页解析结果 (I2C 0x50)
///
/// 字段在发现时解析一次，之后不再变化。
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IdentificationPage {
    pub transceiver_type: u8, // Byte 0: Identifier
    pub connector: u8,        // Byte 2: Connector
    pub bitrate_mbd: u32,     // Byte 12: 标称码率，单位 100 MBd（已换算为 MBd）
    pub wavelength_nm: u16,   // Byte 60-61: 激光波长（nm，大端）
    pub manufacturer: String, // Byte 20-35
    pub revision: String,     // Byte 56-59
    pub serial_number: String, // Byte 68-83
    /// Byte 96-127: 厂商自定义数据（原样保留，不解释）
    pub vendor_specific: [u8; VENDOR_SPECIFIC_LENGTH],
}

impl IdentificationPage {
    /// 模块类型枚举（仅展示用）
    pub fn identifier(&self) -> Identifier {
        Identifier::from(self.transceiver_type)
    }

    /// 连接器类型枚举（仅展示用）
    pub fn connector_kind(&self) -> Connector {
        Connector::from(self.connector)
    }
}

impl TryFrom<&[u8]> for IdentificationPage {
    type Error = ProtocolError;

    fn try_from(page: &[u8]) -> Result<Self, Self::Error> {
        // 验证数据长度（短读视为解析失败）
        ensure_page_length(page)?;

        // 验证校验和：Byte 0-62 之和（mod 256）必须等于 Byte 63
        let computed = compute_checksum(&page[..CHECKSUM_OFFSET]);
        let stored = page[CHECKSUM_OFFSET];
        if computed != stored {
            return Err(ProtocolError::ChecksumMismatch {
                expected: computed,
                actual: stored,
            });
        }

        let mut vendor_specific = [0u8; VENDOR_SPECIFIC_LENGTH];
        vendor_specific.copy_from_slice(
            &page[VENDOR_SPECIFIC_OFFSET..VENDOR_SPECIFIC_OFFSET + VENDOR_SPECIFIC_LENGTH],
        );

        Ok(Self {
            transceiver_type: page[TYPE_OFFSET],
            connector: page[CONNECTOR_OFFSET],
            bitrate_mbd: page[BITRATE_OFFSET] as u32 * BITRATE_UNIT_MBD,
            wavelength_nm: bytes_to_u16_be(read_word(page, WAVELENGTH_OFFSET)),
            manufacturer: read_ascii(page, MANUFACTURER_OFFSET, MANUFACTURER_LENGTH),
            revision: read_ascii(page, REVISION_OFFSET, REVISION_LENGTH),
            serial_number: read_ascii(page, SERIAL_NO_OFFSET, SERIAL_NO_LENGTH),
            vendor_specific,
        })
    }
}

/// 计算 8 位累加校验和（mod 256）
pub fn compute_checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

/// 读取定长 ASCII 字段
///
/// 遇到 NUL 即截断，随后去除首尾空白（EEPROM 中的字段通常以空格填充）。
fn read_ascii(page: &[u8], offset: usize, length: usize) -> String {
    let raw = &page[offset..offset + length];
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).trim().to_string()
}
