//! 协议常量定义
//!
//! 页面布局参考 SFF-8472（A0h 标识页 / A2h 诊断页）。

/// 单个 EEPROM 页面大小（字节）
pub const PAGE_SIZE: usize = 256;

// ============================================================================
// I2C 从设备地址
// ============================================================================

/// 标识页（A0h）的 7 位 I2C 地址
pub const I2C_INFO_ADDRESS: u16 = 0x50;
/// 诊断页（A2h）的 7 位 I2C 地址
pub const I2C_DIAG_ADDRESS: u16 = 0x51;

// ============================================================================
// 标识页字段
// ============================================================================

pub const TYPE_OFFSET: usize = 0;
pub const CONNECTOR_OFFSET: usize = 2;
pub const BITRATE_OFFSET: usize = 12;

pub const MANUFACTURER_OFFSET: usize = 20;
pub const MANUFACTURER_LENGTH: usize = 16;

pub const REVISION_OFFSET: usize = 56;
pub const REVISION_LENGTH: usize = 4;

pub const WAVELENGTH_OFFSET: usize = 60;

/// 校验和字节位置，同时也是校验范围 `[0, CHECKSUM_OFFSET)` 的上界
pub const CHECKSUM_OFFSET: usize = 63;

pub const SERIAL_NO_OFFSET: usize = 68;
pub const SERIAL_NO_LENGTH: usize = 16;

pub const VENDOR_SPECIFIC_OFFSET: usize = 96;
pub const VENDOR_SPECIFIC_LENGTH: usize = 32;

/// 码率字段单位（100 MBd）
pub const BITRATE_UNIT_MBD: u32 = 100;

// ============================================================================
// 诊断页字段
// ============================================================================

/// 实时测量值块（温度、电压、偏置电流、发射功率、接收功率，各 2 字节）
pub const DIAG_VALUE_OFFSET: usize = 96;
pub const DIAG_VALUE_STRIDE: usize = 2;

/// 告警/警告门限：每个门限通道内相邻测量量之间间隔 8 字节
pub const DIAG_THRESHOLD_STRIDE: usize = 8;

pub const DIAG_ERROR_UPPER_OFFSET: usize = 0;
pub const DIAG_ERROR_LOWER_OFFSET: usize = 2;
pub const DIAG_WARNING_UPPER_OFFSET: usize = 4;
pub const DIAG_WARNING_LOWER_OFFSET: usize = 6;

// ============================================================================
// 校准除数
// ============================================================================

/// 温度：有符号，1/256 °C
pub const TEMPERATURE_DIVISOR: u16 = 256;
/// 供电电压：无符号，100 µV
pub const VCC_DIVISOR: u16 = 10_000;
/// 偏置电流：无符号，2 µA
pub const TX_BIAS_DIVISOR: u16 = 500;
/// 光功率：无符号，0.1 µW
pub const POWER_DIVISOR: u16 = 10_000;
