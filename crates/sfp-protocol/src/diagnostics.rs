//! 诊断页（A2h）结构体定义
//!
//! 包含实时测量值和四组告警/警告门限的解析，以及原始值到物理量的换算。
//! 诊断页没有校验和，读取失败只能由 I2C 层报告。

use crate::constants::*;
use crate::{ProtocolError, bytes_to_i16_be, bytes_to_u16_be, ensure_page_length, read_word};

/// 有符号 16 位大端值换算为校准值
pub fn convert_signed(bytes: [u8; 2], divisor: u16) -> f64 {
    bytes_to_i16_be(bytes) as f64 / divisor as f64
}

/// 无符号 16 位大端值换算为校准值
pub fn convert_unsigned(bytes: [u8; 2], divisor: u16) -> f64 {
    bytes_to_u16_be(bytes) as f64 / divisor as f64
}

/// 一组测量量（一个通道）
///
/// - `temperature`: °C
/// - `vcc`: V
/// - `tx_bias`: mA
/// - `tx_power` / `rx_power`: mW
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Measurements {
    pub temperature: f64,
    pub vcc: f64,
    pub tx_bias: f64,
    pub tx_power: f64,
    pub rx_power: f64,
}

impl Measurements {
    /// 从页面解析一个通道
    ///
    /// 第 i 个测量量位于 `offset + i * stride`。
    /// 调用者需保证页面长度已经检查过。
    fn decode(page: &[u8], offset: usize, stride: usize) -> Self {
        Self {
            temperature: convert_signed(read_word(page, offset), TEMPERATURE_DIVISOR),
            vcc: convert_unsigned(read_word(page, offset + stride), VCC_DIVISOR),
            tx_bias: convert_unsigned(read_word(page, offset + 2 * stride), TX_BIAS_DIVISOR),
            tx_power: convert_unsigned(read_word(page, offset + 3 * stride), POWER_DIVISOR),
            rx_power: convert_unsigned(read_word(page, offset + 4 * stride), POWER_DIVISOR),
        }
    }
}

/// 诊断页解析结果 (I2C 0x51)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiagnosticsPage {
    /// 实时测量值（Byte 96-105）
    pub value: Measurements,
    /// 高告警门限
    pub error_upper: Measurements,
    /// 低告警门限
    pub error_lower: Measurements,
    /// 高警告门限
    pub warning_upper: Measurements,
    /// 低警告门限
    pub warning_lower: Measurements,
}

impl TryFrom<&[u8]> for DiagnosticsPage {
    type Error = ProtocolError;

    fn try_from(page: &[u8]) -> Result<Self, Self::Error> {
        ensure_page_length(page)?;

        Ok(Self {
            value: Measurements::decode(page, DIAG_VALUE_OFFSET, DIAG_VALUE_STRIDE),
            error_upper: Measurements::decode(
                page,
                DIAG_ERROR_UPPER_OFFSET,
                DIAG_THRESHOLD_STRIDE,
            ),
            error_lower: Measurements::decode(
                page,
                DIAG_ERROR_LOWER_OFFSET,
                DIAG_THRESHOLD_STRIDE,
            ),
            warning_upper: Measurements::decode(
                page,
                DIAG_WARNING_UPPER_OFFSET,
                DIAG_THRESHOLD_STRIDE,
            ),
            warning_lower: Measurements::decode(
                page,
                DIAG_WARNING_LOWER_OFFSET,
                DIAG_THRESHOLD_STRIDE,
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn put(page: &mut [u8], offset: usize, raw: u16) {
        page[offset..offset + 2].copy_from_slice(&raw.to_be_bytes());
    }

    #[test]
    fn test_convert_signed() {
        assert_eq!(convert_signed([0x19, 0x80], 256), 25.5);
        assert_eq!(convert_signed([0xFF, 0x00], 256), -1.0);
        assert_eq!(convert_signed([0x80, 0x00], 256), -128.0);
    }

    #[test]
    fn test_convert_unsigned() {
        assert_eq!(convert_unsigned([0x80, 0xE8], 10_000), 3.3);
        assert_eq!(convert_unsigned([0x0F, 0xA0], 500), 8.0);
        assert_eq!(convert_unsigned([0xFF, 0xFF], 10_000), 6.5535);
    }

    #[test]
    fn test_diagnostics_value_block() {
        let mut page = [0u8; PAGE_SIZE];
        put(&mut page, 96, 0x1980); // 25.5 °C
        put(&mut page, 98, 33_000); // 3.3 V
        put(&mut page, 100, 3_000); // 6 mA
        put(&mut page, 102, 5_000); // 0.5 mW
        put(&mut page, 104, 1_234); // 0.1234 mW

        let diag = DiagnosticsPage::try_from(&page[..]).unwrap();
        assert_eq!(diag.value.temperature, 25.5);
        assert!((diag.value.vcc - 3.3).abs() < 1e-9);
        assert!((diag.value.tx_bias - 6.0).abs() < 1e-9);
        assert!((diag.value.tx_power - 0.5).abs() < 1e-9);
        assert!((diag.value.rx_power - 0.1234).abs() < 1e-9);
    }

    #[test]
    fn test_diagnostics_threshold_layout() {
        let mut page = [0u8; PAGE_SIZE];
        // 温度门限位于 Byte 0/2/4/6，电压门限位于 Byte 8/10/12/14，以此类推
        put(&mut page, 0, 80 * 256);
        put(&mut page, 2, (-40i16 * 256) as u16);
        put(&mut page, 4, 75 * 256);
        put(&mut page, 6, (-5i16 * 256) as u16);
        put(&mut page, 8, 36_000);
        put(&mut page, 10, 30_000);
        put(&mut page, 16, 6_000);
        put(&mut page, 32 + 6, 100);

        let diag = DiagnosticsPage::try_from(&page[..]).unwrap();
        assert_eq!(diag.error_upper.temperature, 80.0);
        assert_eq!(diag.error_lower.temperature, -40.0);
        assert_eq!(diag.warning_upper.temperature, 75.0);
        assert_eq!(diag.warning_lower.temperature, -5.0);
        assert!((diag.error_upper.vcc - 3.6).abs() < 1e-9);
        assert!((diag.error_lower.vcc - 3.0).abs() < 1e-9);
        assert!((diag.error_upper.tx_bias - 12.0).abs() < 1e-9);
        assert!((diag.warning_lower.rx_power - 0.01).abs() < 1e-9);
    }

    #[test]
    fn test_diagnostics_short_read() {
        let page = [0u8; 128];
        assert!(matches!(
            DiagnosticsPage::try_from(&page[..]),
            Err(ProtocolError::InvalidLength { actual: 128, .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_signed_roundtrip(value in -127.0f64..127.0) {
            let raw = (value * 256.0).round() as i16;
            let decoded = convert_signed(raw.to_be_bytes(), TEMPERATURE_DIVISOR);
            prop_assert!((decoded - value).abs() <= 0.5 / 256.0 + 1e-12);
        }

        #[test]
        fn prop_unsigned_roundtrip(value in 0.0f64..6.5) {
            let raw = (value * 10_000.0).round() as u16;
            let decoded = convert_unsigned(raw.to_be_bytes(), POWER_DIVISOR);
            prop_assert!((decoded - value).abs() <= 0.5 / 10_000.0 + 1e-12);
        }

        #[test]
        fn prop_converters_are_pure(bytes in any::<[u8; 2]>(), divisor in 1u16..) {
            prop_assert_eq!(convert_signed(bytes, divisor), convert_signed(bytes, divisor));
            prop_assert_eq!(convert_unsigned(bytes, divisor), convert_unsigned(bytes, divisor));
        }
    }
}
