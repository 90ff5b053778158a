//! 集成测试公共工具：构造 EEPROM 页面、放置模块

#![allow(dead_code)]

use sfp_driver::{MonitorConfig, SfpMonitor};
use sfp_i2c::MockI2cTransport;
use sfp_protocol::{
    CHECKSUM_OFFSET, DIAG_VALUE_OFFSET, I2C_DIAG_ADDRESS, I2C_INFO_ADDRESS, MANUFACTURER_OFFSET,
    PAGE_SIZE, REVISION_OFFSET, SERIAL_NO_OFFSET, VENDOR_SPECIFIC_OFFSET, WAVELENGTH_OFFSET,
    compute_checksum,
};

/// 标识页（校验和已填好）
pub fn info_page(serial: &str, manufacturer: &str) -> Vec<u8> {
    let mut page = vec![0x20u8; PAGE_SIZE];
    page[0] = 0x03; // SFP
    page[2] = 0x07; // LC
    page[12] = 103; // 10.3 GBd
    page[MANUFACTURER_OFFSET..MANUFACTURER_OFFSET + manufacturer.len()]
        .copy_from_slice(manufacturer.as_bytes());
    page[REVISION_OFFSET..REVISION_OFFSET + 1].copy_from_slice(b"A");
    page[WAVELENGTH_OFFSET] = 0x03;
    page[WAVELENGTH_OFFSET + 1] = 0x52; // 850 nm
    page[SERIAL_NO_OFFSET..SERIAL_NO_OFFSET + serial.len()].copy_from_slice(serial.as_bytes());
    for (i, byte) in page[VENDOR_SPECIFIC_OFFSET..VENDOR_SPECIFIC_OFFSET + 32]
        .iter_mut()
        .enumerate()
    {
        *byte = i as u8;
    }
    page[CHECKSUM_OFFSET] = compute_checksum(&page[..CHECKSUM_OFFSET]);
    page
}

/// 诊断页，只填实时值区域
///
/// 温度以整数摄氏度给出，其余量给原始寄存器值。
pub fn diag_page(
    temperature_c: i8,
    vcc_raw: u16,
    bias_raw: u16,
    tx_raw: u16,
    rx_raw: u16,
) -> Vec<u8> {
    let mut page = vec![0u8; PAGE_SIZE];
    let raw = [
        ((temperature_c as i16) << 8) as u16,
        vcc_raw,
        bias_raw,
        tx_raw,
        rx_raw,
    ];
    for (i, value) in raw.iter().enumerate() {
        let offset = DIAG_VALUE_OFFSET + i * 2;
        page[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
    }
    page
}

/// 在总线上放置一个完整模块
pub fn plug(transport: &MockI2cTransport, bus: &str, serial: &str, temperature_c: i8) {
    transport.set_page(bus, I2C_INFO_ADDRESS, info_page(serial, "ACME OPTICS"));
    transport.set_page(
        bus,
        I2C_DIAG_ADDRESS,
        diag_page(temperature_c, 33_000, 3_000, 5_000, 2_500),
    );
}

/// 探测 `/dev/i2c-0` 到 `/dev/i2c-{bus_max}` 的监控器
pub fn monitor(transport: &MockI2cTransport, bus_max: u32) -> SfpMonitor<MockI2cTransport> {
    let config = MonitorConfig {
        bus_min: 0,
        bus_max,
        statistics_window: 4,
        ..Default::default()
    };
    SfpMonitor::new(transport.clone(), config).expect("valid config")
}
