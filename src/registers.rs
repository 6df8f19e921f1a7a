//! Register map definitions for the LDC1101 inductance-to-digital converter.
#![allow(unused_parens)]

use modular_bitfield::prelude::*;

use crate::params::{ConversionReport, PowerState, RpMaxDrive, RpRange};

/// Register address of `RP_SET`.
pub const REG_RP_SET: u8 = 0x01;
/// Register address of `TC1`.
pub const REG_TC1: u8 = 0x02;
/// Register address of `TC2`.
pub const REG_TC2: u8 = 0x03;
/// Register address of `DIG_CONFIG`.
pub const REG_DIG_CONFIG: u8 = 0x04;
/// Register address of `ALT_CONFIG`.
pub const REG_ALT_CONFIG: u8 = 0x05;
/// Register address of `RP_THRESH_H_LSB`.
pub const REG_RP_THRESH_H_LSB: u8 = 0x06;
/// Register address of `RP_THRESH_H_MSB`.
pub const REG_RP_THRESH_H_MSB: u8 = 0x07;
/// Register address of `RP_THRESH_L_LSB`.
pub const REG_RP_THRESH_L_LSB: u8 = 0x08;
/// Register address of `RP_THRESH_L_MSB`.
pub const REG_RP_THRESH_L_MSB: u8 = 0x09;
/// Register address of `INTB_MODE`.
pub const REG_INTB_MODE: u8 = 0x0A;
/// Register address of `START_CONFIG`.
pub const REG_START_CONFIG: u8 = 0x0B;
/// Register address of `D_CONF`.
pub const REG_D_CONF: u8 = 0x0C;
/// Register address of `L_THRESH_HI_LSB`.
pub const REG_L_THRESH_HI_LSB: u8 = 0x16;
/// Register address of `L_THRESH_HI_MSB`.
pub const REG_L_THRESH_HI_MSB: u8 = 0x17;
/// Register address of `L_THRESH_LO_LSB`.
pub const REG_L_THRESH_LO_LSB: u8 = 0x18;
/// Register address of `L_THRESH_LO_MSB`.
pub const REG_L_THRESH_LO_MSB: u8 = 0x19;
/// Register address of `STATUS`.
pub const REG_STATUS: u8 = 0x20;
/// Register address of `RP_DATA_LSB`.
pub const REG_RP_DATA_LSB: u8 = 0x21;
/// Register address of `RP_DATA_MSB`.
pub const REG_RP_DATA_MSB: u8 = 0x22;
/// Register address of `L_DATA_LSB`.
pub const REG_L_DATA_LSB: u8 = 0x23;
/// Register address of `L_DATA_MSB`.
pub const REG_L_DATA_MSB: u8 = 0x24;
/// Register address of `LHR_RCOUNT_LSB`.
pub const REG_LHR_RCOUNT_LSB: u8 = 0x30;
/// Register address of `LHR_RCOUNT_MSB`.
pub const REG_LHR_RCOUNT_MSB: u8 = 0x31;
/// Register address of `LHR_OFFSET_LSB`.
pub const REG_LHR_OFFSET_LSB: u8 = 0x32;
/// Register address of `LHR_OFFSET_MSB`.
pub const REG_LHR_OFFSET_MSB: u8 = 0x33;
/// Register address of `LHR_CONFIG`.
pub const REG_LHR_CONFIG: u8 = 0x34;
/// Register address of `LHR_DATA_LSB`.
pub const REG_LHR_DATA_LSB: u8 = 0x38;
/// Register address of `LHR_DATA_MID`.
pub const REG_LHR_DATA_MID: u8 = 0x39;
/// Register address of `LHR_DATA_MSB`.
pub const REG_LHR_DATA_MSB: u8 = 0x3A;
/// Register address of `LHR_STATUS`.
pub const REG_LHR_STATUS: u8 = 0x3B;
/// Register address of `RID`.
pub const REG_RID: u8 = 0x3E;
/// Register address of `CHIP_ID`.
pub const REG_CHIP_ID: u8 = 0x3F;

/// Value reported by `CHIP_ID` on a genuine LDC1101.
pub const EXPECTED_CHIP_ID: u8 = 0xD4;

/// Address bit that turns an access into a register read.
pub const READ_FLAG: u8 = 0x80;

/// Number of data registers spanning one LHR conversion result.
pub const LHR_DATA_BYTES: usize = 3;

/// Access permissions encoded for each register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterAccess {
    /// Read-only register.
    ReadOnly,
    /// Write-only register.
    WriteOnly,
    /// Read/write register.
    ReadWrite,
}

/// Minimal metadata exposed by every register value type.
pub trait Register {
    /// Raw storage backing the register payload.
    type Raw: Copy;
    /// Register address as documented in the datasheet.
    const ADDRESS: u8;
    /// Access permission classification.
    const ACCESS: RegisterAccess;
    /// Optional reset/default value defined by the datasheet.
    const RESET_VALUE: Option<Self::Raw>;
}

/// Bitfield representation of the `RP_SET` register (address `0x01`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RpSet {
    // Minimum sensor RP (bits 2:0).
    pub rp_min: RpRange,
    #[skip]
    __: B1,
    // Maximum sensor RP (bits 6:4).
    pub rp_max: RpRange,
    // RP_MAX current drive / sensor-Q selector (bit 7).
    pub rp_max_drive: RpMaxDrive,
}

impl RpSet {
    /// Reserved bit that must always be written as zero.
    pub const RESERVED_MASK: u8 = 0x08;
}

impl From<u8> for RpSet {
    fn from(value: u8) -> Self {
        Self::from_bytes([value])
    }
}

impl From<RpSet> for u8 {
    fn from(value: RpSet) -> Self {
        value.into_bytes()[0] & !RpSet::RESERVED_MASK
    }
}

/// Bitfield representation of the `ALT_CONFIG` register (address `0x05`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AltConfig {
    // Optimize for L-only conversion, disables the RP calculation (bit 0).
    pub loptimal: bool,
    // Allow entering shutdown through START_CONFIG (bit 1).
    pub shutdown_enable: bool,
    #[skip]
    __: B6,
}

impl From<u8> for AltConfig {
    fn from(value: u8) -> Self {
        Self::from_bytes([value])
    }
}

impl From<AltConfig> for u8 {
    fn from(value: AltConfig) -> Self {
        value.into_bytes()[0]
    }
}

/// Bitfield representation of the `START_CONFIG` register (address `0x0B`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartConfig {
    // Functional mode (bits 1:0).
    pub func_mode: PowerState,
    #[skip]
    __: B6,
}

impl From<u8> for StartConfig {
    fn from(value: u8) -> Self {
        Self::from_bytes([value])
    }
}

impl From<StartConfig> for u8 {
    fn from(value: StartConfig) -> Self {
        value.into_bytes()[0]
    }
}

/// Bitfield representation of the `D_CONF` register (address `0x0C`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DConf {
    // Conversion reporting requirement (bit 0).
    pub dok_report: ConversionReport,
    #[skip]
    __: B7,
}

impl From<u8> for DConf {
    fn from(value: u8) -> Self {
        Self::from_bytes([value])
    }
}

impl From<DConf> for u8 {
    fn from(value: DConf) -> Self {
        value.into_bytes()[0]
    }
}

/// Bitfield representation of the `STATUS` register (address `0x20`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    // Device still in power-on reset; only configure once clear (bit 0).
    pub por_read: bool,
    #[skip]
    __: B1,
    // L conversion below the low threshold (bit 2).
    pub l_hi_lon: bool,
    // L conversion above the high threshold (bit 3).
    pub l_hin: bool,
    // RP conversion below the low threshold (bit 4).
    pub rp_hi_lon: bool,
    // RP conversion above the high threshold (bit 5).
    pub rp_hin: bool,
    // RP+L conversion data not ready (bit 6).
    pub data_not_ready: bool,
    // Sensor oscillation absent (bit 7).
    pub no_sensor_osc: bool,
}

impl From<u8> for Status {
    fn from(value: u8) -> Self {
        Self::from_bytes([value])
    }
}

impl From<Status> for u8 {
    fn from(value: Status) -> Self {
        value.into_bytes()[0]
    }
}

/// Bitfield representation of the `LHR_STATUS` register (address `0x3B`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LhrStatus {
    // Conversion data not yet available (bit 0).
    pub data_not_ready: bool,
    // Sensor frequency too close to the reference frequency (bit 1).
    pub err_overflow: bool,
    // Output code negative, offset too large (bit 2).
    pub err_under_range: bool,
    // Sensor frequency exceeds the reference frequency (bit 3).
    pub err_over_range: bool,
    // Zero count, sensor frequency too low or sensor fault (bit 4).
    pub err_zero_count: bool,
    #[skip]
    __: B3,
}

impl LhrStatus {
    /// Returns `true` when any conversion error flag is raised.
    pub fn has_error(&self) -> bool {
        self.err_overflow() || self.err_under_range() || self.err_over_range() || self.err_zero_count()
    }
}

impl From<u8> for LhrStatus {
    fn from(value: u8) -> Self {
        Self::from_bytes([value])
    }
}

impl From<LhrStatus> for u8 {
    fn from(value: LhrStatus) -> Self {
        value.into_bytes()[0]
    }
}

impl Register for RpSet {
    type Raw = u8;
    const ADDRESS: u8 = REG_RP_SET;
    const ACCESS: RegisterAccess = RegisterAccess::ReadWrite;
    const RESET_VALUE: Option<Self::Raw> = Some(0x07);
}

impl Register for AltConfig {
    type Raw = u8;
    const ADDRESS: u8 = REG_ALT_CONFIG;
    const ACCESS: RegisterAccess = RegisterAccess::ReadWrite;
    const RESET_VALUE: Option<Self::Raw> = Some(0x00);
}

impl Register for StartConfig {
    type Raw = u8;
    const ADDRESS: u8 = REG_START_CONFIG;
    const ACCESS: RegisterAccess = RegisterAccess::ReadWrite;
    const RESET_VALUE: Option<Self::Raw> = Some(0x01);
}

impl Register for DConf {
    type Raw = u8;
    const ADDRESS: u8 = REG_D_CONF;
    const ACCESS: RegisterAccess = RegisterAccess::ReadWrite;
    const RESET_VALUE: Option<Self::Raw> = Some(0x00);
}

impl Register for Status {
    type Raw = u8;
    const ADDRESS: u8 = REG_STATUS;
    const ACCESS: RegisterAccess = RegisterAccess::ReadOnly;
    const RESET_VALUE: Option<Self::Raw> = None;
}

impl Register for LhrStatus {
    type Raw = u8;
    const ADDRESS: u8 = REG_LHR_STATUS;
    const ACCESS: RegisterAccess = RegisterAccess::ReadOnly;
    const RESET_VALUE: Option<Self::Raw> = None;
}

/// Splits the LHR reference count into its `(MSB, LSB)` register values.
pub fn split_reference_count(rcount: u16) -> (u8, u8) {
    let [msb, lsb] = rcount.to_be_bytes();
    (msb, lsb)
}

/// Assembles a 24-bit LHR conversion result from the `LHR_DATA_LSB..=MSB` bytes.
#[inline]
pub fn assemble_lhr_data(bytes: [u8; LHR_DATA_BYTES]) -> u32 {
    let [lsb, mid, msb] = bytes;
    (u32::from(msb) << 16) | (u32::from(mid) << 8) | u32::from(lsb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// The default amplitude window from reset packs to 0x07.
    #[test]
    fn rp_set_layout_matches_datasheet() {
        let rp = RpSet::new()
            .with_rp_max_drive(RpMaxDrive::Driven)
            .with_rp_max(RpRange::Kohm96)
            .with_rp_min(RpRange::Kohm0_75);
        assert_eq!(u8::from(rp), 0x07);

        let rp = RpSet::new()
            .with_rp_max_drive(RpMaxDrive::Disabled)
            .with_rp_max(RpRange::Kohm12)
            .with_rp_min(RpRange::Kohm1_5);
        assert_eq!(u8::from(rp), 0b1_011_0_110);
    }

    #[test]
    fn rp_set_clears_reserved_bit() {
        let raw = RpSet::from(0xFF);
        assert_eq!(u8::from(raw), 0xF7);
    }

    #[test]
    fn lhr_status_layout_matches_datasheet() {
        let status = LhrStatus::from(0b0001_0001);
        assert!(status.data_not_ready());
        assert!(status.err_zero_count());
        assert!(!status.err_over_range());
        assert!(status.has_error());

        let ready = LhrStatus::from(0x00);
        assert!(!ready.data_not_ready());
        assert!(!ready.has_error());
    }

    #[test]
    fn status_layout_matches_datasheet() {
        let status = Status::from(0b1100_0001);
        assert!(status.no_sensor_osc());
        assert!(status.data_not_ready());
        assert!(status.por_read());
        assert!(!status.rp_hin());
        assert!(!status.l_hi_lon());
    }

    #[test]
    fn single_bit_configs_encode_bit_zero() {
        assert_eq!(u8::from(AltConfig::new().with_loptimal(true)), 0x01);
        assert_eq!(
            u8::from(DConf::new().with_dok_report(ConversionReport::Always)),
            0x01
        );
        assert_eq!(
            u8::from(StartConfig::new().with_func_mode(PowerState::Active)),
            0x00
        );
        assert_eq!(
            u8::from(StartConfig::new().with_func_mode(PowerState::Sleep)),
            StartConfig::RESET_VALUE.unwrap()
        );
    }

    #[test]
    fn reference_count_splits_msb_first() {
        assert_eq!(split_reference_count(0xFFFF), (0xFF, 0xFF));
        assert_eq!(split_reference_count(0x1234), (0x12, 0x34));
    }

    proptest! {
        #[test]
        fn lhr_data_assembles_little_endian(b1: u8, b2: u8, b3: u8) {
            let value = assemble_lhr_data([b1, b2, b3]);
            prop_assert_eq!(value, (u32::from(b3) << 16) | (u32::from(b2) << 8) | u32::from(b1));
            prop_assert!(value < 1 << 24);
        }
    }
}
