//! Strongly typed parameter enumerations for the LDC1101 driver.
//!
//! These enums map directly to datasheet field encodings and are used across
//! [`Config`](crate::config::Config) and the register bitfields. Prefer these
//! types over raw integers to keep configuration values valid and explicit.
//!
//! # Examples
//!
//! ```rust
//! use ldc1101::params::{PowerState, RpRange, RpMaxDrive};
//!
//! let rp_max = RpRange::Kohm96;
//! let rp_min = RpRange::Kohm0_75;
//! let drive = RpMaxDrive::Driven;
//! let state = PowerState::Active;
//! let _ = (rp_max, rp_min, drive, state);
//! ```

use modular_bitfield::prelude::Specifier;

/// Resistance bounds selectable for `RP_SET.RP_MAX` and `RP_SET.RP_MIN`.
///
/// Lower codes select higher resistances; together the two fields bound the
/// oscillation amplitude the sensor is regulated to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 3]
pub enum RpRange {
    /// 96 kOhm.
    Kohm96 = 0b000,
    /// 48 kOhm.
    Kohm48 = 0b001,
    /// 24 kOhm.
    Kohm24 = 0b010,
    /// 12 kOhm.
    Kohm12 = 0b011,
    /// 6 kOhm.
    Kohm6 = 0b100,
    /// 3 kOhm.
    Kohm3 = 0b101,
    /// 1.5 kOhm.
    Kohm1_5 = 0b110,
    /// 0.75 kOhm.
    Kohm0_75 = 0b111,
}

impl RpRange {
    /// Returns the selected resistance in ohms.
    pub const fn ohms(self) -> u32 {
        match self {
            Self::Kohm96 => 96_000,
            Self::Kohm48 => 48_000,
            Self::Kohm24 => 24_000,
            Self::Kohm12 => 12_000,
            Self::Kohm6 => 6_000,
            Self::Kohm3 => 3_000,
            Self::Kohm1_5 => 1_500,
            Self::Kohm0_75 => 750,
        }
    }
}

/// `RP_SET.RPMAX_DIS`: sensor-Q selector for the RP_MAX current drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 1]
pub enum RpMaxDrive {
    /// RP_MAX current drive is active (reset default).
    Driven = 0,
    /// RP_MAX current drive is disabled, intended for high-Q sensors.
    Disabled = 1,
}

/// `START_CONFIG.FUNC_MODE` power state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 2]
pub enum PowerState {
    /// Active conversion mode.
    Active = 0b00,
    /// Sleep mode; configuration registers are writable (reset default).
    Sleep = 0b01,
    /// Shutdown mode; lowest power, register contents are lost.
    Shutdown = 0b10,
}

/// Sensor amplitude regulation requirement (`D_CONF.DOK_REPORT`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 1]
pub enum ConversionReport {
    /// Conversions are only reported once the amplitude is regulated.
    Regulated = 0,
    /// Conversions are reported as soon as they complete.
    Always = 1,
}
