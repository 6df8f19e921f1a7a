//! Configuration primitives for the LDC1101 driver.

use crate::params::{ConversionReport, RpMaxDrive, RpRange};
use crate::registers::RpSet;

/// Reference count giving the longest, highest resolution LHR conversion.
pub const MAX_REFERENCE_COUNT: u16 = 0xFFFF;

/// User-facing configuration for LHR measurement mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// LHR reference count; trades conversion time for resolution.
    pub reference_count: u16,
    /// Upper bound of the sensor RP window.
    pub rp_max: RpRange,
    /// Lower bound of the sensor RP window.
    pub rp_min: RpRange,
    /// RP_MAX current drive, selects between low- and high-Q sensors.
    pub rp_max_drive: RpMaxDrive,
    /// Disables the RP calculation for cleaner LHR results.
    pub optimize_lhr: bool,
    /// Conversion reporting requirement.
    pub conversion_report: ConversionReport,
}

impl Config {
    /// Begins building a [`Config`] using the builder pattern.
    pub fn new() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Checks whether this configuration is valid according to datasheet rules.
    pub fn validate(&self) -> core::result::Result<(), ConfigError> {
        if self.rp_max.ohms() < self.rp_min.ohms() {
            return Err(ConfigError::RpWindowInverted);
        }

        Ok(())
    }

    /// Packs the amplitude window into its `RP_SET` register value.
    pub fn rp_set(&self) -> RpSet {
        RpSet::new()
            .with_rp_max_drive(self.rp_max_drive)
            .with_rp_max(self.rp_max)
            .with_rp_min(self.rp_min)
    }
}

/// Builder for [`Config`] allowing piecemeal construction.
#[derive(Debug, Clone, Copy)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Creates a new builder seeded with [`Config::default()`].
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Overrides the LHR reference count.
    pub fn reference_count(mut self, reference_count: u16) -> Self {
        self.config.reference_count = reference_count;
        self
    }

    /// Sets the RP window bounds.
    pub fn rp_window(mut self, rp_max: RpRange, rp_min: RpRange) -> Self {
        self.config.rp_max = rp_max;
        self.config.rp_min = rp_min;
        self
    }

    /// Selects the RP_MAX current drive.
    pub fn rp_max_drive(mut self, drive: RpMaxDrive) -> Self {
        self.config.rp_max_drive = drive;
        self
    }

    /// Enables or disables the RP calculation side path.
    pub fn optimize_lhr(mut self, optimize: bool) -> Self {
        self.config.optimize_lhr = optimize;
        self
    }

    /// Sets the conversion reporting requirement.
    pub fn conversion_report(mut self, report: ConversionReport) -> Self {
        self.config.conversion_report = report;
        self
    }

    /// Finalizes the builder and returns the [`Config`].
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reference_count: MAX_REFERENCE_COUNT,
            rp_max: RpRange::Kohm96,
            rp_min: RpRange::Kohm0_75,
            rp_max_drive: RpMaxDrive::Driven,
            optimize_lhr: true,
            conversion_report: ConversionReport::Always,
        }
    }
}

/// Validation errors generated while verifying a [`Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// RP_MAX selects a lower resistance than RP_MIN.
    RpWindowInverted,
}
