//! Error handling primitives for the LDC1101 driver.

use core::fmt;

/// Crate-wide result type alias.
pub type Result<T, E> = core::result::Result<T, Error<E>>;

/// Error variants produced by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Any error reported by the underlying bus interface.
    Interface(E),
    /// The provided configuration parameters are invalid.
    InvalidConfig,
    /// `CHIP_ID` did not report an LDC1101.
    DeviceIdMismatch {
        /// Value read back from `CHIP_ID`.
        found: u8,
    },
    /// The sensor did not report data ready within the configured poll bound.
    Timeout,
}

impl<E> From<E> for Error<E> {
    fn from(err: E) -> Self {
        Self::Interface(err)
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interface(err) => write!(f, "bus transfer failed: {err:?}"),
            Self::InvalidConfig => f.write_str("invalid sensor configuration"),
            Self::DeviceIdMismatch { found } => write!(
                f,
                "unexpected device id {found:#04x}, expected {:#04x}",
                crate::registers::EXPECTED_CHIP_ID
            ),
            Self::Timeout => f.write_str("timed out waiting for conversion data"),
        }
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug> std::error::Error for Error<E> {}
