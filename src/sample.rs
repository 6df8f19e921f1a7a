//! Timestamped LHR measurement samples.

use core::fmt;

/// Nanoseconds in one second.
pub const NANOS_PER_SEC: u32 = 1_000_000_000;

/// A point or span on the monotonic clock, split like a `timespec`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timestamp {
    /// Whole seconds.
    pub secs: i64,
    /// Sub-second remainder, always below [`NANOS_PER_SEC`].
    pub nanos: u32,
}

impl Timestamp {
    /// Creates a timestamp, carrying whole seconds out of `nanos`.
    pub const fn new(secs: i64, nanos: u32) -> Self {
        Self {
            secs: secs + (nanos / NANOS_PER_SEC) as i64,
            nanos: nanos % NANOS_PER_SEC,
        }
    }

    /// Returns `self - earlier`, borrowing one second when the nanosecond field underflows.
    pub const fn elapsed_since(self, earlier: Timestamp) -> Timestamp {
        if self.nanos < earlier.nanos {
            Timestamp {
                secs: self.secs - earlier.secs - 1,
                nanos: NANOS_PER_SEC + self.nanos - earlier.nanos,
            }
        } else {
            Timestamp {
                secs: self.secs - earlier.secs,
                nanos: self.nanos - earlier.nanos,
            }
        }
    }

    /// Returns the timestamp as fractional seconds.
    pub fn as_secs_f64(self) -> f64 {
        self.secs as f64 + f64::from(self.nanos) / f64::from(NANOS_PER_SEC)
    }
}

impl From<core::time::Duration> for Timestamp {
    fn from(duration: core::time::Duration) -> Self {
        Self {
            secs: duration.as_secs() as i64,
            nanos: duration.subsec_nanos(),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.secs, self.nanos)
    }
}

/// Source of monotonic timestamps for the acquisition loop.
pub trait Clock {
    /// Returns the current time.
    fn now(&mut self) -> Timestamp;
}

/// [`Clock`] backed by [`std::time::Instant`], counting from its creation.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl MonotonicClock {
    /// Starts a clock at the current instant.
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for MonotonicClock {
    fn now(&mut self) -> Timestamp {
        Timestamp::from(self.origin.elapsed())
    }
}

/// One LHR conversion result and when it was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MeasurementSample {
    /// Time since the acquisition session started.
    pub elapsed: Timestamp,
    /// 24-bit LHR conversion result.
    pub value: u32,
}

impl fmt::Display for MeasurementSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.elapsed, self.value)
    }
}
