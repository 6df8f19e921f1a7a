//! Plain-text sample log: a `Timestamp, Value` header followed by one
//! `<secs>.<nanos>, <value>` line per sample.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::str::FromStr;

use crate::sample::{MeasurementSample, Timestamp, NANOS_PER_SEC};

/// First line of every log.
pub const LOG_HEADER: &str = "Timestamp, Value";

/// Sequential writer for sample logs.
///
/// Lines go straight to the underlying writer so a failing write surfaces on
/// the sample that caused it.
#[derive(Debug)]
pub struct DataLog<W: Write> {
    writer: W,
    lines: u64,
}

impl DataLog<File> {
    /// Creates (or truncates) the log at `path` and writes the header.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o666);
        }
        let file = options.open(path)?;
        Self::new(file)
    }
}

impl<W: Write> DataLog<W> {
    /// Wraps `writer` and emits the header line.
    pub fn new(mut writer: W) -> io::Result<Self> {
        writer.write_all(LOG_HEADER.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(Self { writer, lines: 0 })
    }

    /// Appends one sample line.
    pub fn append(&mut self, sample: &MeasurementSample) -> io::Result<()> {
        let line = format!("{sample}\n");
        self.writer.write_all(line.as_bytes())?;
        self.lines += 1;
        Ok(())
    }

    /// Number of sample lines written so far.
    pub fn lines(&self) -> u64 {
        self.lines
    }

    /// Flushes and closes the log, returning the underlying writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// A sample line parsed back from a log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogLine {
    /// Elapsed time column.
    pub elapsed: Timestamp,
    /// Measurement column.
    pub value: u32,
}

/// Reasons a log line fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LogLineError {
    /// The line has no `", "` separator.
    #[error("missing column separator")]
    MissingSeparator,
    /// The timestamp is not `<secs>.<9 digit nanos>`.
    #[error("malformed timestamp")]
    Timestamp,
    /// The value is not an unsigned integer.
    #[error("malformed value")]
    Value,
}

impl FromStr for LogLine {
    type Err = LogLineError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let (timestamp, value) = line
            .trim_end()
            .split_once(", ")
            .ok_or(LogLineError::MissingSeparator)?;
        let (secs, nanos) = timestamp.split_once('.').ok_or(LogLineError::Timestamp)?;
        if nanos.len() != 9 {
            return Err(LogLineError::Timestamp);
        }
        let secs: i64 = secs.parse().map_err(|_| LogLineError::Timestamp)?;
        let nanos: u32 = nanos.parse().map_err(|_| LogLineError::Timestamp)?;
        if nanos >= NANOS_PER_SEC {
            return Err(LogLineError::Timestamp);
        }
        let value = value.parse().map_err(|_| LogLineError::Value)?;

        Ok(Self {
            elapsed: Timestamp { secs, nanos },
            value,
        })
    }
}
