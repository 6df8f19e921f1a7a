//! Step/sample sweep: LHR sampling into the data log while the actuator
//! command advances at every step boundary.
//!
//! Failure policy during a sweep:
//!
//! - a bus error while polling or reading a sample skips that sample;
//! - a log write error or a poll timeout aborts the session;
//! - exceeding the command limit or failing to send a command ends the
//!   sweep early but still counts as a normal completion.

use core::fmt;
use std::io::{self, Write};

use thiserror::Error;

use crate::command::{CommandChannel, CommandPayload, CommandValue};
use crate::datalog::DataLog;
use crate::device::{Ldc1101, PollBound};
use crate::error::Error as DriverError;
use crate::interface::Ldc1101Interface;
use crate::sample::{Clock, MeasurementSample, Timestamp};

/// Largest accepted number of samples per step.
pub const MAX_SAMPLES_PER_STEP: u32 = 1_000;

/// Parameters of one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepConfig {
    /// Samples collected at each command value.
    pub samples_per_step: u32,
    /// Number of steps in the sweep.
    pub steps: u32,
    /// Command the actuator holds before the first step.
    pub start_command: i16,
    /// Change applied to the command at each step boundary.
    pub increment: i16,
    /// Largest command magnitude the sweep may issue.
    pub max_command: u16,
    /// Bound on data-ready polls per sample.
    pub poll: PollBound,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            samples_per_step: 500,
            steps: 1,
            start_command: 100,
            increment: 1_000,
            max_command: 24_000,
            poll: PollBound::Unbounded,
        }
    }
}

impl SweepConfig {
    /// Checks the sweep parameters.
    pub fn validate(&self) -> Result<(), SweepConfigError> {
        if !(1..=MAX_SAMPLES_PER_STEP).contains(&self.samples_per_step) {
            return Err(SweepConfigError::SamplesOutOfRange(self.samples_per_step));
        }
        if self.steps == 0 {
            return Err(SweepConfigError::NoSteps);
        }
        if self.start_command.unsigned_abs() > self.max_command {
            return Err(SweepConfigError::StartExceedsLimit {
                start: self.start_command,
                max: self.max_command,
            });
        }
        Ok(())
    }
}

/// Rejected sweep parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SweepConfigError {
    /// Samples per step outside `1..=1000`.
    #[error("samples per step must be between 1 and 1000, got {0}")]
    SamplesOutOfRange(u32),
    /// Zero steps requested.
    #[error("number of steps must be greater than 0")]
    NoSteps,
    /// Baseline command already past the limit.
    #[error("start command {start} exceeds the command limit {max}")]
    StartExceedsLimit {
        /// Requested baseline.
        start: i16,
        /// Configured limit.
        max: u16,
    },
}

/// Fatal session failures.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    /// Writing a sample line failed; the log can no longer be trusted.
    #[error("failed to write sample to data log")]
    Log(#[source] io::Error),
    /// The sensor never reported data ready within the poll bound.
    #[error("no conversion data after {polls} status polls (step {step}, sample {sample})")]
    NotReady {
        /// Configured poll limit.
        polls: u32,
        /// Step being sampled.
        step: u32,
        /// Sample index within the step.
        sample: u32,
    },
}

/// Why a sweep stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Termination {
    /// Every configured step was sampled.
    #[default]
    Completed,
    /// The next command would have exceeded the command limit.
    CommandLimit {
        /// Rejected command.
        rejected: i32,
    },
    /// The actuator channel refused a command.
    ChannelFailed {
        /// Command that could not be sent.
        command: i16,
    },
}

/// Outcome of a sweep that did not fail fatally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SweepReport {
    /// Steps whose samples were all attempted.
    pub steps_completed: u32,
    /// Samples written to the log.
    pub samples_logged: u64,
    /// Samples dropped after a bus error.
    pub samples_skipped: u64,
    /// Commands delivered at step boundaries.
    pub commands_sent: u32,
    /// Last command delivered to the actuator.
    pub last_command: i16,
    /// Why the sweep stopped.
    pub termination: Termination,
}

/// State owned by one acquisition run.
pub struct Session<C> {
    config: SweepConfig,
    clock: C,
    start: Timestamp,
    step: u32,
    sample: u32,
    command: CommandValue,
}

impl<C: Clock> Session<C> {
    /// Starts a session; sample timestamps are measured from this call.
    pub fn new(config: SweepConfig, mut clock: C) -> Result<Self, SweepConfigError> {
        config.validate()?;
        let start = clock.now();
        Ok(Self {
            config,
            clock,
            start,
            step: 0,
            sample: 0,
            command: CommandValue(config.start_command),
        })
    }

    /// Command the actuator currently holds.
    pub fn command(&self) -> CommandValue {
        self.command
    }

    /// Current `(step, sample)` position.
    pub fn position(&self) -> (u32, u32) {
        (self.step, self.sample)
    }

    /// Sends the baseline command before sampling starts.
    pub fn send_baseline<CH: CommandChannel>(
        &self,
        channel: &mut CH,
    ) -> Result<usize, CH::Error> {
        channel.send(&CommandPayload::repeat(self.command))
    }

    /// Runs the sweep to completion or to its first fatal error.
    pub fn run<IFACE, CH, W>(
        &mut self,
        sensor: &mut Ldc1101<IFACE>,
        channel: &mut CH,
        log: &mut DataLog<W>,
    ) -> Result<SweepReport, AcquisitionError>
    where
        IFACE: Ldc1101Interface,
        IFACE::Error: fmt::Debug,
        CH: CommandChannel,
        CH::Error: fmt::Display,
        W: Write,
    {
        let mut report = SweepReport {
            last_command: self.command.get(),
            ..SweepReport::default()
        };

        for step in 0..self.config.steps {
            self.step = step;
            info!(
                "step {} of {} at command {}",
                step + 1,
                self.config.steps,
                self.command.get()
            );

            for sample in 0..self.config.samples_per_step {
                self.sample = sample;
                match self.acquire(sensor)? {
                    Some(measurement) => {
                        log.append(&measurement).map_err(|err| {
                            error!("failed to write data to log file: {}", err);
                            AcquisitionError::Log(err)
                        })?;
                        report.samples_logged += 1;
                    }
                    None => report.samples_skipped += 1,
                }
            }
            report.steps_completed += 1;

            let next = match self.command.step(self.config.increment, self.config.max_command) {
                Ok(next) => next,
                Err(rejected) => {
                    error!(
                        "command {} exceeds the limit of {}, stopping data collection",
                        rejected, self.config.max_command
                    );
                    report.termination = Termination::CommandLimit { rejected };
                    break;
                }
            };

            match channel.send(&CommandPayload::repeat(next)) {
                Ok(bytes) => {
                    debug!("sent {} bytes", bytes);
                    self.command = next;
                    report.commands_sent += 1;
                    report.last_command = next.get();
                }
                Err(err) => {
                    error!("failed to send command value {}: {}", next.get(), err);
                    report.termination = Termination::ChannelFailed { command: next.get() };
                    break;
                }
            }
        }

        Ok(report)
    }

    /// Waits for one conversion and timestamps it.
    ///
    /// `Ok(None)` is a skipped sample.
    fn acquire<IFACE>(
        &mut self,
        sensor: &mut Ldc1101<IFACE>,
    ) -> Result<Option<MeasurementSample>, AcquisitionError>
    where
        IFACE: Ldc1101Interface,
        IFACE::Error: fmt::Debug,
    {
        match sensor.read_lhr(self.config.poll) {
            Ok(value) => {
                let elapsed = self.clock.now().elapsed_since(self.start);
                Ok(Some(MeasurementSample { elapsed, value }))
            }
            Err(DriverError::Timeout) => Err(AcquisitionError::NotReady {
                polls: match self.config.poll {
                    PollBound::Limit(limit) => limit,
                    PollBound::Unbounded => u32::MAX,
                },
                step: self.step,
                sample: self.sample,
            }),
            Err(err) => {
                warn!(
                    "failed to read value at step {} sample {}: {}",
                    self.step, self.sample, err
                );
                Ok(None)
            }
        }
    }
}
