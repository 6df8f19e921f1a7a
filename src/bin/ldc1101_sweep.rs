//! LHR sweep logger for an LDC1101 on a Linux spidev bus.
//!
//! Sends a baseline command to the actuator, brings up the sensor, then
//! samples the LHR result into a CSV log while stepping the actuator command
//! after every block of samples.
//!
//! Usage:
//!   ldc1101-sweep -l ./testing/run1.csv -n 500 -v 1000 -s 10

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
use linux_embedded_hal::SpidevDevice;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use ldc1101::acquisition::{Session, SweepConfig, Termination, MAX_SAMPLES_PER_STEP};
use ldc1101::command::UdpCommandChannel;
use ldc1101::config::{Config, MAX_REFERENCE_COUNT};
use ldc1101::datalog::DataLog;
use ldc1101::device::DeviceId;
use ldc1101::interface::Ldc1101Interface;
use ldc1101::sample::MonotonicClock;
use ldc1101::{Ldc1101, PollBound};

/// SPI clock for the LDC1101.
const SPI_SPEED_HZ: u32 = 1_000_000;
/// Time the actuator gets to reach the baseline before sampling starts.
const BASELINE_SETTLE: Duration = Duration::from_millis(100);

/// Sample an LDC1101 while sweeping the actuator command.
#[derive(Parser, Debug)]
#[command(name = "ldc1101-sweep", version, about)]
struct Cli {
    /// CSV file receiving the samples (created or truncated).
    #[arg(short, long, default_value = "./testing/ldc1101_log.csv")]
    log: PathBuf,

    /// Samples collected at each command value.
    #[arg(
        short = 'n',
        long,
        default_value_t = 500,
        value_parser = clap::value_parser!(u32).range(1..=MAX_SAMPLES_PER_STEP as i64)
    )]
    samples: u32,

    /// Command change applied after each step.
    #[arg(short = 'v', long, default_value_t = 1_000, allow_negative_numbers = true)]
    increment: i16,

    /// Number of sweep steps.
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    steps: u32,

    /// Baseline command sent before sampling.
    #[arg(long, default_value_t = 100, allow_negative_numbers = true)]
    start: i16,

    /// Largest command magnitude the sweep may reach.
    #[arg(long, default_value_t = 24_000)]
    max_command: u16,

    /// Actuator host.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Actuator UDP port.
    #[arg(long, default_value_t = 2345)]
    port: u16,

    /// spidev node the sensor is attached to.
    #[arg(long, default_value = "/dev/spidev0.0")]
    spi_device: PathBuf,

    /// Give up after this many not-ready status polls (waits forever if unset).
    #[arg(long)]
    poll_limit: Option<u32>,

    /// LHR reference count.
    #[arg(long, default_value_t = MAX_REFERENCE_COUNT)]
    rcount: u16,
}

impl Cli {
    fn sweep(&self) -> SweepConfig {
        SweepConfig {
            samples_per_step: self.samples,
            steps: self.steps,
            start_command: self.start,
            increment: self.increment,
            max_command: self.max_command,
            poll: self.poll_limit.map_or(PollBound::Unbounded, PollBound::Limit),
        }
    }
}

fn open_spi(path: &Path) -> Result<SpidevDevice> {
    let mut spi = SpidevDevice::open(path)
        .map_err(|err| anyhow::anyhow!("{err:?}"))
        .with_context(|| format!("failed to open SPI device {}", path.display()))?;
    let options = SpidevOptions::new()
        .bits_per_word(8)
        .max_speed_hz(SPI_SPEED_HZ)
        .mode(SpiModeFlags::SPI_MODE_3)
        .build();
    spi.configure(&options)
        .with_context(|| format!("failed to configure SPI device {}", path.display()))?;
    Ok(spi)
}

/// Logs the revision of an initialized sensor. A failed read is not fatal:
/// `init` has already verified the chip ID.
fn log_identity<IFACE>(sensor: &mut Ldc1101<IFACE>) -> Option<DeviceId>
where
    IFACE: Ldc1101Interface,
    IFACE::Error: fmt::Debug,
{
    match sensor.device_id() {
        Ok(id) => {
            info!(
                "LDC1101 initialized (revision {:#04x}, chip id {:#04x})",
                id.revision, id.chip_id
            );
            Some(id)
        }
        Err(err) => {
            info!("LDC1101 initialized");
            warn!("failed to read LDC1101 revision: {}", err);
            None
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    info!("starting LDC1101 data collection");
    let mut session = Session::new(cli.sweep(), MonotonicClock::new()).context("invalid sweep")?;

    let mut channel = UdpCommandChannel::open(&cli.host, cli.port)
        .with_context(|| format!("failed to open command channel to {}:{}", cli.host, cli.port))?;
    info!("command channel connected to {}", channel.peer());

    match session.send_baseline(&mut channel) {
        Ok(bytes) => info!("sent baseline command {} ({} bytes)", cli.start, bytes),
        Err(err) => warn!("failed to send baseline command {}: {}", cli.start, err),
    }
    thread::sleep(BASELINE_SETTLE);

    let spi = open_spi(&cli.spi_device)?;
    info!("SPI peripheral initialized");

    let config = Config::new().reference_count(cli.rcount).build();
    let mut sensor = Ldc1101::new_spi(spi, config);
    sensor.init().context("failed to initialize LDC1101")?;
    log_identity(&mut sensor);

    let mut log = DataLog::create(&cli.log)
        .with_context(|| format!("failed to open log file {}", cli.log.display()))?;
    info!("logging samples to {}", cli.log.display());

    let report = session.run(&mut sensor, &mut channel, &mut log)?;
    log.finish()
        .with_context(|| format!("failed to close log file {}", cli.log.display()))?;

    match report.termination {
        Termination::Completed => {}
        Termination::CommandLimit { rejected } => {
            warn!("sweep stopped early: command {} exceeds the limit", rejected)
        }
        Termination::ChannelFailed { command } => {
            warn!("sweep stopped early: command {} could not be sent", command)
        }
    }
    info!(
        "data collection complete: {} steps, {} samples logged, {} skipped, last command {}",
        report.steps_completed, report.samples_logged, report.samples_skipped, report.last_command
    );
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
