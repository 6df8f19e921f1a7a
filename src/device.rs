//! High-level LDC1101 device driver implementation.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::interface::spi::SpiInterface;
use crate::interface::Ldc1101Interface;
use crate::params::PowerState;
use crate::registers::{
    assemble_lhr_data,
    split_reference_count,
    AltConfig,
    DConf,
    LhrStatus,
    Register,
    RegisterAccess,
    StartConfig,
    Status,
    EXPECTED_CHIP_ID,
    LHR_DATA_BYTES,
    REG_CHIP_ID,
    REG_LHR_DATA_LSB,
    REG_LHR_RCOUNT_LSB,
    REG_LHR_RCOUNT_MSB,
    REG_RID,
};
use embedded_hal::spi::SpiDevice;

/// Upper limit on `LHR_STATUS` polls while waiting for a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollBound {
    /// Busy-wait until the sensor reports data; never times out.
    #[default]
    Unbounded,
    /// Give up with [`Error::Timeout`] after this many not-ready polls.
    Limit(u32),
}

/// Identification registers read back from the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceId {
    /// Silicon revision (`RID`).
    pub revision: u8,
    /// Device identifier (`CHIP_ID`).
    pub chip_id: u8,
}

/// Decoded view of the `STATUS` register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusSnapshot {
    /// STATUS[7] NO_SENSOR_OSC.
    pub no_sensor_osc: bool,
    /// STATUS[6] DRDYB, inverted so `true` means data is ready.
    pub data_ready: bool,
    /// STATUS[5] RP_HIN.
    pub rp_hin: bool,
    /// STATUS[4] RP_HI_LON.
    pub rp_hi_lon: bool,
    /// STATUS[3] L_HIN.
    pub l_hin: bool,
    /// STATUS[2] L_HI_LON.
    pub l_hi_lon: bool,
    /// STATUS[0] POR_READ.
    pub power_on_reset: bool,
}

impl From<Status> for StatusSnapshot {
    fn from(status: Status) -> Self {
        Self {
            no_sensor_osc: status.no_sensor_osc(),
            data_ready: !status.data_not_ready(),
            rp_hin: status.rp_hin(),
            rp_hi_lon: status.rp_hi_lon(),
            l_hin: status.l_hin(),
            l_hi_lon: status.l_hi_lon(),
            power_on_reset: status.por_read(),
        }
    }
}

/// High-level synchronous driver for the LDC1101.
pub struct Ldc1101<IFACE> {
    interface: IFACE,
    config: Config,
}

impl<IFACE> Ldc1101<IFACE> {
    /// Creates a new driver instance from the provided bus interface.
    pub fn new(interface: IFACE, config: Config) -> Self {
        Self { interface, config }
    }

    /// Consumes the driver and returns the owned interface.
    pub fn release(self) -> (IFACE, Config) {
        (self.interface, self.config)
    }
}

impl<SPI> Ldc1101<SpiInterface<SPI>>
where
    SPI: SpiDevice,
{
    /// Convenience constructor for SPI transports.
    pub fn new_spi(spi: SPI, config: Config) -> Self {
        Self::new(SpiInterface::new(spi), config)
    }

    /// Releases the driver, returning the SPI device and configuration.
    pub fn release_spi(self) -> (SPI, Config) {
        let (iface, config) = self.release();
        (iface.release(), config)
    }
}

impl<IFACE, CommE> Ldc1101<IFACE>
where
    IFACE: Ldc1101Interface<Error = CommE>,
{
    // ==================================================================
    // == Initialization ================================================
    // ==================================================================
    /// Brings the sensor from reset into continuous LHR conversion.
    ///
    /// The register writes are strictly ordered and the chip identity is
    /// confirmed before conversion starts; any failure leaves the device in
    /// sleep mode and is returned to the caller.
    pub fn init(&mut self) -> Result<(), CommE> {
        self.config.validate().map_err(|_| Error::InvalidConfig)?;
        let config = self.config;

        self.write(AltConfig::new().with_loptimal(config.optimize_lhr))?;
        self.write(DConf::new().with_dok_report(config.conversion_report))?;

        let (msb, lsb) = split_reference_count(config.reference_count);
        self.interface.write_register(REG_LHR_RCOUNT_MSB, msb)?;
        self.interface.write_register(REG_LHR_RCOUNT_LSB, lsb)?;

        self.write(config.rp_set())?;

        let chip_id = self.check_chip_id()?;
        info!("LDC1101 device id {:#x} verified", chip_id);

        self.set_power_state(PowerState::Active)
    }

    /// Writes `START_CONFIG`, switching between active conversion and the low-power states.
    pub fn set_power_state(&mut self, state: PowerState) -> Result<(), CommE> {
        self.write(StartConfig::new().with_func_mode(state))
    }

    // ==================================================================
    // == Identification & Status =======================================
    // ==================================================================
    /// Reads the revision and chip identification registers.
    pub fn device_id(&mut self) -> Result<DeviceId, CommE> {
        let mut ids = [0u8; 2];
        self.interface.read_many(REG_RID, &mut ids)?;

        Ok(DeviceId {
            revision: ids[0],
            chip_id: ids[1],
        })
    }

    /// Verifies `CHIP_ID` against the LDC1101 constant and returns it.
    pub fn check_chip_id(&mut self) -> Result<u8, CommE> {
        let chip_id = self.interface.read_register(REG_CHIP_ID)?;
        if chip_id != EXPECTED_CHIP_ID {
            error!(
                "unexpected device id {:#x}, expected {:#x}",
                chip_id, EXPECTED_CHIP_ID
            );
            return Err(Error::DeviceIdMismatch { found: chip_id });
        }

        Ok(chip_id)
    }

    /// Returns a snapshot of the `STATUS` register.
    pub fn read_status(&mut self) -> Result<StatusSnapshot, CommE> {
        let status: Status = self.read()?;
        Ok(StatusSnapshot::from(status))
    }

    /// Reads the raw `LHR_STATUS` flags.
    pub fn read_lhr_status(&mut self) -> Result<LhrStatus, CommE> {
        self.read()
    }

    // ==================================================================
    // == Data Acquisition ==============================================
    // ==================================================================
    /// Polls `LHR_STATUS` until a conversion result is available.
    ///
    /// Returns the status that reported data ready. A bus error ends the wait
    /// immediately; exceeding `bound` yields [`Error::Timeout`].
    pub fn wait_data_ready(&mut self, bound: PollBound) -> Result<LhrStatus, CommE> {
        let mut polls: u32 = 0;
        loop {
            let status = self.read_lhr_status()?;
            if !status.data_not_ready() {
                return Ok(status);
            }

            polls = polls.saturating_add(1);
            if let PollBound::Limit(limit) = bound {
                if polls >= limit {
                    return Err(Error::Timeout);
                }
            }
        }
    }

    /// Reads the 24-bit LHR conversion result.
    pub fn read_lhr_raw(&mut self) -> Result<u32, CommE> {
        let mut raw = [0u8; LHR_DATA_BYTES];
        self.interface.read_many(REG_LHR_DATA_LSB, &mut raw)?;
        Ok(assemble_lhr_data(raw))
    }

    /// Waits for the next conversion and reads it.
    pub fn read_lhr(&mut self, bound: PollBound) -> Result<u32, CommE> {
        let status = self.wait_data_ready(bound)?;
        if status.has_error() {
            debug!("LHR status reports conversion errors: {:#x}", u8::from(status));
        }
        self.read_lhr_raw()
    }

    // ==================================================================
    // == Internal Register Helpers =====================================
    // ==================================================================
    fn write<R>(&mut self, value: R) -> Result<(), CommE>
    where
        R: Register<Raw = u8> + Into<u8>,
    {
        debug_assert!(R::ACCESS != RegisterAccess::ReadOnly);
        self.interface
            .write_register(R::ADDRESS, value.into())
            .map_err(Error::from)
    }

    fn read<R>(&mut self) -> Result<R, CommE>
    where
        R: Register<Raw = u8> + From<u8>,
    {
        debug_assert!(R::ACCESS != RegisterAccess::WriteOnly);
        let raw = self.interface.read_register(R::ADDRESS)?;
        Ok(R::from(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{RpMaxDrive, RpRange};
    use crate::registers::{
        REG_ALT_CONFIG,
        REG_D_CONF,
        REG_RP_SET,
        REG_START_CONFIG,
    };
    use crate::sim::SimulatedLdc1101;
    use embedded_hal::spi::ErrorKind;
    use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};
    use std::vec::Vec;

    fn exchange(sent: &[u8], received: &[u8]) -> [SpiTransaction<u8>; 3] {
        [
            SpiTransaction::transaction_start(),
            SpiTransaction::transfer_in_place(sent.to_vec(), received.to_vec()),
            SpiTransaction::transaction_end(),
        ]
    }

    fn init_writes_until_chip_id(chip_id: u8) -> Vec<SpiTransaction<u8>> {
        let mut expectations = Vec::new();
        expectations.extend(exchange(&[0x05, 0x01], &[0x00, 0x00]));
        expectations.extend(exchange(&[0x0C, 0x01], &[0x00, 0x00]));
        expectations.extend(exchange(&[0x31, 0xFF], &[0x00, 0x00]));
        expectations.extend(exchange(&[0x30, 0xFF], &[0x00, 0x00]));
        expectations.extend(exchange(&[0x01, 0x07], &[0x00, 0x00]));
        expectations.extend(exchange(&[0xBF, 0x00], &[0x00, chip_id]));
        expectations
    }

    #[test]
    fn init_issues_datasheet_sequence() {
        let mut expectations = init_writes_until_chip_id(EXPECTED_CHIP_ID);
        expectations.extend(exchange(&[0x0B, 0x00], &[0x00, 0x00]));
        let mut spi = SpiMock::new(&expectations);
        let mut device = Ldc1101::new_spi(spi.clone(), Config::default());

        device.init().unwrap();
        spi.done();
    }

    #[test]
    fn init_stops_before_start_on_chip_id_mismatch() {
        let expectations = init_writes_until_chip_id(0x00);
        let mut spi = SpiMock::new(&expectations);
        let mut device = Ldc1101::new_spi(spi.clone(), Config::default());

        assert_eq!(device.init(), Err(Error::DeviceIdMismatch { found: 0x00 }));
        spi.done();
    }

    #[test]
    fn init_leaves_simulated_device_converting() {
        let config = Config::new()
            .reference_count(0x1234)
            .rp_window(RpRange::Kohm48, RpRange::Kohm6)
            .rp_max_drive(RpMaxDrive::Disabled)
            .build();
        let mut device = Ldc1101::new_spi(SimulatedLdc1101::new(), config);
        device.init().unwrap();

        let (sim, _) = device.release_spi();
        assert_eq!(
            sim.writes(),
            &[
                (REG_ALT_CONFIG, 0x01),
                (REG_D_CONF, 0x01),
                (REG_LHR_RCOUNT_MSB, 0x12),
                (REG_LHR_RCOUNT_LSB, 0x34),
                (REG_RP_SET, 0b1_001_0_100),
                (REG_START_CONFIG, 0x00),
            ]
        );
    }

    #[test]
    fn init_aborts_on_first_failed_write() {
        let sim = SimulatedLdc1101::new().fail_writes_to(REG_LHR_RCOUNT_LSB);
        let mut device = Ldc1101::new_spi(sim, Config::default());

        assert_eq!(device.init(), Err(Error::Interface(ErrorKind::Other)));
        let (sim, _) = device.release_spi();
        assert_eq!(sim.writes().len(), 3);
        assert!(sim.writes().iter().all(|&(reg, _)| reg != REG_START_CONFIG));
    }

    #[test]
    fn init_aborts_on_chip_id_read_error() {
        let sim = SimulatedLdc1101::new().fail_reads_of(REG_CHIP_ID);
        let mut device = Ldc1101::new_spi(sim, Config::default());

        assert_eq!(device.init(), Err(Error::Interface(ErrorKind::Other)));
        let (sim, _) = device.release_spi();
        assert_eq!(sim.writes().len(), 5);
        assert!(sim.writes().iter().all(|&(reg, _)| reg != REG_START_CONFIG));
    }

    #[test]
    fn init_rejects_invalid_config_without_bus_traffic() {
        let config = Config::new().rp_window(RpRange::Kohm0_75, RpRange::Kohm96).build();
        let expectations: [SpiTransaction<u8>; 0] = [];
        let mut spi = SpiMock::new(&expectations);
        let mut device = Ldc1101::new_spi(spi.clone(), config);

        assert_eq!(device.init(), Err(Error::InvalidConfig));
        spi.done();
    }

    #[test]
    fn chip_id_mismatch_is_reported_by_simulated_device() {
        let mut device = Ldc1101::new_spi(SimulatedLdc1101::new().with_chip_id(0xD5), Config::default());
        assert_eq!(device.init(), Err(Error::DeviceIdMismatch { found: 0xD5 }));

        let (sim, _) = device.release_spi();
        assert!(sim.writes().iter().all(|&(reg, _)| reg != REG_START_CONFIG));
    }

    #[test]
    fn device_id_reads_revision_and_chip_id_together() {
        let expectations = exchange(&[0xBE, 0x00, 0x00], &[0x00, 0x02, 0xD4]);
        let mut spi = SpiMock::new(&expectations);
        let mut device = Ldc1101::new_spi(spi.clone(), Config::default());

        assert_eq!(
            device.device_id().unwrap(),
            DeviceId {
                revision: 0x02,
                chip_id: 0xD4,
            }
        );
        spi.done();
    }

    #[test]
    fn read_status_decodes_flags() {
        let expectations = exchange(&[0xA0, 0x00], &[0x00, 0b1000_0001]);
        let mut spi = SpiMock::new(&expectations);
        let mut device = Ldc1101::new_spi(spi.clone(), Config::default());

        let status = device.read_status().unwrap();
        assert!(status.no_sensor_osc);
        assert!(status.data_ready);
        assert!(status.power_on_reset);
        assert!(!status.l_hin);
        spi.done();
    }

    #[test]
    fn wait_data_ready_polls_until_bit_clears() {
        let mut expectations = Vec::new();
        expectations.extend(exchange(&[0xBB, 0x00], &[0x00, 0x01]));
        expectations.extend(exchange(&[0xBB, 0x00], &[0x00, 0x01]));
        expectations.extend(exchange(&[0xBB, 0x00], &[0x00, 0x00]));
        let mut spi = SpiMock::new(&expectations);
        let mut device = Ldc1101::new_spi(spi.clone(), Config::default());

        let status = device.wait_data_ready(PollBound::Unbounded).unwrap();
        assert!(!status.data_not_ready());
        spi.done();
    }

    #[test]
    fn wait_data_ready_times_out_at_limit() {
        let sim = SimulatedLdc1101::new().with_samples(Vec::new(), 0);
        let mut device = Ldc1101::new_spi(sim, Config::default());

        assert_eq!(device.wait_data_ready(PollBound::Limit(25)), Err(Error::Timeout));
    }

    #[test]
    fn read_lhr_waits_then_assembles_little_endian() {
        let sim = SimulatedLdc1101::new().with_samples([0x00AB_CDEF], 4);
        let mut device = Ldc1101::new_spi(sim, Config::default());

        assert_eq!(device.read_lhr(PollBound::Limit(10)).unwrap(), 0x00AB_CDEF);
    }

    #[test]
    fn read_lhr_raw_reads_three_data_registers() {
        let expectations = exchange(&[0xB8, 0x00, 0x00, 0x00], &[0x00, 0x01, 0x02, 0x03]);
        let mut spi = SpiMock::new(&expectations);
        let mut device = Ldc1101::new_spi(spi.clone(), Config::default());

        assert_eq!(device.read_lhr_raw().unwrap(), 0x0003_0201);
        spi.done();
    }

    #[test]
    fn status_bus_error_ends_wait() {
        let sim = SimulatedLdc1101::new().with_samples([1], 0).fail_status_reads();
        let mut device = Ldc1101::new_spi(sim, Config::default());

        assert_eq!(
            device.wait_data_ready(PollBound::Unbounded),
            Err(Error::Interface(ErrorKind::Other))
        );
    }
}
