//! SPI interface implementation built on top of `embedded-hal` `SpiDevice`.
//!
//! Every access is a single full-duplex exchange: the address byte goes out
//! first (with [`READ_FLAG`] set for reads) and the device clocks register
//! data back on the same transfer. The first received byte lines up with the
//! address and carries no data.

use embedded_hal::spi::SpiDevice;

use super::Ldc1101Interface;
use crate::registers::READ_FLAG;

/// Largest number of data bytes moved in one chip-select window.
pub const MAX_BURST: usize = 8;

/// SPI-based interface implementation for the LDC1101 driver.
pub struct SpiInterface<SPI> {
    spi: SPI,
}

impl<SPI> SpiInterface<SPI> {
    /// Creates a new interface from the provided SPI device abstraction.
    pub const fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Builds the address byte used to start an access.
    fn command_byte(register: u8, is_read: bool) -> u8 {
        let command = register & !READ_FLAG;
        if is_read { command | READ_FLAG } else { command }
    }

    /// Consumes the interface and returns the owned SPI device.
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI> Ldc1101Interface for SpiInterface<SPI>
where
    SPI: SpiDevice,
{
    type Error = SPI::Error;

    fn write_register(&mut self, register: u8, value: u8) -> core::result::Result<(), Self::Error> {
        let mut frame = [Self::command_byte(register, false), value];
        self.spi.transfer_in_place(&mut frame)
    }

    fn read_register(&mut self, register: u8) -> core::result::Result<u8, Self::Error> {
        let mut value = [0u8; 1];
        self.read_many(register, &mut value)?;
        Ok(value[0])
    }

    fn read_many(&mut self, register: u8, buf: &mut [u8]) -> core::result::Result<(), Self::Error> {
        let mut frame = [0u8; MAX_BURST + 1];
        let mut address = register;

        for chunk in buf.chunks_mut(MAX_BURST) {
            let frame = &mut frame[..=chunk.len()];
            frame.fill(0);
            frame[0] = Self::command_byte(address, true);
            self.spi.transfer_in_place(frame)?;
            chunk.copy_from_slice(&frame[1..]);
            address = address.wrapping_add(chunk.len() as u8);
        }

        Ok(())
    }
}
