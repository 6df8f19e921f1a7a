//! In-memory LDC1101 used by the unit tests.
//!
//! Behaves as a plain register file until a sample stream is attached. With a
//! stream, `LHR_STATUS` reports not-ready for a fixed number of polls before
//! each conversion, and reading `LHR_DATA_LSB` consumes the next value.

use std::collections::VecDeque;
use std::vec::Vec;

use embedded_hal::spi::{ErrorKind, ErrorType, Operation, SpiDevice};

use crate::registers::{
    LhrStatus,
    EXPECTED_CHIP_ID,
    READ_FLAG,
    REG_CHIP_ID,
    REG_LHR_DATA_LSB,
    REG_LHR_STATUS,
    REG_RID,
};

const REGISTER_SPACE: usize = 0x80;

pub(crate) struct SimulatedLdc1101 {
    registers: [u8; REGISTER_SPACE],
    samples: Option<VecDeque<u32>>,
    busy_polls: u32,
    polls_remaining: u32,
    data_reads: usize,
    failing_data_reads: Vec<usize>,
    fail_status_reads: bool,
    fail_writes_to: Option<u8>,
    fail_reads_of: Option<u8>,
    writes: Vec<(u8, u8)>,
}

impl SimulatedLdc1101 {
    pub(crate) fn new() -> Self {
        let mut registers = [0u8; REGISTER_SPACE];
        registers[REG_RID as usize] = 0x02;
        registers[REG_CHIP_ID as usize] = EXPECTED_CHIP_ID;
        Self {
            registers,
            samples: None,
            busy_polls: 0,
            polls_remaining: 0,
            data_reads: 0,
            failing_data_reads: Vec::new(),
            fail_status_reads: false,
            fail_writes_to: None,
            fail_reads_of: None,
            writes: Vec::new(),
        }
    }

    /// Attaches a stream of conversion results, each preceded by `busy_polls` not-ready polls.
    pub(crate) fn with_samples(mut self, samples: impl IntoIterator<Item = u32>, busy_polls: u32) -> Self {
        self.samples = Some(samples.into_iter().collect());
        self.busy_polls = busy_polls;
        self.polls_remaining = busy_polls;
        self
    }

    pub(crate) fn with_chip_id(mut self, chip_id: u8) -> Self {
        self.registers[REG_CHIP_ID as usize] = chip_id;
        self
    }

    /// Fails the `nth` (zero based) read of the LHR data registers.
    pub(crate) fn fail_data_read(mut self, nth: usize) -> Self {
        self.failing_data_reads.push(nth);
        self
    }

    pub(crate) fn fail_status_reads(mut self) -> Self {
        self.fail_status_reads = true;
        self
    }

    pub(crate) fn fail_writes_to(mut self, register: u8) -> Self {
        self.fail_writes_to = Some(register);
        self
    }

    pub(crate) fn fail_reads_of(mut self, register: u8) -> Self {
        self.fail_reads_of = Some(register);
        self
    }

    pub(crate) fn writes(&self) -> &[(u8, u8)] {
        &self.writes
    }

    fn exchange(&mut self, frame: &mut [u8]) -> Result<(), ErrorKind> {
        let Some((&mut command, payload)) = frame.split_first_mut() else {
            return Ok(());
        };
        let address = command & !READ_FLAG;

        if command & READ_FLAG == 0 {
            if self.fail_writes_to == Some(address) {
                return Err(ErrorKind::Other);
            }
            if let Some(&value) = payload.first() {
                self.registers[address as usize] = value;
                self.writes.push((address, value));
            }
            frame[0] = 0;
            return Ok(());
        }

        if self.fail_reads_of == Some(address) {
            return Err(ErrorKind::Other);
        }

        if self.samples.is_some() {
            match address {
                REG_LHR_STATUS => self.refresh_status()?,
                REG_LHR_DATA_LSB => self.latch_sample()?,
                _ => {}
            }
        }

        frame[0] = 0xFF;
        for (offset, byte) in frame[1..].iter_mut().enumerate() {
            *byte = self.registers[(address as usize + offset) % REGISTER_SPACE];
        }
        Ok(())
    }

    fn refresh_status(&mut self) -> Result<(), ErrorKind> {
        if self.fail_status_reads {
            return Err(ErrorKind::Other);
        }
        let pending = self.samples.as_ref().is_some_and(|queue| !queue.is_empty());
        let not_ready = !pending || self.polls_remaining > 0;
        self.polls_remaining = self.polls_remaining.saturating_sub(1);
        self.registers[REG_LHR_STATUS as usize] = LhrStatus::new().with_data_not_ready(not_ready).into();
        Ok(())
    }

    fn latch_sample(&mut self) -> Result<(), ErrorKind> {
        let nth = self.data_reads;
        self.data_reads += 1;
        if self.failing_data_reads.contains(&nth) {
            return Err(ErrorKind::Other);
        }
        let value = self
            .samples
            .as_mut()
            .and_then(VecDeque::pop_front)
            .unwrap_or_default();
        let base = REG_LHR_DATA_LSB as usize;
        self.registers[base..base + 3].copy_from_slice(&value.to_le_bytes()[..3]);
        self.polls_remaining = self.busy_polls;
        Ok(())
    }
}

impl ErrorType for SimulatedLdc1101 {
    type Error = ErrorKind;
}

impl SpiDevice for SimulatedLdc1101 {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        for operation in operations.iter_mut() {
            match operation {
                Operation::TransferInPlace(frame) => self.exchange(frame)?,
                _ => panic!("LDC1101 accesses are full-duplex exchanges"),
            }
        }
        Ok(())
    }
}
