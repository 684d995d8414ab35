use dxp_core::{
    defined::{busy, FIPPI_SINGLE_WORDS, PROGRAM_MEMORY_OFFSET},
    register::{ControlStatus, GlobalStatus, Register},
};

use crate::{error::DXPDriverError, run::ControlTask};

use super::Dsp;

const SLEEP_DIVISIONS: u32 = 10;

impl Dsp<'_> {
    fn write_reset(&mut self, bit: ControlStatus) -> Result<(), DXPDriverError> {
        let mut csr = ControlStatus::from_bits_retain(self.io().read_register(Register::Csr)?);
        csr.remove(ControlStatus::CHANNEL_MASK);
        csr.insert(bit | self.select().bits());
        tracing::debug!("channel {}: CSR = {:#06X}", self.channel(), csr.bits());
        self.io().write_register(Register::Csr, csr.bits())
    }

    /// Downloads a DSP program and waits for it to boot.
    ///
    /// The program is written from address 1 on and the first two words last, since writing
    /// address 0 starts the DSP.
    pub fn download_dsp(&mut self, program: &[u16]) -> Result<(), DXPDriverError> {
        if program.len() < 2 {
            return Err(DXPDriverError::InvalidProgram(program.len()));
        }
        tracing::debug!("channel {}: download {} DSP words", self.channel(), program.len());
        self.write_reset(ControlStatus::DSPRESET)?;
        self.write_memory(PROGRAM_MEMORY_OFFSET + 1, &program[2..])?;
        self.write_memory(PROGRAM_MEMORY_OFFSET, &program[..2])?;
        let timeout = self.option().boot_timeout;
        self.wait_for_busy(busy::IDLE, timeout / SLEEP_DIVISIONS, timeout)
    }

    /// Downloads a FiPPI configuration.
    ///
    /// The DSP is put to sleep during the transfer. Its wake-up and the FiPPI status are verified
    /// afterwards.
    pub fn download_fippi(&mut self, data: &[u16]) -> Result<(), DXPDriverError> {
        tracing::debug!("channel {}: download {} FiPPI words", self.channel(), data.len());
        let timeout = self.option().sleep_timeout;
        let poll = timeout / SLEEP_DIVISIONS;

        self.end_run()?;
        self.begin_control_task(ControlTask::SleepDsp, &[0])?;
        self.wait_for_busy(busy::ASLEEP, poll, timeout)?;

        self.write_reset(ControlStatus::FIPRESET)?;
        self.sleep(self.option().fippi_settle);
        let (single, rest) = data.split_at(data.len().min(FIPPI_SINGLE_WORDS));
        single
            .iter()
            .try_for_each(|&w| self.io().write_register(Register::Fippi, w))?;
        if !rest.is_empty() {
            self.io().write_stream(Register::Fippi, rest)?;
        }

        self.end_control_task()?;
        self.wait_for_busy(busy::IDLE, poll, timeout)?;

        let gsr = GlobalStatus::from_bits(self.io().read_register(Register::Gsr)?);
        if gsr.download_ok(self.channel()) {
            Ok(())
        } else {
            Err(DXPDriverError::FippiDownloadFailed(self.channel()))
        }
    }
}
