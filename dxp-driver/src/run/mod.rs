mod task;

pub use task::{rotate_history, ControlTask, TaskParams};

use std::time::Duration;

use dxp_core::{
    defined::busy,
    register::{ChannelSelect, ControlStatus, GlobalStatus, Register},
    sleep::Sleeper,
    symbol::SymbolTable,
};

use crate::{
    engine::{Dsp, RegisterIo},
    error::DXPDriverError,
    option::DriverOption,
};

const QUICK_RUN_POLL: Duration = Duration::from_millis(20);
const QUICK_RUN_RETRIES: usize = 200;

fn iterations(poll: Duration, timeout: Duration) -> usize {
    if poll.is_zero() {
        return 1;
    }
    ((timeout.as_secs_f64() / poll.as_secs_f64()).round() as usize).max(1)
}

/// Enables a run on every channel of the module.
///
/// Unless `resume` is set the spectra and statistics are cleared first. Without `use_gate` the
/// external gate is ignored.
pub fn begin_run(
    io: &mut RegisterIo<'_>,
    use_gate: bool,
    resume: bool,
) -> Result<(), DXPDriverError> {
    let mut csr = ControlStatus::RUNENABLE | ControlStatus::ALLCHAN;
    if !resume {
        csr |= ControlStatus::RESETMCA;
    }
    if !use_gate {
        csr |= ControlStatus::IGNOREGATE;
    }
    tracing::debug!("begin run: CSR = {:#06X}", csr.bits());
    io.write_register(Register::Csr, csr.bits())
}

/// Disables the run on every channel of the module.
pub fn end_run(io: &mut RegisterIo<'_>) -> Result<(), DXPDriverError> {
    let mut csr = ControlStatus::from_bits_retain(io.read_register(Register::Csr)?);
    csr.remove(ControlStatus::RUNENABLE | ControlStatus::CHANNEL_MASK);
    csr.insert(ControlStatus::ALLCHAN);
    tracing::debug!("end run: CSR = {:#06X}", csr.bits());
    io.write_register(Register::Csr, csr.bits())
}

/// Checks the run-active bit of `channel`.
pub fn run_active(io: &mut RegisterIo<'_>, channel: u8) -> Result<bool, DXPDriverError> {
    let gsr = GlobalStatus::from_bits(io.read_register(Register::Gsr)?);
    Ok(gsr.run_active(channel))
}

fn read_busy(
    io: &mut RegisterIo<'_>,
    channel: u8,
    symbols: &SymbolTable,
) -> Result<u16, DXPDriverError> {
    let symbol = symbols
        .locate("BUSY")
        .ok_or_else(|| DXPDriverError::UnknownSymbol("BUSY".to_string()))?;
    io.read_word(ChannelSelect::Single(channel), symbol.address())
}

/// Waits until every listed channel reports a running or finished run.
pub fn wait_for_run_start(
    io: &mut RegisterIo<'_>,
    sleeper: &dyn Sleeper,
    option: &DriverOption,
    channels: &[(u8, &SymbolTable)],
) -> Result<(), DXPDriverError> {
    let mut pending = channels.to_vec();
    for i in 0..iterations(option.run_start_poll, option.run_start_timeout) {
        sleeper.sleep(option.run_start_poll);
        let mut still = Vec::with_capacity(pending.len());
        for &(channel, symbols) in &pending {
            let busy = read_busy(io, channel, symbols)?;
            tracing::trace!("run start {}: channel {} BUSY = {}", i, channel, busy);
            if busy != busy::RUNNING && busy != busy::DONE {
                still.push((channel, symbols));
            }
        }
        if still.is_empty() {
            return Ok(());
        }
        pending = still;
    }
    Err(DXPDriverError::RunStartTimeout(
        pending.first().map_or(0, |&(ch, _)| ch),
    ))
}

impl Dsp<'_> {
    /// Reads `BUSY`.
    pub fn read_busy(&mut self) -> Result<u16, DXPDriverError> {
        self.read_param("BUSY")
    }

    /// Polls `BUSY` until it equals `target`, sleeping `poll` before every read.
    pub fn wait_for_busy(
        &mut self,
        target: u16,
        poll: Duration,
        timeout: Duration,
    ) -> Result<(), DXPDriverError> {
        let mut last = 0;
        for i in 0..iterations(poll, timeout) {
            self.sleep(poll);
            last = self.read_busy()?;
            tracing::trace!("channel {}: BUSY = {} ({})", self.channel(), last, i);
            if last == target {
                return Ok(());
            }
        }
        Err(DXPDriverError::Timeout {
            channel: self.channel(),
            target,
            last,
        })
    }

    /// Enables a run on the module.
    pub fn begin_run(&mut self, use_gate: bool, resume: bool) -> Result<(), DXPDriverError> {
        begin_run(self.io(), use_gate, resume)
    }

    /// Disables the run on the module.
    pub fn end_run(&mut self) -> Result<(), DXPDriverError> {
        end_run(self.io())
    }

    /// Checks if the hardware reports an active run on this channel.
    pub fn run_active(&mut self) -> Result<bool, DXPDriverError> {
        let channel = self.channel();
        run_active(self.io(), channel)
    }

    /// Polls `BUSY` until the run has ended.
    pub fn wait_for_run_stop(&mut self) -> Result<(), DXPDriverError> {
        let option = self.option();
        self.sleep(option.run_stop_poll);
        let mut last = 0;
        for _ in 0..option.run_stop_retries.max(1) {
            last = self.read_busy()?;
            if last == busy::IDLE {
                return Ok(());
            }
            self.sleep(option.run_stop_poll);
        }
        Err(DXPDriverError::Timeout {
            channel: self.channel(),
            target: busy::IDLE,
            last,
        })
    }

    /// Ends the run and waits for this channel to become idle.
    pub fn stop_run(&mut self) -> Result<(), DXPDriverError> {
        self.end_run()?;
        self.wait_for_run_stop()
    }

    /// Runs briefly so the DSP picks up parameters it only reads at run start.
    pub fn quick_run(&mut self, use_gate: bool) -> Result<(), DXPDriverError> {
        self.begin_run(use_gate, false)?;
        let mut last = 0;
        for _ in 0..QUICK_RUN_RETRIES {
            self.sleep(QUICK_RUN_POLL);
            last = self.read_busy()?;
            if last == busy::RUNNING || last == busy::DONE {
                return self.stop_run();
            }
        }
        tracing::warn!("channel {}: quick run did not start", self.channel());
        self.end_run()?;
        Err(DXPDriverError::Timeout {
            channel: self.channel(),
            target: busy::RUNNING,
            last,
        })
    }
}
