use dxp_core::{
    defined::NUM_CHANNELS,
    firmware::FirmwareSource,
    register::{ChannelSelect, ControlStatus, GlobalStatus, Register},
    symbol::SymbolTable,
    ParseError,
};

use crate::{dsp::emulator::DSPEmulator, firmware};

/// One bus transaction seen by the emulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusCall {
    pub reg: Register,
    pub write: bool,
    pub len: usize,
}

const STROBES: ControlStatus = ControlStatus::RESETMCA
    .union(ControlStatus::DSPRESET)
    .union(ControlStatus::FIPRESET);

pub struct ModuleEmulator {
    dsps: Vec<DSPEmulator>,
    csr: ControlStatus,
    gcr: u16,
    pointer: u16,
    run_enabled: bool,
    fippi_fail: bool,
    calls: Vec<BusCall>,
}

impl std::ops::Deref for ModuleEmulator {
    type Target = [DSPEmulator];

    fn deref(&self) -> &Self::Target {
        &self.dsps
    }
}

impl std::ops::DerefMut for ModuleEmulator {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.dsps
    }
}

impl ModuleEmulator {
    #[must_use]
    pub fn new(symbols: SymbolTable) -> Self {
        Self {
            dsps: (0..NUM_CHANNELS as u8)
                .map(|i| DSPEmulator::new(i, symbols.clone()))
                .collect(),
            csr: ControlStatus::empty(),
            gcr: 0,
            pointer: 0,
            run_enabled: false,
            fippi_fail: false,
            calls: Vec::new(),
        }
    }

    /// Creates an emulator running the bundled DSP program.
    pub fn with_bundled_firmware() -> Result<Self, ParseError> {
        Ok(Self::new(
            firmware::source().dsp(firmware::DSP)?.into_symbols(),
        ))
    }

    #[must_use]
    pub const fn csr(&self) -> ControlStatus {
        self.csr
    }

    #[must_use]
    pub const fn run_enabled(&self) -> bool {
        self.run_enabled
    }

    #[must_use]
    pub fn calls(&self) -> &[BusCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Number of transactions on `reg`.
    #[must_use]
    pub fn count_calls(&self, reg: Register) -> usize {
        self.calls.iter().filter(|c| c.reg == reg).count()
    }

    /// Makes subsequent FiPPI downloads report an error.
    pub fn fail_fippi(&mut self, fail: bool) {
        self.fippi_fail = fail;
    }

    #[must_use]
    pub fn gsr(&self) -> GlobalStatus {
        self.dsps.iter().fold(GlobalStatus::new(), |gsr, dsp| {
            let bit = 1 << dsp.idx();
            gsr.with_run_active_bits(gsr.run_active_bits() | if dsp.is_running() { bit } else { 0 })
                .with_fippi_error_bits(
                    gsr.fippi_error_bits() | if dsp.fippi_error(self.fippi_fail) { bit } else { 0 },
                )
        })
    }

    fn selected(&self, sel: ChannelSelect) -> impl Iterator<Item = usize> + '_ {
        self.dsps
            .iter()
            .filter(move |d| sel.contains(d.idx()))
            .map(|d| d.idx() as usize)
    }

    fn write_csr(&mut self, value: u16) {
        let value = ControlStatus::from_bits_retain(value);
        let sel = ChannelSelect::from_bits(value.bits());
        let targets = self.selected(sel).collect::<Vec<_>>();

        if value.contains(ControlStatus::DSPRESET) {
            targets.iter().for_each(|&i| self.dsps[i].reset_dsp());
        }
        if value.contains(ControlStatus::FIPRESET) {
            targets.iter().for_each(|&i| self.dsps[i].begin_fippi());
        }

        let run = value.contains(ControlStatus::RUNENABLE);
        if run && !self.run_enabled {
            let reset = value.contains(ControlStatus::RESETMCA);
            targets.iter().for_each(|&i| self.dsps[i].start_run(reset));
        } else if !run && self.run_enabled {
            targets.iter().for_each(|&i| self.dsps[i].stop_run());
        }
        self.run_enabled = run;
        self.csr = value.difference(STROBES);
    }

    pub fn write(&mut self, reg: Register, data: &[u16]) -> usize {
        self.calls.push(BusCall {
            reg,
            write: true,
            len: data.len(),
        });
        let Some(&last) = data.last() else {
            return 0;
        };
        match reg {
            Register::Gcr => self.gcr = last,
            Register::Tsar => self.pointer = last,
            Register::Csr => self.write_csr(last),
            Register::Gsr => return 0,
            Register::Data => {
                let sel = ChannelSelect::from_bits(self.gcr);
                let pointer = self.pointer;
                self.selected(sel)
                    .collect::<Vec<_>>()
                    .into_iter()
                    .for_each(|i| self.dsps[i].write(pointer, data));
                self.pointer = self.pointer.wrapping_add(data.len() as u16);
            }
            Register::Fippi => {
                let sel = ChannelSelect::from_bits(self.csr.bits());
                self.selected(sel)
                    .collect::<Vec<_>>()
                    .into_iter()
                    .for_each(|i| self.dsps[i].load_fippi(data));
            }
        }
        data.len()
    }

    pub fn read(&mut self, reg: Register, data: &mut [u16]) -> usize {
        self.calls.push(BusCall {
            reg,
            write: false,
            len: data.len(),
        });
        match reg {
            Register::Gcr => data.fill(self.gcr),
            Register::Tsar => data.fill(self.pointer),
            Register::Csr => data.fill(self.csr.bits()),
            Register::Gsr => data.fill(self.gsr().into_bits()),
            Register::Data => {
                let ch = match ChannelSelect::from_bits(self.gcr) {
                    ChannelSelect::Single(ch) => ch as usize,
                    ChannelSelect::All => 0,
                };
                self.dsps[ch].read(self.pointer, data);
                self.pointer = self.pointer.wrapping_add(data.len() as u16);
            }
            Register::Fippi => data.fill(0),
        }
        data.len()
    }
}
