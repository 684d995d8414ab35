use dxp_core::{
    defined::{busy, runtasks, DATA_MEMORY_OFFSET},
    symbol::SymbolTable,
};

use super::{params::*, RunStatistics};

pub struct DSPEmulator {
    pub(crate) idx: u8,
    pub(crate) symbols: SymbolTable,
    pub(crate) memory: Vec<u16>,
    pub(crate) in_reset: bool,
    pub(crate) booted: bool,
    pub(crate) running: bool,
    pub(crate) asleep: bool,
    pub(crate) frozen_busy: Option<u16>,
    pub(crate) fippi: Vec<u16>,
    pub(crate) fippi_pending: bool,
    pub(crate) last_task: Option<u16>,
    pub(crate) run_count: usize,
}

impl DSPEmulator {
    #[must_use]
    pub fn new(idx: u8, symbols: SymbolTable) -> Self {
        Self {
            idx,
            symbols,
            memory: vec![0x0000; MEMORY_SIZE],
            in_reset: false,
            booted: false,
            running: false,
            asleep: false,
            frozen_busy: None,
            fippi: Vec::new(),
            fippi_pending: false,
            last_task: None,
            run_count: 0,
        }
    }

    #[must_use]
    pub const fn idx(&self) -> u8 {
        self.idx
    }

    #[must_use]
    pub const fn is_booted(&self) -> bool {
        self.booted
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub const fn is_asleep(&self) -> bool {
        self.asleep
    }

    #[must_use]
    pub const fn last_task(&self) -> Option<u16> {
        self.last_task
    }

    #[must_use]
    pub const fn run_count(&self) -> usize {
        self.run_count
    }

    #[must_use]
    pub fn fippi(&self) -> &[u16] {
        &self.fippi
    }

    #[must_use]
    pub fn program(&self) -> &[u16] {
        &self.memory[..PROGRAM_SIZE]
    }

    #[must_use]
    pub fn memory(&self, addr: u16, len: usize) -> &[u16] {
        &self.memory[addr as usize..addr as usize + len]
    }

    pub fn write_memory(&mut self, addr: u16, data: &[u16]) {
        self.memory[addr as usize..addr as usize + data.len()].copy_from_slice(data);
    }

    fn address(&self, name: &str) -> Option<usize> {
        self.symbols
            .locate(name)
            .map(|s| s.address() as usize)
    }

    #[must_use]
    pub fn symbol(&self, name: &str) -> Option<u16> {
        self.address(name).map(|a| self.memory[a])
    }

    pub fn set_symbol(&mut self, name: &str, value: u16) {
        if let Some(a) = self.address(name) {
            self.memory[a] = value;
        }
    }

    fn param(&self, name: &str) -> u16 {
        self.symbol(name).unwrap_or(0)
    }

    /// Keeps `BUSY` at `value` regardless of run changes.
    pub fn freeze_busy(&mut self, value: Option<u16>) {
        self.frozen_busy = value;
        if let Some(v) = value {
            self.set_symbol("BUSY", v);
        }
    }

    fn set_busy(&mut self, value: u16) {
        if self.frozen_busy.is_none() {
            self.set_symbol("BUSY", value);
        }
    }

    pub fn set_spectrum(&mut self, spectrum: &[u32]) {
        let start = self.param("SPECTSTART");
        let words = spectrum
            .iter()
            .flat_map(|&v| [(v & 0xFFFF) as u16, (v >> 16) as u16])
            .collect::<Vec<_>>();
        self.write_memory(start, &words);
    }

    pub fn set_baseline(&mut self, baseline: &[u16]) {
        let start = DATA_MEMORY_OFFSET + self.param("BASESTART");
        self.write_memory(start, baseline);
    }

    /// Fills the circular history buffer and sets its write pointer to `offset`.
    pub fn set_history(&mut self, history: &[u16], offset: u16) {
        let start = self.param("HSTSTART");
        self.write_memory(DATA_MEMORY_OFFSET + start, history);
        self.set_symbol("CIRCULAR", start + offset);
    }

    pub fn set_sca_counts(&mut self, counts: &[u32]) {
        let start = DATA_MEMORY_OFFSET + self.param("SCADSTART");
        let words = counts
            .iter()
            .flat_map(|&v| [(v & 0xFFFF) as u16, (v >> 16) as u16])
            .collect::<Vec<_>>();
        self.write_memory(start, &words);
    }

    pub fn set_statistics(&mut self, stats: RunStatistics) {
        [
            ("EVTSINRUN", stats.events),
            ("UNDRFLOWS", stats.underflows),
            ("OVERFLOWS", stats.overflows),
            ("FASTPEAKS", stats.fast_peaks),
            ("BASEEVTS", stats.baseline_events),
        ]
        .into_iter()
        .for_each(|(name, v)| {
            self.set_symbol(&format!("{name}0"), (v >> 16) as u16);
            self.set_symbol(&format!("{name}1"), (v & 0xFFFF) as u16);
        });
        [
            ("LIVETIME", stats.livetime_ticks),
            ("REALTIME", stats.realtime_ticks),
        ]
        .into_iter()
        .for_each(|(name, v)| {
            self.set_symbol(&format!("{name}0"), ((v >> 16) & 0xFFFF) as u16);
            self.set_symbol(&format!("{name}1"), (v & 0xFFFF) as u16);
            self.set_symbol(&format!("{name}2"), ((v >> 32) & 0xFFFF) as u16);
        });
    }

    pub(crate) fn reset_dsp(&mut self) {
        self.in_reset = true;
        self.booted = false;
        self.running = false;
        self.asleep = false;
        self.memory.fill(0x0000);
    }

    pub(crate) fn write(&mut self, addr: u16, data: &[u16]) {
        let start = addr as usize;
        let end = (start + data.len()).min(MEMORY_SIZE);
        self.memory[start..end].copy_from_slice(&data[..end - start]);
        if self.in_reset && start == 0 {
            self.boot();
        }
    }

    pub(crate) fn read(&self, addr: u16, data: &mut [u16]) {
        let start = addr as usize;
        let end = (start + data.len()).min(MEMORY_SIZE);
        data[..end - start].copy_from_slice(&self.memory[start..end]);
    }

    fn boot(&mut self) {
        tracing::debug!("DSP {} booted", self.idx);
        self.in_reset = false;
        self.booted = true;
        self.memory[DATA_MEMORY_OFFSET as usize..].fill(0x0000);
        BOOT_VALUES
            .iter()
            .for_each(|&(name, v)| self.set_symbol(name, v));
        if let Some(&dec) = self.fippi.first() {
            self.set_symbol("DECIMATION", dec);
        }
        self.set_busy(busy::IDLE);
    }

    pub(crate) fn begin_fippi(&mut self) {
        self.fippi.clear();
        self.fippi_pending = true;
    }

    pub(crate) fn load_fippi(&mut self, data: &[u16]) {
        if !self.fippi_pending {
            return;
        }
        self.fippi.extend_from_slice(data);
        if self.booted {
            if let Some(&dec) = self.fippi.first() {
                self.set_symbol("DECIMATION", dec);
            }
        }
    }

    pub(crate) fn fippi_error(&self, fail: bool) -> bool {
        self.fippi_pending && (fail || self.fippi.is_empty())
    }

    pub(crate) fn start_run(&mut self, reset_mca: bool) {
        if !self.booted {
            return;
        }
        self.running = true;
        self.run_count += 1;
        if self.param("RUNTASKS") & runtasks::CONTROL_TASK != 0 {
            let task = self.param("WHICHTEST");
            self.run_task(task);
            return;
        }
        self.last_task = None;
        if reset_mca {
            self.clear_mca();
        }
        self.set_busy(busy::RUNNING);
    }

    fn run_task(&mut self, task: u16) {
        tracing::debug!("DSP {} runs control task {}", self.idx, task);
        self.last_task = Some(task);
        match task {
            WHICHTEST_SLEEP_DSP => {
                self.asleep = true;
                self.set_busy(busy::ASLEEP);
                return;
            }
            WHICHTEST_ACQUIRE_ADC => {
                let wait = self.param("TRACEWAIT");
                let trace = (0..self.param("HSTLEN"))
                    .map(|i| 0x0800 + ((i.wrapping_mul(37).wrapping_add(wait)) & 0x00FF))
                    .collect::<Vec<_>>();
                let start = DATA_MEMORY_OFFSET + self.param("HSTSTART");
                self.write_memory(start, &trace);
            }
            WHICHTEST_READ_MEMORY => {
                let base = ((self.param("EXTPAGE") as u32) << 14) | self.param("EXTADDRESS") as u32;
                let len = self.param("EXTLENGTH").min(self.param("HSTLEN"));
                let data = (0..len as u32)
                    .map(|i| ((base + i) & 0xFFFF) as u16)
                    .collect::<Vec<_>>();
                let start = DATA_MEMORY_OFFSET + self.param("HSTSTART");
                self.write_memory(start, &data);
            }
            _ => {}
        }
        self.set_busy(busy::DONE);
    }

    fn clear_mca(&mut self) {
        let len = 2 * self.param("MCALIMHI") as usize;
        let start = self.param("SPECTSTART");
        self.write_memory(start, &vec![0; len.min(MEMORY_SIZE - start as usize)]);
        self.set_statistics(RunStatistics::default());
    }

    pub(crate) fn stop_run(&mut self) {
        if !self.booted {
            return;
        }
        self.running = false;
        self.asleep = false;
        self.set_busy(busy::IDLE);
    }
}
