pub mod emulator;
pub(crate) mod params;

pub use params::{BASELEN, HSTLEN, MAXSCA, SYSMICROSEC};

/// Counters a DSP accumulates during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunStatistics {
    pub events: u32,
    pub underflows: u32,
    pub overflows: u32,
    pub fast_peaks: u32,
    pub baseline_events: u32,
    pub livetime_ticks: u64,
    pub realtime_ticks: u64,
}
