mod units;

pub use units::*;

/// Number of logical channels on one module.
pub const NUM_CHANNELS: usize = 4;

/// Word address of DSP parameter memory.
pub const DATA_MEMORY_OFFSET: u16 = 0x4000;

/// Word address of DSP program memory.
pub const PROGRAM_MEMORY_OFFSET: u16 = 0x0000;

/// Number of FiPPI words sent one by one before the block transfer starts.
pub const FIPPI_SINGLE_WORDS: usize = 10;

/// ADC resolution used by the gain and threshold formulas.
pub const NUM_BITS_ADC: f64 = 1024.0;

/// Largest number of MCA bins the DSP can histogram.
pub const MAX_MCA_CHANNELS: f64 = 8192.0;

/// Smallest spacing between ADC trace samples in \[ns\]
pub const MIN_TRACE_SPACING_NS: f64 = 75.0;

/// Values of the `BUSY` DSP symbol.
pub mod busy {
    /// No run or control task in progress.
    pub const IDLE: u16 = 0;
    /// A normal run is in progress.
    pub const RUNNING: u16 = 6;
    /// The DSP is parked by the sleep control task.
    pub const ASLEEP: u16 = 7;
    /// A control task (or short preset run) finished and waits to be stopped.
    pub const DONE: u16 = 99;
}

/// Bits of the `RUNTASKS` DSP symbol.
pub mod runtasks {
    /// Stop baseline tracking while the task runs.
    pub const STOP_BASELINE: u16 = 0x0080;
    /// The next run is a control task.
    pub const CONTROL_TASK: u16 = 0x0100;
    /// Apply the baseline cut.
    pub const BASELINE_CUT: u16 = 0x0400;
}
