//! Register-level emulator of a four-channel DXP module.

pub mod dsp;
pub mod firmware;
pub mod module;

pub use dsp::{emulator::DSPEmulator, RunStatistics};
pub use module::ModuleEmulator;
