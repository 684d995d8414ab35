#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::unescaped_backticks)]

//! Register engine, run state machine and acquisition-value translation for DXP modules.

/// Acquisition values and their translation to DSP parameters.
pub mod acquisition;
/// Per channel state kept by the host.
pub mod channel;
/// Detector description.
pub mod detector;
/// Register I/O, named symbol access and firmware download.
pub mod engine;
/// Error definitions.
pub mod error;
/// Driver configuration.
pub mod option;
/// Run and control task state machine.
pub mod run;

#[cfg(test)]
mod testing;

pub use dxp_core as core;
