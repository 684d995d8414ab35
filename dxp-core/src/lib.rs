#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::unescaped_backticks)]

//! Core traits and types for DXP spectrometer modules.

/// Common constants.
pub mod defined;
/// Parse errors of firmware and parameter files.
pub mod error;
/// Firmware images and firmware sets.
pub mod firmware;
/// A interface to the module bus.
pub mod link;
/// Bus registers and their bit layouts.
pub mod register;
/// Utilities for sleep.
pub mod sleep;
/// DSP symbol tables.
pub mod symbol;

pub use error::ParseError;
