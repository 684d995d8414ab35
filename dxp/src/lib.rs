#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::unescaped_backticks)]

//! Control plane for DXP digital x-ray processor modules.
//!
//! A [`Controller`] owns the bus [`Link`](dxp_core::link::Link) of one module and the state of
//! its channels. It downloads the firmware, translates acquisition values to DSP parameters and
//! drives runs and control tasks.

/// [`Controller`] module.
pub mod controller;
/// Bus links backed by the module emulator.
pub mod link;
/// A module that contains commonly used types.
pub mod prelude;

pub use dxp_core as core;
pub use dxp_driver as driver;

pub use controller::Controller;
