pub use crate::controller::{Controller, ControllerBuilder};

#[cfg(feature = "link-nop")]
pub use crate::link::Nop;

pub use dxp_core::{
    firmware::{
        FileSource, FilterInfo, FirmwareDatabase, FirmwareRecord, FirmwareSet, FirmwareSource,
        MemorySource, ParamDefaults,
    },
    link::{Link, LinkError},
    sleep::{Sleeper, SpinSleeper, SpinWaitSleeper, StdSleeper},
    symbol::WriteOutcome,
    ParseError,
};

pub use dxp_driver::{
    acquisition::{Defaults, ParamData, PresetType, RunData},
    detector::{Detector, PreampType},
    error::DXPDriverError,
    option::DriverOption,
};
