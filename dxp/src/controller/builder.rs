use dxp_core::{
    defined::NUM_CHANNELS,
    firmware::{FirmwareSet, FirmwareSource, ParamDefaults},
    link::Link,
    sleep::{Sleeper, StdSleeper},
};
use dxp_driver::{
    acquisition::Defaults, channel::Channel, detector::Detector, error::DXPDriverError,
    option::DriverOption,
};

use super::Controller;

/// Builder for [`Controller`]
pub struct ControllerBuilder {
    channels: Vec<(Detector, Defaults)>,
    firmware: FirmwareSet,
    source: Box<dyn FirmwareSource>,
    param_defaults: String,
    option: DriverOption,
    sleeper: Box<dyn Sleeper + Send + Sync>,
}

impl ControllerBuilder {
    /// Creates a builder for a module whose firmware is chosen from `firmware` and read from
    /// `source`.
    #[must_use]
    pub fn new(firmware: FirmwareSet, source: impl FirmwareSource + 'static) -> Self {
        Self {
            channels: Vec::new(),
            firmware,
            source: Box::new(source),
            param_defaults: ParamDefaults::NULL.to_owned(),
            option: DriverOption::default(),
            sleeper: Box::new(StdSleeper),
        }
    }

    /// Adds the next channel with its detector and acquisition values.
    #[must_use]
    pub fn add_channel(mut self, detector: Detector, defaults: Defaults) -> Self {
        self.channels.push((detector, defaults));
        self
    }

    /// Sets the DSP parameter defaults written after every program download.
    #[must_use]
    pub fn with_param_defaults(mut self, name: impl Into<String>) -> Self {
        self.param_defaults = name.into();
        self
    }

    /// Sets the driver configuration.
    #[must_use]
    pub fn with_option(mut self, option: DriverOption) -> Self {
        self.option = option;
        self
    }

    /// Sets the sleep strategy of the poll loops.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: impl Sleeper + Send + Sync + 'static) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    /// Opens the controller.
    ///
    /// Every channel gets the DSP program for its peaking time, the parameter defaults, the
    /// FiPPI configuration and finally all of its acquisition values.
    pub fn open<L: Link>(self, mut link: L) -> Result<Controller<L>, DXPDriverError> {
        if self.channels.len() > NUM_CHANNELS {
            return Err(DXPDriverError::InvalidChannel(NUM_CHANNELS));
        }
        self.channels
            .iter()
            .try_for_each(|(_, defaults)| defaults.validate())?;

        link.open()?;

        let mut cnt = Controller {
            link,
            channels: self
                .channels
                .into_iter()
                .enumerate()
                .map(|(i, (detector, defaults))| Channel::new(i as u8, defaults, detector))
                .collect(),
            firmware: self.firmware,
            source: self.source,
            param_defaults: self.param_defaults,
            option: self.option,
            sleeper: self.sleeper,
        };
        (0..cnt.channels.len()).try_for_each(|ch| cnt.initialize(ch))?;
        Ok(cnt)
    }
}
