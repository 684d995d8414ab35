mod builder;

use dxp_core::{
    firmware::{FirmwareSet, FirmwareSource},
    link::Link,
    sleep::Sleeper,
    symbol::WriteOutcome,
};
use dxp_driver::{
    acquisition::{Acquisition, Context, ParamData, RunData},
    channel::Channel,
    engine::{Dsp, RegisterIo},
    error::DXPDriverError,
    option::DriverOption,
    run,
};
use getset::Getters;

pub use builder::ControllerBuilder;

/// A controller of one DXP module.
///
/// All operations to the module are done through this struct. Channels are addressed by their
/// index on the module.
#[derive(Getters)]
pub struct Controller<L: Link> {
    link: L,
    channels: Vec<Channel>,
    #[getset(get = "pub")]
    /// Firmware variants of the module.
    firmware: FirmwareSet,
    source: Box<dyn FirmwareSource>,
    #[getset(get = "pub")]
    /// Name of the DSP parameter defaults.
    param_defaults: String,
    #[getset(get = "pub")]
    /// Driver configuration.
    option: DriverOption,
    sleeper: Box<dyn Sleeper + Send + Sync>,
}

impl<L: Link> std::ops::Deref for Controller<L> {
    type Target = [Channel];

    fn deref(&self) -> &Self::Target {
        &self.channels
    }
}

impl<L: Link> std::ops::DerefMut for Controller<L> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.channels
    }
}

impl<L: Link> Controller<L> {
    #[doc(hidden)]
    pub const fn link(&self) -> &L {
        &self.link
    }

    #[doc(hidden)]
    pub const fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// The channel at `ch`.
    pub fn channel(&self, ch: usize) -> Result<&Channel, DXPDriverError> {
        self.channels.get(ch).ok_or(DXPDriverError::InvalidChannel(ch))
    }

    fn with_channel<T>(
        &mut self,
        ch: usize,
        f: impl FnOnce(&mut Channel, RegisterIo<'_>, Context<'_>) -> Result<T, DXPDriverError>,
    ) -> Result<T, DXPDriverError> {
        let channel = self
            .channels
            .get_mut(ch)
            .ok_or(DXPDriverError::InvalidChannel(ch))?;
        let ctx = Context {
            option: &self.option,
            sleeper: self.sleeper.as_ref(),
            firmware: &self.firmware,
            source: self.source.as_ref(),
        };
        f(channel, RegisterIo::new(&mut self.link, self.option.max_block), ctx)
    }

    fn acquisition<T>(
        &mut self,
        ch: usize,
        f: impl FnOnce(&mut Acquisition<'_>) -> Result<T, DXPDriverError>,
    ) -> Result<T, DXPDriverError> {
        self.with_channel(ch, |channel, mut io, ctx| {
            f(&mut channel.acquisition(io.reborrow(), ctx)?)
        })
    }

    fn dsp<T>(
        &mut self,
        ch: usize,
        f: impl FnOnce(&mut Dsp<'_>) -> Result<T, DXPDriverError>,
    ) -> Result<T, DXPDriverError> {
        self.with_channel(ch, |channel, mut io, ctx| {
            f(&mut channel.dsp(io.reborrow(), ctx)?)
        })
    }

    pub(crate) fn initialize(&mut self, ch: usize) -> Result<(), DXPDriverError> {
        let peaking_time = self.channel(ch)?.defaults().require("peaking_time")?;
        let selected = self.firmware.select(peaking_time)?;
        let image = self.source.dsp(&selected.record.dsp)?;
        tracing::debug!(
            "channel {}: {} / {} for {} µs",
            ch,
            selected.record.dsp,
            selected.record.fippi,
            peaking_time
        );
        self.with_channel(ch, |channel, io, ctx| channel.download_dsp(io, ctx, image))?;
        self.apply_param_defaults(ch)?;
        self.user_setup(ch)
    }

    fn apply_param_defaults(&mut self, ch: usize) -> Result<(), DXPDriverError> {
        let defaults = self.source.param_defaults(&self.param_defaults)?;
        self.dsp(ch, |dsp| {
            defaults
                .iter()
                .try_for_each(|(name, value)| dsp.write_param(name, value).map(|_| ()))
        })
    }

    /// Applies every acquisition value of the channel again.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn user_setup(&mut self, ch: usize) -> Result<(), DXPDriverError> {
        self.acquisition(ch, |acq| acq.user_setup())
    }

    /// Checks if the hardware reports an active run on the channel.
    pub fn run_active(&mut self, ch: usize) -> Result<bool, DXPDriverError> {
        self.with_channel(ch, |channel, mut io, _| run::run_active(&mut io, channel.index()))
    }

    /// Sets the acquisition value `name` and returns the achieved value.
    ///
    /// A run in progress is stopped for the change and resumed afterwards.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn set_value(&mut self, ch: usize, name: &str, value: f64) -> Result<f64, DXPDriverError> {
        let running = self.run_active(ch)?;
        if running {
            self.stop_run()?;
        }
        let achieved = self.acquisition(ch, |acq| acq.set_value(name, value));
        if running {
            self.start_run(true)?;
        }
        achieved
    }

    /// The stored acquisition value `name`.
    pub fn get_value(&self, ch: usize, name: &str) -> Result<f64, DXPDriverError> {
        self.channel(ch)?
            .defaults()
            .get(name)
            .ok_or_else(|| DXPDriverError::UnknownValue(name.to_string()))
    }

    /// Removes the acquisition value `name` from the channel.
    pub fn remove_value(&mut self, ch: usize, name: &str) -> Result<f64, DXPDriverError> {
        self.channels
            .get_mut(ch)
            .ok_or(DXPDriverError::InvalidChannel(ch))?
            .remove_value(name)
    }

    /// Starts a run on every channel of the module.
    ///
    /// The run is confirmed only after every channel reported it. On a timeout the channels stay
    /// unconfirmed.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn start_run(&mut self, resume: bool) -> Result<(), DXPDriverError> {
        let use_gate = self
            .channels
            .iter()
            .any(|c| c.defaults().get("enable_gate").is_some_and(|v| v != 0.0));
        self.channels
            .iter_mut()
            .for_each(|c| c.state_mut().request_run(resume));

        let mut io = RegisterIo::new(&mut self.link, self.option.max_block);
        run::begin_run(&mut io, use_gate, resume)?;
        let targets = self
            .channels
            .iter()
            .map(|c| Ok((c.index(), c.require_symbols()?)))
            .collect::<Result<Vec<_>, DXPDriverError>>()?;
        run::wait_for_run_start(&mut io, self.sleeper.as_ref(), &self.option, &targets)?;

        self.channels
            .iter_mut()
            .for_each(|c| c.state_mut().confirm_run());
        Ok(())
    }

    /// Stops the run on every channel and waits for each of them to become idle.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn stop_run(&mut self) -> Result<(), DXPDriverError> {
        run::end_run(&mut RegisterIo::new(&mut self.link, self.option.max_block))?;
        (0..self.channels.len()).try_for_each(|ch| {
            self.dsp(ch, |dsp| dsp.wait_for_run_stop())?;
            self.channels[ch].state_mut().stop_run();
            Ok(())
        })
    }

    /// Reads run data `name`.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn get_run_data(&mut self, ch: usize, name: &str) -> Result<RunData, DXPDriverError> {
        self.acquisition(ch, |acq| acq.run_data(name))
    }

    /// Starts the special run `name`.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn do_special_run(
        &mut self,
        ch: usize,
        name: &str,
        info: &[f64],
    ) -> Result<(), DXPDriverError> {
        self.acquisition(ch, |acq| acq.start_special_run(name, info))
    }

    /// Reads the data of a special run.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn get_special_run_data(
        &mut self,
        ch: usize,
        name: &str,
    ) -> Result<RunData, DXPDriverError> {
        self.acquisition(ch, |acq| acq.special_run_data(name))
    }

    /// Runs the board operation `name`.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn board_operation(&mut self, ch: usize, name: &str) -> Result<f64, DXPDriverError> {
        self.acquisition(ch, |acq| acq.board_operation(name))
    }

    /// Scales the ADC percent rule by `delta`.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn gain_change(&mut self, ch: usize, delta: f64) -> Result<(), DXPDriverError> {
        self.acquisition(ch, |acq| acq.gain_change(delta))
    }

    /// Divides the preamplifier gain by `delta`.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn gain_calibrate(&mut self, ch: usize, delta: f64) -> Result<(), DXPDriverError> {
        self.acquisition(ch, |acq| acq.gain_calibrate(delta))
    }

    /// Downloads firmware of `kind` to the channel.
    ///
    /// A new DSP program loses its parameters, so the parameter defaults and the acquisition
    /// values are applied again.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn download_firmware(&mut self, ch: usize, kind: &str) -> Result<(), DXPDriverError> {
        if self.run_active(ch)? {
            self.stop_run()?;
        }
        self.with_channel(ch, |channel, io, ctx| channel.download_firmware(io, ctx, kind))?;
        if kind == "dsp" {
            self.apply_param_defaults(ch)?;
            self.user_setup(ch)?;
        }
        Ok(())
    }

    /// Reads the DSP parameter `name`.
    pub fn get_parameter(&mut self, ch: usize, name: &str) -> Result<u16, DXPDriverError> {
        self.dsp(ch, |dsp| dsp.read_param(name))
    }

    /// Writes the DSP parameter `name`.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn set_parameter(
        &mut self,
        ch: usize,
        name: &str,
        value: u16,
    ) -> Result<WriteOutcome, DXPDriverError> {
        self.dsp(ch, |dsp| dsp.write_param(name, value))
    }

    /// Number of DSP parameters of the loaded program.
    pub fn get_num_params(&self, ch: usize) -> Result<usize, DXPDriverError> {
        Ok(self.channel(ch)?.require_symbols()?.len())
    }

    /// Name of the DSP parameter at `index`.
    pub fn get_param_name(&mut self, ch: usize, index: usize) -> Result<String, DXPDriverError> {
        self.dsp(ch, |dsp| dsp.param_name(index).map(str::to_owned))
    }

    /// Parameter table `name` of the loaded program.
    pub fn get_param_data(&mut self, ch: usize, name: &str) -> Result<ParamData, DXPDriverError> {
        self.dsp(ch, |dsp| dsp.param_data(name))
    }

    /// Closes the controller.
    pub fn close(mut self) -> Result<(), DXPDriverError> {
        self.close_impl()
    }

    fn close_impl(&mut self) -> Result<(), DXPDriverError> {
        if !self.link.is_open() {
            return Ok(());
        }
        let stopped = run::end_run(&mut RegisterIo::new(&mut self.link, self.option.max_block));
        self.channels
            .iter_mut()
            .for_each(|c| c.state_mut().stop_run());
        self.link.close()?;
        stopped
    }
}

impl<'a, L: Link> IntoIterator for &'a Controller<L> {
    type Item = &'a Channel;
    type IntoIter = std::slice::Iter<'a, Channel>;

    fn into_iter(self) -> Self::IntoIter {
        self.channels.iter()
    }
}

impl<'a, L: Link> IntoIterator for &'a mut Controller<L> {
    type Item = &'a mut Channel;
    type IntoIter = std::slice::IterMut<'a, Channel>;

    fn into_iter(self) -> Self::IntoIter {
        self.channels.iter_mut()
    }
}

impl<L: Link> Drop for Controller<L> {
    fn drop(&mut self) {
        if !self.link.is_open() {
            return;
        }
        let _ = self.close_impl();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use dxp_core::{defined::busy, link::LinkError, register::Register};
    use dxp_driver::{acquisition::Defaults, detector::Detector};
    use dxp_firmware_emulator::firmware;

    use crate::link::{Audit, AuditOption};

    use super::*;

    struct NoSleep;

    impl Sleeper for NoSleep {
        fn sleep(&self, _: std::time::Duration) {}
    }

    pub fn builder(num_channels: usize) -> anyhow::Result<ControllerBuilder> {
        Ok((0..num_channels).fold(
            ControllerBuilder::new(firmware::firmware_set()?, firmware::source())
                .with_param_defaults(firmware::PARAM_DEFAULTS)
                .with_sleeper(NoSleep),
            |b, _| b.add_channel(Detector::reset(1.0, 1, 50.0), Defaults::with_builtin()),
        ))
    }

    pub fn create_controller(num_channels: usize) -> anyhow::Result<Controller<Audit>> {
        Ok(builder(num_channels)?.open(Audit::new(AuditOption::default()))?)
    }

    #[test]
    fn open() -> anyhow::Result<()> {
        let cnt = create_controller(2)?;
        assert_eq!(2, cnt.len());
        assert!(cnt.link().is_open());
        assert!(cnt.link()[0].is_booted());
        assert!(cnt.link()[1].is_booted());
        assert!(!cnt.link()[2].is_booted());
        cnt.iter().for_each(|c| {
            assert_eq!(&Some(firmware::DSP.to_owned()), c.state().dsp_file());
            assert_eq!(&Some("fxpd05.fip".to_owned()), c.state().fippi_file());
        });
        assert_eq!(Some(5), cnt.link()[0].symbol("DECIMATION"));
        assert_eq!(Some(20), cnt.link()[0].symbol("SLOWLEN"));
        assert_eq!(Some(1), cnt.link()[1].symbol("POLARITY"));
        Ok(())
    }

    #[test]
    fn open_failed() -> anyhow::Result<()> {
        assert_eq!(
            Some(DXPDriverError::Link(LinkError::new("broken".to_owned()))),
            builder(1)?
                .open(Audit::new(AuditOption { broken: true }))
                .err()
        );
        Ok(())
    }

    #[test]
    fn open_too_many_channels() -> anyhow::Result<()> {
        assert_eq!(
            Some(DXPDriverError::InvalidChannel(4)),
            builder(5)?.open(Audit::new(AuditOption::default())).err()
        );
        Ok(())
    }

    #[test]
    fn open_incomplete_defaults() -> anyhow::Result<()> {
        let mut defaults = Defaults::with_builtin();
        defaults.remove("calibration_energy");
        let link = Audit::new(AuditOption::default());
        assert_eq!(
            Some(DXPDriverError::IncompleteDefaults("calibration_energy".to_string())),
            ControllerBuilder::new(firmware::firmware_set()?, firmware::source())
                .add_channel(Detector::default(), defaults)
                .open(link)
                .err()
        );
        Ok(())
    }

    #[test]
    fn invalid_channel() -> anyhow::Result<()> {
        let mut cnt = create_controller(1)?;
        assert_eq!(
            Err(DXPDriverError::InvalidChannel(1)),
            cnt.set_value(1, "gap_time", 1.0)
        );
        assert_eq!(
            Err(DXPDriverError::InvalidChannel(3)),
            cnt.get_value(3, "gap_time")
        );
        Ok(())
    }

    #[test]
    fn set_value_while_running() -> anyhow::Result<()> {
        let mut cnt = create_controller(2)?;
        cnt.start_run(false)?;
        assert!(cnt[1].state().acquiring());

        let achieved = cnt.set_value(1, "trigger_threshold", 2000.0)?;
        assert_eq!(Some(achieved), cnt[1].defaults().get("trigger_threshold"));
        assert!(cnt.run_active(1)?);
        assert!(cnt[0].state().acquiring());
        assert!(!cnt[0].state().erased());

        cnt.stop_run()?;
        assert!(!cnt.run_active(0)?);
        assert!(cnt.iter().all(|c| !c.state().acquiring()));
        Ok(())
    }

    #[test]
    fn run_start_timeout() -> anyhow::Result<()> {
        let mut cnt = create_controller(2)?;
        cnt.link_mut()[1].freeze_busy(Some(busy::IDLE));
        assert_eq!(Err(DXPDriverError::RunStartTimeout(1)), cnt.start_run(false));
        assert!(cnt.iter().all(|c| c.state().erased() && !c.state().acquiring()));
        Ok(())
    }

    #[test]
    fn parameters() -> anyhow::Result<()> {
        let mut cnt = create_controller(1)?;
        assert_eq!(90, cnt.get_num_params(0)?);
        assert_eq!("RUNTASKS", cnt.get_param_name(0, 0)?);
        assert_eq!(WriteOutcome::Written(42), cnt.set_parameter(0, "THRESHOLD", 42)?);
        assert_eq!(42, cnt.get_parameter(0, "THRESHOLD")?);
        assert!(matches!(cnt.get_param_data(0, "names")?, ParamData::Names(n) if n.len() == 90));
        Ok(())
    }

    #[test]
    fn download_fippi() -> anyhow::Result<()> {
        let mut cnt = create_controller(1)?;
        cnt.link_mut().clear_calls();
        cnt.download_firmware(0, "fippi")?;
        assert_ne!(0, cnt.link().count_calls(Register::Fippi));
        assert_eq!(&Some("fxpd05.fip".to_owned()), cnt[0].state().fippi_file());
        Ok(())
    }

    #[test]
    fn download_dsp_restores_values() -> anyhow::Result<()> {
        let mut cnt = create_controller(1)?;
        cnt.set_value(0, "peaking_time", 12.0)?;
        let slowlen = cnt.link()[0].symbol("SLOWLEN");
        cnt.download_firmware(0, "dsp")?;
        assert_eq!(slowlen, cnt.link()[0].symbol("SLOWLEN"));
        assert_eq!(Some(1638), cnt.link()[0].symbol("BLCUT"));
        Ok(())
    }

    #[test]
    fn close() -> anyhow::Result<()> {
        let mut cnt = create_controller(1)?;
        cnt.start_run(false)?;
        cnt.link_mut().break_down();
        assert_eq!(
            Err(DXPDriverError::Link(LinkError::new("broken".to_owned()))),
            cnt.stop_run()
        );
        cnt.link_mut().repair();
        cnt.close()?;
        Ok(())
    }
}
