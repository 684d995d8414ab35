mod baseline;
mod board;
mod defaults;
mod detector;
mod filter;
mod gain;
mod mca;
mod params;
mod preset;
/// Acquisition value registry.
pub mod registry;
mod run_data;
mod sca;
mod special;
mod threshold;

pub use defaults::Defaults;
pub use gain::{system_gain, GainInputs, GainStep, GAIN_DB_MAX, GAIN_DB_MIN, GAIN_PIPELINE};
pub use params::ParamData;
pub use preset::PresetType;
pub use run_data::RunData;

use dxp_core::{
    defined::NUM_BITS_ADC,
    firmware::{FirmwareSet, FirmwareSource},
    sleep::Sleeper,
};

use crate::{
    channel::ChannelState, detector::Detector, engine::Dsp, error::DXPDriverError,
    option::DriverOption,
};

use registry::{ValueKind, ACQUISITION_VALUES};

/// Module wide collaborators shared by every channel.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    /// Driver configuration.
    pub option: &'a DriverOption,
    /// Sleep strategy of the poll loops.
    pub sleeper: &'a dyn Sleeper,
    /// Firmware variants.
    pub firmware: &'a FirmwareSet,
    /// Firmware file source.
    pub source: &'a dyn FirmwareSource,
}

/// Translates acquisition values of one channel to DSP parameters.
pub struct Acquisition<'a> {
    dsp: Dsp<'a>,
    defaults: &'a mut Defaults,
    detector: &'a mut Detector,
    state: &'a mut ChannelState,
    ctx: Context<'a>,
}

/// eV per ADC count for an ADC percent rule and a calibration energy in \[eV\]
#[must_use]
pub fn ev_per_adc(adc_percent_rule: f64, calibration_energy: f64) -> f64 {
    calibration_energy / ((adc_percent_rule / 100.0) * NUM_BITS_ADC)
}

impl<'a> Acquisition<'a> {
    pub(crate) fn new(
        dsp: Dsp<'a>,
        defaults: &'a mut Defaults,
        detector: &'a mut Detector,
        state: &'a mut ChannelState,
        ctx: Context<'a>,
    ) -> Self {
        Self {
            dsp,
            defaults,
            detector,
            state,
            ctx,
        }
    }

    /// Named access to the DSP.
    pub fn dsp(&mut self) -> &mut Dsp<'a> {
        &mut self.dsp
    }

    /// Current acquisition values.
    #[must_use]
    pub fn defaults(&self) -> &Defaults {
        self.defaults
    }

    /// The attached detector.
    #[must_use]
    pub fn detector(&self) -> &Detector {
        self.detector
    }

    /// Host side bookkeeping of the channel.
    #[must_use]
    pub fn state(&self) -> &ChannelState {
        self.state
    }

    fn channel(&self) -> u8 {
        self.dsp.channel()
    }

    fn ev_per_adc(&self) -> Result<f64, DXPDriverError> {
        Ok(ev_per_adc(
            self.defaults.require("adc_percent_rule")?,
            self.defaults.require("calibration_energy")?,
        ))
    }

    fn use_gate(&self) -> bool {
        self.defaults.get("enable_gate").is_some_and(|v| v != 0.0)
    }

    /// Applies `value` to `name` and stores the achieved value.
    ///
    /// Names outside the registry and its dynamic families are written directly as DSP symbols
    /// when they are uppercase. On failure the stored value of `name` is left as it was.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn set_value(&mut self, name: &str, value: f64) -> Result<f64, DXPDriverError> {
        let kind = registry::resolve(name)
            .ok_or_else(|| DXPDriverError::UnknownValue(name.to_string()))?;
        let achieved = match kind {
            ValueKind::Fixed(entry) => (entry.setter)(self, value)?,
            ValueKind::Preset(preset) => preset::set_preset(self, preset, value)?,
            ValueKind::FilterOffset => filter::filter_offset(self, name, value)?,
            ValueKind::NumberOfScas => sca::number_of_scas(self, value)?,
            ValueKind::Sca { index, bound } => sca::sca_bound(self, index, bound, value)?,
            ValueKind::Raw => self.dsp.write_value(name, value)? as f64,
        };
        tracing::debug!("channel {}: {} = {} (requested {})", self.channel(), name, achieved, value);
        self.defaults.store(name, achieved);
        Ok(achieved)
    }

    /// The stored value of `name`.
    pub fn get_value(&self, name: &str) -> Result<f64, DXPDriverError> {
        self.defaults
            .get(name)
            .ok_or_else(|| DXPDriverError::UnknownValue(name.to_string()))
    }

    /// Copies every synchronized value from the detector into the defaults.
    pub fn synchronize(&mut self) {
        ACQUISITION_VALUES.iter().for_each(|entry| {
            if let Some(v) = entry.synchronize(self.detector) {
                self.defaults.store(entry.name, v);
            }
        });
    }

    /// Applies every stored registry value in registry order, then programs the slow filter for
    /// the current peaking time.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn user_setup(&mut self) -> Result<(), DXPDriverError> {
        self.synchronize();
        ACQUISITION_VALUES.iter().try_for_each(|entry| {
            match self.defaults.get(entry.name) {
                Some(v) => self.set_value(entry.name, v).map(|_| ()),
                None => Ok(()),
            }
        })?;
        let peaking_time = self.defaults.require("peaking_time")?;
        let gap_time = self.defaults.require("gap_time")?;
        filter::update_filter(self, peaking_time, gap_time)
    }

    /// Downloads the FiPPI configuration for the current peaking time unless it is loaded.
    pub fn load_fippi(&mut self) -> Result<(), DXPDriverError> {
        let peaking_time = self.defaults.require("peaking_time")?;
        let selected = self.ctx.firmware.select(peaking_time)?;
        filter::load_fippi(self, &selected.record.fippi)
    }

    /// Scales `adc_percent_rule` by `delta`.
    ///
    /// If the cascade fails the previous percent rule is applied again.
    pub fn gain_change(&mut self, delta: f64) -> Result<(), DXPDriverError> {
        let previous = self.defaults.require("adc_percent_rule")?;
        match self.set_value("adc_percent_rule", previous * delta) {
            Ok(_) => Ok(()),
            Err(e) => {
                if let Err(restore) = self.set_value("adc_percent_rule", previous) {
                    tracing::warn!(
                        "channel {}: cannot restore adc_percent_rule = {}: {}",
                        self.channel(),
                        previous,
                        restore
                    );
                }
                Err(e)
            }
        }
    }

    /// Divides the preamplifier gain by `delta` and reprograms `GAINDAC`.
    pub fn gain_calibrate(&mut self, delta: f64) -> Result<(), DXPDriverError> {
        gain::calibrate(self, delta)
    }
}
