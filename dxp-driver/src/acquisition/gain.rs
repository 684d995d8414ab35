use dxp_core::defined::ev_to_kev;

use crate::error::DXPDriverError;

use super::{ev_per_adc, Acquisition};

/// Lowest gain the variable gain amplifier can realize in \[dB\]
pub const GAIN_DB_MIN: f64 = -6.0;
/// Highest gain the variable gain amplifier can realize in \[dB\]
pub const GAIN_DB_MAX: f64 = 30.0;

const INPUT_RANGE_MV: f64 = 1000.0;
const GAINDAC_OFFSET_DB: f64 = 10.0;
const GAINDAC_SPAN_DB: f64 = 40.0;
const GAINDAC_RANGE: f64 = 65536.0;

/// Fixed gain of the analog front end.
#[must_use]
pub fn system_gain(gain_scale: f64) -> f64 {
    1.0 * (3240.0 / 499.0)
        * (124.9 / 498.9)
        * 1.0
        * (422.0 / 613.0)
        * 2.0
        * (250.0 / 350.0)
        * gain_scale
}

/// Everything the `GAINDAC` computation depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainInputs {
    /// ADC percent rule in \[%\]
    pub adc_percent_rule: f64,
    /// Calibration energy in \[eV\]
    pub calibration_energy: f64,
    /// Preamplifier gain in \[mV/keV\]
    pub preamp_gain: f64,
    /// MCA bin width in \[eV\]
    pub mca_bin_width: f64,
    /// Slow filter length in ticks.
    pub slowlen: f64,
    /// Scale applied to the system gain.
    pub gain_scale: f64,
}

impl GainInputs {
    /// eV per ADC count.
    #[must_use]
    pub fn ev_per_adc(&self) -> f64 {
        ev_per_adc(self.adc_percent_rule, self.calibration_energy)
    }

    /// Required gain of the variable gain amplifier in \[dB\]
    ///
    /// The desired total gain is corrected by the rounding of `BINFACT1`.
    #[must_use]
    pub fn gain_db(&self) -> f64 {
        let total = (self.adc_percent_rule / 100.0 * INPUT_RANGE_MV)
            / (ev_to_kev(self.calibration_energy) * self.preamp_gain);
        let binfact = (self.mca_bin_width / self.ev_per_adc()) * self.slowlen * 4.0;
        let correction = if binfact > 0.0 {
            (binfact + 0.5).floor() / binfact
        } else {
            1.0
        };
        20.0 * (total * correction / system_gain(self.gain_scale)).log10()
    }

    /// `GAINDAC` word for the required gain.
    pub fn gaindac(&self) -> Result<u16, DXPDriverError> {
        let db = self.gain_db();
        if !(GAIN_DB_MIN..=GAIN_DB_MAX).contains(&db) {
            return Err(DXPDriverError::GainOutOfRange(db));
        }
        let dac = ((db + GAINDAC_OFFSET_DB) * GAINDAC_RANGE / GAINDAC_SPAN_DB).round();
        Ok(dac.min(u16::MAX as f64) as u16)
    }
}

/// A step of the gain cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GainStep {
    /// Compute and write `GAINDAC`.
    ApplyGain,
    /// Re-derive the trigger threshold in eV from `THRESHOLD`.
    TriggerThreshold,
    /// Re-derive the energy threshold in eV from `SLOWTHRESH`.
    EnergyThreshold,
    /// Re-apply the MCA bin width.
    BinWidth,
}

/// Order of the steps run when a gain input changes.
///
/// The thresholds are re-derived with the eV per ADC count from before the change, so the
/// physical thresholds survive. The gain is applied again at the end to follow the rounding of
/// `BINFACT1`.
pub const GAIN_PIPELINE: [GainStep; 5] = [
    GainStep::ApplyGain,
    GainStep::TriggerThreshold,
    GainStep::EnergyThreshold,
    GainStep::BinWidth,
    GainStep::ApplyGain,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GainInput {
    AdcPercentRule,
    CalibrationEnergy,
    PreampGain,
}

impl GainInput {
    const fn name(self) -> &'static str {
        match self {
            GainInput::AdcPercentRule => "adc_percent_rule",
            GainInput::CalibrationEnergy => "calibration_energy",
            GainInput::PreampGain => "preamp_gain",
        }
    }
}

impl Acquisition<'_> {
    fn gain_inputs(&mut self) -> Result<GainInputs, DXPDriverError> {
        Ok(GainInputs {
            adc_percent_rule: self.defaults.require("adc_percent_rule")?,
            calibration_energy: self.defaults.require("calibration_energy")?,
            preamp_gain: self.detector.gain,
            mca_bin_width: self.defaults.require("mca_bin_width")?,
            slowlen: self.dsp.read_param("SLOWLEN")? as f64,
            gain_scale: self.ctx.option.gain_scale,
        })
    }

    fn gain_input(&self, input: GainInput) -> Result<f64, DXPDriverError> {
        match input {
            GainInput::PreampGain => Ok(self.detector.gain),
            _ => self.defaults.require(input.name()),
        }
    }

    fn commit_gain_input(&mut self, input: GainInput, value: f64) {
        if input == GainInput::PreampGain {
            self.detector.gain = value;
        }
        self.defaults.store(input.name(), value);
    }

    fn rederive_threshold(
        &mut self,
        name: &str,
        register: &str,
        length: &str,
        previous_ev_per_adc: f64,
    ) -> Result<(), DXPDriverError> {
        let threshold = self.dsp.read_param(register)? as f64;
        let length = self.dsp.read_param(length)? as f64;
        let energy = if length > 0.0 {
            threshold * previous_ev_per_adc / length
        } else {
            0.0
        };
        self.set_value(name, energy).map(|_| ())
    }

    fn gain_step(
        &mut self,
        step: GainStep,
        input: GainInput,
        value: f64,
        previous_ev_per_adc: f64,
    ) -> Result<(), DXPDriverError> {
        tracing::trace!("channel {}: gain step {:?}", self.channel(), step);
        match step {
            GainStep::ApplyGain => {
                let mut inputs = self.gain_inputs()?;
                match input {
                    GainInput::AdcPercentRule => inputs.adc_percent_rule = value,
                    GainInput::CalibrationEnergy => inputs.calibration_energy = value,
                    GainInput::PreampGain => inputs.preamp_gain = value,
                }
                let gaindac = inputs.gaindac()?;
                self.dsp.write_param("GAINDAC", gaindac)?;
                self.commit_gain_input(input, value);
                Ok(())
            }
            GainStep::TriggerThreshold => {
                self.rederive_threshold("trigger_threshold", "THRESHOLD", "FASTLEN", previous_ev_per_adc)
            }
            GainStep::EnergyThreshold => {
                self.rederive_threshold("energy_threshold", "SLOWTHRESH", "SLOWLEN", previous_ev_per_adc)
            }
            GainStep::BinWidth => {
                let bin_width = self.defaults.require("mca_bin_width")?;
                self.set_value("mca_bin_width", bin_width).map(|_| ())
            }
        }
    }

    fn gain_cascade(&mut self, input: GainInput, value: f64) -> Result<f64, DXPDriverError> {
        if !(value.is_finite() && value > 0.0) {
            return Err(DXPDriverError::InvalidValue {
                name: input.name().to_string(),
                value,
            });
        }
        let previous = self.gain_input(input)?;
        let previous_ev_per_adc = self.ev_per_adc()?;
        GAIN_PIPELINE
            .iter()
            .try_for_each(|&step| self.gain_step(step, input, value, previous_ev_per_adc))
            .inspect_err(|_| self.commit_gain_input(input, previous))?;
        Ok(value)
    }
}

pub(super) fn adc_percent_rule(
    acq: &mut Acquisition<'_>,
    value: f64,
) -> Result<f64, DXPDriverError> {
    acq.gain_cascade(GainInput::AdcPercentRule, value)
}

pub(super) fn calibration_energy(
    acq: &mut Acquisition<'_>,
    value: f64,
) -> Result<f64, DXPDriverError> {
    acq.gain_cascade(GainInput::CalibrationEnergy, value)
}

pub(super) fn preamp_gain(acq: &mut Acquisition<'_>, value: f64) -> Result<f64, DXPDriverError> {
    acq.gain_cascade(GainInput::PreampGain, value)
}

pub(super) fn calibrate(acq: &mut Acquisition<'_>, delta: f64) -> Result<(), DXPDriverError> {
    if !(delta.is_finite() && delta > 0.0) {
        return Err(DXPDriverError::InvalidValue {
            name: "gain_calibrate".to_string(),
            value: delta,
        });
    }
    let preamp_gain = acq.detector.gain / delta;
    let mut inputs = acq.gain_inputs()?;
    inputs.preamp_gain = preamp_gain;
    let gaindac = inputs.gaindac()?;
    acq.dsp.write_param("GAINDAC", gaindac)?;
    acq.commit_gain_input(GainInput::PreampGain, preamp_gain);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::tests::Fixture;

    fn inputs(preamp_gain: f64) -> GainInputs {
        GainInputs {
            adc_percent_rule: 5.0,
            calibration_energy: 5900.0,
            preamp_gain,
            mca_bin_width: 20.0,
            slowlen: 20.0,
            gain_scale: 1.0,
        }
    }

    #[test]
    fn system() {
        approx::assert_abs_diff_eq!(1.598628, system_gain(1.0), epsilon = 1e-6);
        approx::assert_abs_diff_eq!(2.0 * system_gain(1.0), system_gain(2.0), epsilon = 1e-12);
    }

    #[rstest::rstest]
    #[case(14.5592, 1.0)]
    #[case(8.5386, 2.0)]
    fn gain_db(#[case] expect: f64, #[case] preamp_gain: f64) {
        approx::assert_abs_diff_eq!(expect, inputs(preamp_gain).gain_db(), epsilon = 1e-3);
    }

    #[test]
    fn gaindac() -> anyhow::Result<()> {
        let db = inputs(1.0).gain_db();
        assert_eq!(((db + 10.0) * 65536.0 / 40.0).round() as u16, inputs(1.0).gaindac()?);
        assert!(inputs(2.0).gaindac()? < inputs(1.0).gaindac()?);
        Ok(())
    }

    #[rstest::rstest]
    #[case(0.1)]
    #[case(100.0)]
    #[case(0.0)]
    fn gain_out_of_range(#[case] preamp_gain: f64) {
        assert!(matches!(
            inputs(preamp_gain).gaindac(),
            Err(DXPDriverError::GainOutOfRange(_))
        ));
    }

    #[test]
    fn pipeline_shape() {
        assert_eq!(Some(&GainStep::ApplyGain), GAIN_PIPELINE.first());
        assert_eq!(Some(&GainStep::ApplyGain), GAIN_PIPELINE.last());
        assert_eq!(2, GAIN_PIPELINE.iter().filter(|&&s| s == GainStep::ApplyGain).count());
    }

    #[test]
    fn cascade_keeps_thresholds() -> anyhow::Result<()> {
        let mut fx = Fixture::new()?;
        fx.with(|acq| acq.user_setup())?;
        let trigger = fx.channel.defaults().require("trigger_threshold")?;
        assert_eq!(Some(69), fx.symbol("THRESHOLD"));

        fx.with(|acq| acq.set_value("adc_percent_rule", 10.0))?;
        assert_eq!(Some(138), fx.symbol("THRESHOLD"));
        approx::assert_abs_diff_eq!(
            trigger,
            fx.channel.defaults().require("trigger_threshold")?,
            epsilon = 1.0
        );

        fx.with(|acq| acq.set_value("calibration_energy", 11800.0))?;
        assert_eq!(Some(69), fx.symbol("THRESHOLD"));
        Ok(())
    }

    #[test]
    fn preamp_gain_out_of_range() -> anyhow::Result<()> {
        let mut fx = Fixture::new()?;
        fx.with(|acq| acq.user_setup())?;
        let gaindac = fx.symbol("GAINDAC");

        assert!(matches!(
            fx.with(|acq| acq.set_value("preamp_gain", 0.1)),
            Err(DXPDriverError::GainOutOfRange(_))
        ));
        assert_eq!(gaindac, fx.symbol("GAINDAC"));
        assert_eq!(1.0, fx.channel.detector().gain);
        assert_eq!(Some(1.0), fx.channel.defaults().get("preamp_gain"));

        fx.with(|acq| acq.set_value("preamp_gain", 2.0))?;
        assert_eq!(2.0, fx.channel.detector().gain);
        assert!(fx.symbol("GAINDAC") < gaindac);
        Ok(())
    }

    #[rstest::rstest]
    #[case("adc_percent_rule", 0.0)]
    #[case("calibration_energy", -5900.0)]
    #[case("preamp_gain", f64::NAN)]
    fn invalid_input(#[case] name: &str, #[case] value: f64) -> anyhow::Result<()> {
        let mut fx = Fixture::new()?;
        assert!(matches!(
            fx.with(|acq| acq.set_value(name, value)),
            Err(DXPDriverError::InvalidValue { .. })
        ));
        Ok(())
    }

    #[test]
    fn calibrate() -> anyhow::Result<()> {
        let mut fx = Fixture::new()?;
        fx.with(|acq| acq.user_setup())?;
        let gaindac = fx.symbol("GAINDAC");

        fx.with(|acq| acq.gain_calibrate(2.0))?;
        assert_eq!(0.5, fx.channel.detector().gain);
        assert_eq!(Some(0.5), fx.channel.defaults().get("preamp_gain"));
        assert!(fx.symbol("GAINDAC") > gaindac);
        Ok(())
    }
}
