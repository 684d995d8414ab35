use crate::error::DXPDriverError;

use super::Acquisition;

const MAX_TRIGGER_THRESHOLD: f64 = 255.0;

fn threshold_word(
    acq: &mut Acquisition<'_>,
    name: &str,
    length: &str,
    energy: f64,
) -> Result<(f64, f64), DXPDriverError> {
    if !(energy.is_finite() && energy >= 0.0) {
        return Err(DXPDriverError::InvalidValue {
            name: name.to_string(),
            value: energy,
        });
    }
    let ev_per_adc = acq.ev_per_adc()?;
    let length = acq.dsp.read_param(length)? as f64;
    Ok(((length * energy / ev_per_adc).round(), ev_per_adc / length.max(1.0)))
}

pub(super) fn trigger_threshold(
    acq: &mut Acquisition<'_>,
    energy: f64,
) -> Result<f64, DXPDriverError> {
    let (threshold, ev_per_word) = threshold_word(acq, "trigger_threshold", "FASTLEN", energy)?;
    if threshold > MAX_TRIGGER_THRESHOLD {
        return Err(DXPDriverError::ThresholdOutOfRange(threshold));
    }
    let written = acq.dsp.write_value("THRESHOLD", threshold)?;
    Ok(written as f64 * ev_per_word)
}

pub(super) fn energy_threshold(
    acq: &mut Acquisition<'_>,
    energy: f64,
) -> Result<f64, DXPDriverError> {
    let (threshold, ev_per_word) = threshold_word(acq, "energy_threshold", "SLOWLEN", energy)?;
    let written = acq.dsp.write_value("SLOWTHRESH", threshold)?;
    Ok(written as f64 * ev_per_word)
}
