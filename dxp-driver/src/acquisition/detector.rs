use crate::{
    detector::{Detector, PreampType},
    error::DXPDriverError,
};

use super::Acquisition;

const RESET_TICKS_PER_US: f64 = 4.0;
const FRACTION_SCALE: f64 = 65536.0;

pub(super) fn gain_of(detector: &Detector) -> Option<f64> {
    Some(detector.gain)
}

pub(super) fn polarity_of(detector: &Detector) -> Option<f64> {
    Some(detector.polarity as f64)
}

pub(super) fn reset_delay(acq: &mut Acquisition<'_>, delay: f64) -> Result<f64, DXPDriverError> {
    if acq.detector.preamp != PreampType::Reset {
        return Ok(delay);
    }
    let written = acq.dsp.write_value("RESETINT", delay * RESET_TICKS_PER_US)?;
    let achieved = written as f64 / RESET_TICKS_PER_US;
    acq.detector.type_value = achieved;
    Ok(achieved)
}

pub(super) fn decay_time(acq: &mut Acquisition<'_>, decay: f64) -> Result<f64, DXPDriverError> {
    if acq.detector.preamp != PreampType::RcFeedback {
        return Ok(decay);
    }
    if !(decay.is_finite() && decay >= 0.0) {
        return Err(DXPDriverError::InvalidValue {
            name: "decay_time".to_string(),
            value: decay,
        });
    }
    let mut whole = decay.floor();
    let mut fraction = ((decay - whole) * FRACTION_SCALE).round();
    if fraction >= FRACTION_SCALE {
        whole += 1.0;
        fraction = 0.0;
    }
    let whole = acq.dsp.write_value("RCTAU", whole)?;
    let fraction = acq.dsp.write_value("RCTAUFRAC", fraction)?;
    let achieved = whole as f64 + fraction as f64 / FRACTION_SCALE;
    acq.detector.type_value = achieved;
    Ok(achieved)
}

pub(super) fn polarity(acq: &mut Acquisition<'_>, polarity: f64) -> Result<f64, DXPDriverError> {
    let written = acq.dsp.write_value("POLARITY", polarity)?;
    let use_gate = acq.use_gate();
    acq.dsp.quick_run(use_gate)?;
    acq.detector.polarity = written;
    Ok(written as f64)
}
