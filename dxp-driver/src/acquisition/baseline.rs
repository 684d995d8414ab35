use dxp_core::defined::runtasks;

use crate::error::DXPDriverError;

use super::Acquisition;

const BASELINE_SCALE: f64 = 32768.0;
const MIN_FILTER_LENGTH: f64 = 2.0;

pub(super) fn enable_baseline_cut(
    acq: &mut Acquisition<'_>,
    enable: f64,
) -> Result<f64, DXPDriverError> {
    let tasks = acq.dsp.read_param("RUNTASKS")?;
    let tasks = if enable != 0.0 {
        tasks | runtasks::BASELINE_CUT
    } else {
        tasks & !runtasks::BASELINE_CUT
    };
    acq.dsp.write_param("RUNTASKS", tasks)?;
    Ok(if enable != 0.0 { 1.0 } else { 0.0 })
}

pub(super) fn baseline_cut(acq: &mut Acquisition<'_>, percent: f64) -> Result<f64, DXPDriverError> {
    let blcut = (BASELINE_SCALE * percent / 100.0).round();
    if !(0.0..=u16::MAX as f64).contains(&blcut) {
        return Err(DXPDriverError::BaselineOutOfRange(percent));
    }
    let written = acq.dsp.write_value("BLCUT", blcut)?;
    Ok(written as f64 * 100.0 / BASELINE_SCALE)
}

pub(super) fn baseline_filter_length(
    acq: &mut Acquisition<'_>,
    length: f64,
) -> Result<f64, DXPDriverError> {
    if !(MIN_FILTER_LENGTH..=BASELINE_SCALE).contains(&length) {
        return Err(DXPDriverError::BaselineOutOfRange(length));
    }
    let written = acq.dsp.write_value("BLFILTER", BASELINE_SCALE / length)?;
    Ok(BASELINE_SCALE / written as f64)
}
