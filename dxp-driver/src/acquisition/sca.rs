use crate::{channel::ScaWindow, error::DXPDriverError};

use super::{registry::ScaBound, Acquisition};

pub(super) fn number_of_scas(acq: &mut Acquisition<'_>, value: f64) -> Result<f64, DXPDriverError> {
    let count = value.round();
    if count.is_nan() || count < 0.0 {
        return Err(DXPDriverError::InvalidValue {
            name: "number_of_scas".to_string(),
            value,
        });
    }
    let max = acq.dsp.read_param("MAXSCA")? as usize;
    if count > max as f64 {
        return Err(DXPDriverError::ScaOutOfRange {
            index: count as usize,
            count: max,
        });
    }
    let count = acq.dsp.write_value("NUMSCA", count)? as usize;
    *acq.state.sca_mut() = vec![ScaWindow::default(); count];
    Ok(count as f64)
}

pub(super) fn sca_bound(
    acq: &mut Acquisition<'_>,
    index: usize,
    bound: ScaBound,
    value: f64,
) -> Result<f64, DXPDriverError> {
    let count = acq.state.sca().len();
    let window = *acq
        .state
        .sca()
        .get(index)
        .ok_or(DXPDriverError::ScaOutOfRange { index, count })?;
    let bin = value.round();
    let (lo, hi, other) = match bound {
        ScaBound::Lo => (bin, window.hi as f64, window.hi),
        ScaBound::Hi => (window.lo as f64, bin, window.lo),
    };
    if other != 0 && lo > hi {
        return Err(DXPDriverError::BinMismatch { lo, hi });
    }
    let name = match bound {
        ScaBound::Lo => format!("SCA{index}LO"),
        ScaBound::Hi => format!("SCA{index}HI"),
    };
    let written = acq.dsp.write_value(&name, bin)?;
    let window = &mut acq.state.sca_mut()[index];
    match bound {
        ScaBound::Lo => window.lo = written,
        ScaBound::Hi => window.hi = written,
    }
    Ok(written as f64)
}
