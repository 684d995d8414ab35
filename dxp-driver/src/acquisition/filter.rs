use dxp_core::firmware::SelectedFirmware;

use crate::error::DXPDriverError;

use super::Acquisition;

const MIN_LENGTH: f64 = 2.0;
const MAX_LENGTH: f64 = 28.0;
const MIN_SLOW_GAP: f64 = 3.0;
const MAX_GAP: f64 = 29.0;
const MAX_FILTER: f64 = 31.0;

const TICK_TOLERANCE: f64 = 1e-9;

/// Rounds up, ignoring the representation error of a quotient that is an exact tick count.
pub(super) fn ceil_ticks(x: f64) -> f64 {
    (x - TICK_TOLERANCE).ceil()
}

fn ensure_positive(name: &str, value: f64) -> Result<(), DXPDriverError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(DXPDriverError::InvalidValue {
            name: name.to_string(),
            value,
        })
    }
}

fn offset_names(selected: &SelectedFirmware) -> [String; 2] {
    match selected.ptrr {
        Some(n) => [format!("peakint_offset_ptrr{n}"), format!("peaksam_offset_ptrr{n}")],
        None => ["peakint_offset".to_owned(), "peaksam_offset".to_owned()],
    }
}

fn filter_offsets(acq: &Acquisition<'_>, selected: &SelectedFirmware) -> (f64, f64) {
    let [peakint, peaksam] = offset_names(selected);
    (
        acq.defaults
            .get(&peakint)
            .unwrap_or(selected.record.filter.peakint_offset),
        acq.defaults
            .get(&peaksam)
            .unwrap_or(selected.record.filter.peaksam_offset),
    )
}

/// Programs the slow filter for `peaking_time` and `gap_time`.
///
/// Every range check happens before the first write.
pub(super) fn update_filter(
    acq: &mut Acquisition<'_>,
    peaking_time: f64,
    gap_time: f64,
) -> Result<(), DXPDriverError> {
    let tick = acq.dsp.filter_tick()?;

    let slowlen = (peaking_time / tick).round();
    if !(MIN_LENGTH..=MAX_LENGTH).contains(&slowlen) {
        return Err(DXPDriverError::SlowLengthOutOfRange(slowlen));
    }
    let slowgap = ceil_ticks(gap_time / tick);
    if slowgap > MAX_GAP {
        return Err(DXPDriverError::SlowGapOutOfRange(slowgap));
    }
    let slowgap = slowgap.max(MIN_SLOW_GAP);
    if slowlen + slowgap > MAX_FILTER {
        return Err(DXPDriverError::FilterSumOutOfRange {
            length: slowlen,
            gap: slowgap,
        });
    }

    let selected = acq.ctx.firmware.select(peaking_time)?;
    let (peakint_offset, peaksam_offset) = filter_offsets(acq, &selected);
    let peakint = slowlen + slowgap + peakint_offset;
    let peaksam = peakint - peaksam_offset;
    tracing::debug!(
        "channel {}: SLOWLEN = {}, SLOWGAP = {}, PEAKINT = {}, PEAKSAM = {}",
        acq.channel(),
        slowlen,
        slowgap,
        peakint,
        peaksam
    );

    acq.dsp.write_value("SLOWLEN", slowlen)?;
    acq.dsp.write_value("SLOWGAP", slowgap)?;
    acq.dsp.write_value("PEAKINT", peakint)?;
    acq.dsp.write_value("PEAKSAM", peaksam)?;
    Ok(())
}

/// Downloads `name` to the FiPPI unless it is already loaded.
pub(super) fn load_fippi(acq: &mut Acquisition<'_>, name: &str) -> Result<(), DXPDriverError> {
    if acq.state.fippi_file().as_deref() == Some(name) {
        tracing::debug!("channel {}: {} is already loaded", acq.channel(), name);
        return Ok(());
    }
    let image = acq.ctx.source.fippi(name)?;
    acq.state.set_fippi_file(None);
    acq.dsp.download_fippi(image.data())?;
    acq.state.set_fippi_file(Some(name.to_owned()));
    Ok(())
}

pub(super) fn peaking_time(
    acq: &mut Acquisition<'_>,
    peaking_time: f64,
) -> Result<f64, DXPDriverError> {
    ensure_positive("peaking_time", peaking_time)?;
    let selected = acq.ctx.firmware.select(peaking_time)?;
    load_fippi(acq, &selected.record.fippi)?;

    let gap_time = acq.defaults.require("gap_time")?;
    update_filter(acq, peaking_time, gap_time)?;

    let tick = acq.dsp.filter_tick()?;
    Ok(acq.dsp.read_param("SLOWLEN")? as f64 * tick)
}

pub(super) fn gap_time(acq: &mut Acquisition<'_>, gap_time: f64) -> Result<f64, DXPDriverError> {
    ensure_positive("gap_time", gap_time)?;
    let peaking_time = acq.defaults.require("peaking_time")?;
    update_filter(acq, peaking_time, gap_time)?;

    let tick = acq.dsp.filter_tick()?;
    Ok(acq.dsp.read_param("SLOWGAP")? as f64 * tick)
}

/// Stores a filter offset override and reprograms the slow filter.
pub(super) fn filter_offset(
    acq: &mut Acquisition<'_>,
    name: &str,
    value: f64,
) -> Result<f64, DXPDriverError> {
    let previous = acq.defaults.get(name);
    acq.defaults.store(name, value);
    let peaking_time = acq.defaults.require("peaking_time")?;
    let gap_time = acq.defaults.require("gap_time")?;
    if let Err(e) = update_filter(acq, peaking_time, gap_time) {
        match previous {
            Some(v) => acq.defaults.store(name, v),
            None => {
                acq.defaults.remove(name);
            }
        }
        return Err(e);
    }
    Ok(value)
}

fn update_trigger_filter(
    acq: &mut Acquisition<'_>,
    peaking_time: f64,
    gap_time: f64,
) -> Result<(f64, f64), DXPDriverError> {
    let clock = acq.dsp.clock_mhz();

    let fastlen = (peaking_time * clock).round();
    if !(MIN_LENGTH..=MAX_LENGTH).contains(&fastlen) {
        return Err(DXPDriverError::FastLengthOutOfRange(fastlen));
    }
    let fastgap = ceil_ticks(gap_time * clock).max(0.0);
    if fastgap > MAX_GAP {
        return Err(DXPDriverError::FastGapOutOfRange(fastgap));
    }
    if fastlen + fastgap > MAX_FILTER {
        return Err(DXPDriverError::FilterSumOutOfRange {
            length: fastlen,
            gap: fastgap,
        });
    }

    acq.dsp.write_value("FASTLEN", fastlen)?;
    acq.dsp.write_value("FASTGAP", fastgap)?;
    Ok((fastlen / clock, fastgap / clock))
}

pub(super) fn trigger_peaking_time(
    acq: &mut Acquisition<'_>,
    peaking_time: f64,
) -> Result<f64, DXPDriverError> {
    ensure_positive("trigger_peaking_time", peaking_time)?;
    let gap_time = acq.defaults.require("trigger_gap_time")?;
    let (peaking_time, gap_time) = update_trigger_filter(acq, peaking_time, gap_time)?;
    acq.defaults.store("trigger_gap_time", gap_time);
    Ok(peaking_time)
}

pub(super) fn trigger_gap_time(
    acq: &mut Acquisition<'_>,
    gap_time: f64,
) -> Result<f64, DXPDriverError> {
    ensure_positive("trigger_gap_time", gap_time)?;
    let peaking_time = acq.defaults.require("trigger_peaking_time")?;
    let (peaking_time, gap_time) = update_trigger_filter(acq, peaking_time, gap_time)?;
    acq.defaults.store("trigger_peaking_time", peaking_time);
    Ok(gap_time)
}
