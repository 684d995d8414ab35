//! Firmware images understood by the emulator.

use dxp_core::{
    firmware::{FilterInfo, FirmwareRecord, FirmwareSet, MemorySource},
    ParseError,
};

/// DSP program name.
pub const DSP: &str = "dxp4c2x.dsp";
/// DSP parameter defaults name.
pub const PARAM_DEFAULTS: &str = "dxp4c2x.itx";
/// FiPPI variants as `(name, decimation, min peaking time, max peaking time)`.
pub const FIPPI: [(&str, u16, f64, f64); 3] = [
    ("fxpd02.fip", 2, 0.25, 2.0),
    ("fxpd04.fip", 4, 2.05, 8.0),
    ("fxpd05.fip", 5, 8.05, 20.0),
];

const DSP_TEXT: &str = include_str!("../firmware/dxp4c2x.dsp");
const PARAM_DEFAULTS_TEXT: &str = include_str!("../firmware/dxp4c2x.itx");
const FIPPI_TEXT: [&str; 3] = [
    include_str!("../firmware/fxpd02.fip"),
    include_str!("../firmware/fxpd04.fip"),
    include_str!("../firmware/fxpd05.fip"),
];

/// A source holding every image.
#[must_use]
pub fn source() -> MemorySource {
    FIPPI.iter().zip(FIPPI_TEXT).fold(
        MemorySource::new()
            .with(DSP, DSP_TEXT)
            .with(PARAM_DEFAULTS, PARAM_DEFAULTS_TEXT),
        |source, (&(name, ..), text)| source.with(name, text),
    )
}

/// Filter constants of the FiPPI variant with `decimation`.
#[must_use]
pub const fn filter_info(decimation: u16) -> FilterInfo {
    match decimation {
        2 => FilterInfo {
            peakint_offset: 2.0,
            peaksam_offset: 5.0,
        },
        4 => FilterInfo {
            peakint_offset: 2.0,
            peaksam_offset: 3.0,
        },
        _ => FilterInfo {
            peakint_offset: 1.0,
            peaksam_offset: 2.0,
        },
    }
}

/// Peaking time records of the emulated module.
#[must_use]
pub fn records() -> Vec<FirmwareRecord> {
    FIPPI
        .iter()
        .map(|&(name, dec, min, max)| FirmwareRecord {
            min_peaking_time: min,
            max_peaking_time: max,
            dsp: DSP.to_owned(),
            fippi: name.to_owned(),
            filter: filter_info(dec),
        })
        .collect()
}

/// The firmware set of the emulated module.
#[must_use]
pub fn firmware_set() -> Result<FirmwareSet, ParseError> {
    FirmwareSet::new(records())
}

#[cfg(test)]
mod tests {
    use dxp_core::firmware::FirmwareSource;

    use super::*;

    #[test]
    fn images() -> anyhow::Result<()> {
        let source = source();
        let dsp = source.dsp(DSP)?;
        assert!(dsp.symbols().contains("GAINDAC"));
        assert!(!dsp.program().is_empty());
        FIPPI.iter().try_for_each(|&(name, dec, ..)| {
            assert_eq!(Some(&dec), source.fippi(name)?.data().first());
            anyhow::Ok(())
        })?;
        assert_eq!(4, source.param_defaults(PARAM_DEFAULTS)?.len());
        Ok(())
    }

    #[test]
    fn set() -> anyhow::Result<()> {
        let set = firmware_set()?;
        assert_eq!(3, set.records().len());
        Ok(())
    }
}
