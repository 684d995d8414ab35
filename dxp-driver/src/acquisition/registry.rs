use crate::{detector::Detector, error::DXPDriverError};

use super::{baseline, detector, filter, gain, mca, threshold, Acquisition, PresetType};

type Setter = fn(&mut Acquisition<'_>, f64) -> Result<f64, DXPDriverError>;
type Synchronizer = fn(&Detector) -> Option<f64>;

/// An entry of the acquisition value registry.
#[derive(Clone, Copy)]
pub struct AcquisitionValue {
    /// Name of the value.
    pub name: &'static str,
    /// Built-in default, `None` for values without a default.
    pub default: Option<f64>,
    pub(crate) setter: Setter,
    pub(crate) synchronizer: Option<Synchronizer>,
}

impl AcquisitionValue {
    /// Checks if the value must be present in the defaults before the first run.
    #[must_use]
    pub const fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Checks if the value mirrors a field of the [`Detector`].
    #[must_use]
    pub const fn is_synchronized(&self) -> bool {
        self.synchronizer.is_some()
    }

    /// Current detector value, for synchronized values.
    #[must_use]
    pub fn synchronize(&self, detector: &Detector) -> Option<f64> {
        self.synchronizer.and_then(|f| f(detector))
    }
}

impl std::fmt::Debug for AcquisitionValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcquisitionValue")
            .field("name", &self.name)
            .field("default", &self.default)
            .field("synchronized", &self.is_synchronized())
            .finish()
    }
}

const fn value(name: &'static str, default: f64, setter: Setter) -> AcquisitionValue {
    AcquisitionValue {
        name,
        default: Some(default),
        setter,
        synchronizer: None,
    }
}

const fn synchronized(
    name: &'static str,
    setter: Setter,
    synchronizer: Synchronizer,
) -> AcquisitionValue {
    AcquisitionValue {
        name,
        default: None,
        setter,
        synchronizer: Some(synchronizer),
    }
}

/// Every named acquisition value, in the order they are applied at setup.
pub static ACQUISITION_VALUES: [AcquisitionValue; 19] = [
    value("peaking_time", 16.0, filter::peaking_time),
    value("trigger_threshold", 1000.0, threshold::trigger_threshold),
    value("mca_bin_width", 20.0, mca::bin_width),
    value("number_mca_channels", 4096.0, mca::number_of_bins),
    value("mca_low_limit", 0.0, mca::low_limit),
    value("energy_threshold", 0.0, threshold::energy_threshold),
    value("adc_percent_rule", 5.0, gain::adc_percent_rule),
    value("calibration_energy", 5900.0, gain::calibration_energy),
    value("gap_time", 0.150, filter::gap_time),
    value("trigger_peaking_time", 0.200, filter::trigger_peaking_time),
    value("trigger_gap_time", 0.0, filter::trigger_gap_time),
    value("enable_gate", 0.0, enable_gate),
    value("enable_baseline_cut", 1.0, baseline::enable_baseline_cut),
    value("baseline_cut", 5.0, baseline::baseline_cut),
    value("baseline_filter_length", 256.0, baseline::baseline_filter_length),
    synchronized("reset_delay", detector::reset_delay, Detector::reset_delay),
    synchronized("decay_time", detector::decay_time, Detector::decay_time),
    synchronized("preamp_gain", gain::preamp_gain, detector::gain_of),
    synchronized("detector_polarity", detector::polarity, detector::polarity_of),
];

fn enable_gate(_: &mut Acquisition<'_>, value: f64) -> Result<f64, DXPDriverError> {
    Ok(value)
}

/// Finds a fixed registry entry.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static AcquisitionValue> {
    ACQUISITION_VALUES.iter().find(|v| v.name == name)
}

/// Bound of an SCA window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaBound {
    /// Lower bin.
    Lo,
    /// Upper bin.
    Hi,
}

/// How an acquisition value name is handled.
#[derive(Debug, Clone, Copy)]
pub enum ValueKind {
    /// A fixed registry entry.
    Fixed(&'static AcquisitionValue),
    /// A run preset.
    Preset(PresetType),
    /// A filter offset override.
    FilterOffset,
    /// The number of SCAs.
    NumberOfScas,
    /// One bound of an SCA window.
    Sca {
        /// SCA index.
        index: usize,
        /// The bound.
        bound: ScaBound,
    },
    /// A DSP symbol written directly.
    Raw,
}

fn parse_sca(name: &str) -> Option<(usize, ScaBound)> {
    let rest = name.strip_prefix("sca")?;
    let (index, bound) = if let Some(index) = rest.strip_suffix("_lo") {
        (index, ScaBound::Lo)
    } else {
        (rest.strip_suffix("_hi")?, ScaBound::Hi)
    };
    if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    index.parse().ok().map(|i| (i, bound))
}

/// Checks if `name` is a DSP symbol name: uppercase letters and digits with at least one letter.
#[must_use]
pub fn is_raw_symbol(name: &str) -> bool {
    name.bytes().any(|b| b.is_ascii_uppercase())
        && name.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

/// Resolves `name` against the registry and the dynamic value families.
#[must_use]
pub fn resolve(name: &str) -> Option<ValueKind> {
    if let Some(entry) = lookup(name) {
        return Some(ValueKind::Fixed(entry));
    }
    if let Some(preset) = PresetType::from_name(name) {
        return Some(ValueKind::Preset(preset));
    }
    if name.starts_with("peakint_offset") || name.starts_with("peaksam_offset") {
        return Some(ValueKind::FilterOffset);
    }
    if name == "number_of_scas" {
        return Some(ValueKind::NumberOfScas);
    }
    if let Some((index, bound)) = parse_sca(name) {
        return Some(ValueKind::Sca { index, bound });
    }
    is_raw_symbol(name).then_some(ValueKind::Raw)
}

/// Checks if `name` may be removed from the defaults.
#[must_use]
pub fn can_remove_name(name: &str) -> bool {
    !lookup(name).is_some_and(|v| v.has_default())
}
