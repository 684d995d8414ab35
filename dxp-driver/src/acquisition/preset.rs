use crate::error::DXPDriverError;

use super::Acquisition;

const PRESET_TICK_CYCLES: f64 = 16.0;
const LENGTH_TOLERANCE: f64 = 1e-6;

/// Condition that ends a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PresetType {
    /// Runs until stopped.
    Standard,
    /// Fixed real time.
    Runtime,
    /// Fixed live time.
    Livetime,
    /// Fixed number of output events.
    OutputEvents,
    /// Fixed number of input events.
    InputEvents,
}

impl PresetType {
    /// Parses an acquisition value name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "preset_standard" => Self::Standard,
            "preset_runtime" => Self::Runtime,
            "preset_livetime" => Self::Livetime,
            "preset_output" => Self::OutputEvents,
            "preset_input" => Self::InputEvents,
            _ => return None,
        })
    }

    /// Value of the `PRESET` DSP symbol.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::Standard => 0,
            Self::Runtime => 1,
            Self::Livetime => 2,
            Self::OutputEvents => 3,
            Self::InputEvents => 4,
        }
    }

    /// Checks if the preset length is a time.
    #[must_use]
    pub const fn is_time(self) -> bool {
        matches!(self, Self::Runtime | Self::Livetime)
    }
}

/// Length of one preset tick in \[s\]
#[must_use]
pub fn preset_tick(clock_mhz: f64) -> f64 {
    PRESET_TICK_CYCLES / (clock_mhz * 1e6)
}

pub(super) fn set_preset(
    acq: &mut Acquisition<'_>,
    preset: PresetType,
    value: f64,
) -> Result<f64, DXPDriverError> {
    let tick = preset_tick(acq.dsp.clock_mhz());
    let length = match preset {
        PresetType::Standard => 0.0,
        p if p.is_time() => (value / tick + LENGTH_TOLERANCE).floor(),
        _ => (value + LENGTH_TOLERANCE).floor(),
    };
    if !(0.0..=u32::MAX as f64).contains(&length) {
        return Err(DXPDriverError::PresetOutOfRange(value));
    }
    let length = length as u32;
    acq.dsp.write_param("PRESET", preset.code())?;
    acq.dsp.write_param("PRESETLEN0", (length >> 16) as u16)?;
    acq.dsp.write_param("PRESETLEN1", (length & 0xFFFF) as u16)?;
    Ok(match preset {
        PresetType::Standard => value,
        p if p.is_time() => length as f64 * tick,
        _ => length as f64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::tests::Fixture;

    #[rstest::rstest]
    #[case(Some(PresetType::Standard), "preset_standard")]
    #[case(Some(PresetType::Runtime), "preset_runtime")]
    #[case(Some(PresetType::Livetime), "preset_livetime")]
    #[case(Some(PresetType::OutputEvents), "preset_output")]
    #[case(Some(PresetType::InputEvents), "preset_input")]
    #[case(None, "preset_realtime")]
    fn from_name(#[case] expect: Option<PresetType>, #[case] name: &str) {
        assert_eq!(expect, PresetType::from_name(name));
    }

    #[test]
    fn tick() {
        approx::assert_abs_diff_eq!(4e-7, preset_tick(40.0), epsilon = 1e-15);
    }

    #[rstest::rstest]
    #[case(2, 0x002F, 0x17AA, 1.2345, "preset_livetime", 1.2345)]
    #[case(1, 0x0098, 0x9680, 4.0, "preset_runtime", 4.0)]
    #[case(3, 0x0001, 0x0000, 65536.0, "preset_output", 65536.7)]
    #[case(4, 0x0000, 0x03E8, 1000.0, "preset_input", 1000.0)]
    #[case(0, 0x0000, 0x0000, 7.0, "preset_standard", 7.0)]
    fn preset(
        #[case] code: u16,
        #[case] hi: u16,
        #[case] lo: u16,
        #[case] expect: f64,
        #[case] name: &str,
        #[case] value: f64,
    ) -> anyhow::Result<()> {
        let mut fx = Fixture::new()?;
        let achieved = fx.with(|acq| acq.set_value(name, value))?;
        assert_eq!(Some(code), fx.symbol("PRESET"));
        assert_eq!(Some(hi), fx.symbol("PRESETLEN0"));
        assert_eq!(Some(lo), fx.symbol("PRESETLEN1"));
        approx::assert_abs_diff_eq!(expect, achieved, epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn livetime_is_stable() -> anyhow::Result<()> {
        let mut fx = Fixture::new()?;
        let first = fx.with(|acq| acq.set_value("preset_livetime", 0.3))?;
        let words = (fx.symbol("PRESETLEN0"), fx.symbol("PRESETLEN1"));
        let second = fx.with(|acq| acq.set_value("preset_livetime", first))?;
        assert_eq!(words, (fx.symbol("PRESETLEN0"), fx.symbol("PRESETLEN1")));
        assert_eq!(first, second);
        Ok(())
    }

    #[rstest::rstest]
    #[case(-1.0)]
    #[case(2000.0)]
    fn out_of_range(#[case] value: f64) -> anyhow::Result<()> {
        let mut fx = Fixture::new()?;
        fx.bus.module.clear_calls();
        assert_eq!(
            Err(DXPDriverError::PresetOutOfRange(value)),
            fx.with(|acq| acq.set_value("preset_runtime", value))
        );
        assert!(!fx.channel.defaults().contains("preset_runtime"));
        Ok(())
    }
}
