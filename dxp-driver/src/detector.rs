use derive_more::Display;

/// Preamplifier type of a detector channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PreampType {
    /// Reset preamplifier.
    #[display("reset")]
    Reset,
    /// RC feedback preamplifier.
    #[display("rc_feedback")]
    RcFeedback,
    /// Unknown preamplifier.
    #[default]
    #[display("unknown")]
    Unknown,
}

/// Description of the detector attached to a channel.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Detector {
    /// Preamplifier type.
    pub preamp: PreampType,
    /// Preamplifier gain in \[mV/keV\]
    pub gain: f64,
    /// Signal polarity, `1` for positive.
    pub polarity: u16,
    /// Reset delay for reset preamplifiers, decay time for RC feedback preamplifiers, in \[µs\]
    pub type_value: f64,
}

impl Detector {
    /// A detector with a reset preamplifier.
    #[must_use]
    pub const fn reset(gain: f64, polarity: u16, reset_delay: f64) -> Self {
        Self {
            preamp: PreampType::Reset,
            gain,
            polarity,
            type_value: reset_delay,
        }
    }

    /// A detector with an RC feedback preamplifier.
    #[must_use]
    pub const fn rc_feedback(gain: f64, polarity: u16, decay_time: f64) -> Self {
        Self {
            preamp: PreampType::RcFeedback,
            gain,
            polarity,
            type_value: decay_time,
        }
    }

    /// Reset delay, if the preamplifier is a reset type.
    #[must_use]
    pub fn reset_delay(&self) -> Option<f64> {
        (self.preamp == PreampType::Reset).then_some(self.type_value)
    }

    /// Decay time, if the preamplifier is an RC feedback type.
    #[must_use]
    pub fn decay_time(&self) -> Option<f64> {
        (self.preamp == PreampType::RcFeedback).then_some(self.type_value)
    }
}

impl Default for Detector {
    fn default() -> Self {
        Self::reset(2.0, 1, 50.0)
    }
}
