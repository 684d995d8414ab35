mod csr;
mod gsr;

pub use csr::ControlStatus;
pub use gsr::GlobalStatus;

use derive_more::Display;

/// Registers addressable on the module bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Register {
    /// Transfer start address.
    #[display("TSAR")]
    Tsar,
    /// Control and status.
    #[display("CSR")]
    Csr,
    /// Channel select.
    #[display("GCR")]
    Gcr,
    /// Global status.
    #[display("GSR")]
    Gsr,
    /// DSP data port.
    #[display("DATA")]
    Data,
    /// FiPPI configuration port.
    #[display("FIPPI")]
    Fippi,
}

/// Target of a register transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelSelect {
    /// A single channel of the module.
    Single(u8),
    /// Every channel of the module at once.
    All,
}

impl ChannelSelect {
    /// The CSR/GCR bits addressing this target.
    #[must_use]
    pub const fn bits(self) -> ControlStatus {
        match self {
            ChannelSelect::Single(ch) => ControlStatus::from_bits_retain(((ch as u16) & 0x03) << 6),
            ChannelSelect::All => ControlStatus::ALLCHAN,
        }
    }

    /// Checks if `channel` is addressed.
    #[must_use]
    pub const fn contains(self, channel: u8) -> bool {
        match self {
            ChannelSelect::Single(ch) => ch == channel,
            ChannelSelect::All => true,
        }
    }

    /// Decodes the select bits of a CSR/GCR word.
    #[must_use]
    pub const fn from_bits(bits: u16) -> Self {
        if bits & ControlStatus::ALLCHAN.bits() != 0 {
            ChannelSelect::All
        } else {
            ChannelSelect::Single(((bits >> 6) & 0x03) as u8)
        }
    }
}
