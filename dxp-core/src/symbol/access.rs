use derive_more::Display;

/// Access mode of a [`Symbol`].
///
/// [`Symbol`]: super::Symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Access {
    /// Written only by the DSP.
    #[display("read-only")]
    ReadOnly,
    /// Read only by the DSP.
    #[display("write-only")]
    WriteOnly,
    /// Shared by host and DSP.
    #[display("read-write")]
    ReadWrite,
}

impl Access {
    /// Parses the access token of a symbol table line.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        match token {
            "-" => Access::ReadOnly,
            "w" | "W" => Access::WriteOnly,
            _ => Access::ReadWrite,
        }
    }

    /// Numeric access code reported to callers.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Access::ReadOnly => 0,
            Access::ReadWrite => 1,
            Access::WriteOnly => 2,
        }
    }

    /// Checks if the host may read the symbol.
    #[must_use]
    pub const fn readable(self) -> bool {
        !matches!(self, Access::WriteOnly)
    }

    /// Checks if the host may write the symbol.
    #[must_use]
    pub const fn writable(self) -> bool {
        !matches!(self, Access::ReadOnly)
    }
}

/// Result of validating a symbol write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The value is written as requested.
    Written(u16),
    /// The value was outside the declared bounds and is written clamped.
    Clamped {
        /// Requested value.
        requested: u16,
        /// Value written.
        value: u16,
    },
    /// The symbol cannot be written.
    Rejected(Access),
}

impl WriteOutcome {
    /// The value that reaches the DSP, if any.
    #[must_use]
    pub const fn value(self) -> Option<u16> {
        match self {
            WriteOutcome::Written(v) | WriteOutcome::Clamped { value: v, .. } => Some(v),
            WriteOutcome::Rejected(_) => None,
        }
    }
}
