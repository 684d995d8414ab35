mod access;
mod table;

pub use access::{Access, WriteOutcome};
pub use table::SymbolTable;

use getset::{CopyGetters, Getters};

use crate::defined::DATA_MEMORY_OFFSET;

/// A named word in DSP parameter memory.
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters)]
pub struct Symbol {
    #[getset(get = "pub")]
    /// Name of the symbol.
    name: String,
    #[getset(get_copy = "pub")]
    /// Index in parameter memory.
    index: u16,
    #[getset(get_copy = "pub")]
    /// Access mode.
    access: Access,
    #[getset(get_copy = "pub")]
    /// Inclusive `[lower, upper]` bound, if declared.
    bounds: Option<(u16, u16)>,
}

impl Symbol {
    /// Creates a new [`Symbol`].
    ///
    /// A `(0, 0)` bound pair means the symbol is unbounded.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        index: u16,
        access: Access,
        bounds: Option<(u16, u16)>,
    ) -> Self {
        Self {
            name: name.into(),
            index,
            access,
            bounds: bounds.filter(|&(lo, hi)| lo != 0 || hi != 0),
        }
    }

    /// Bus address of the symbol.
    #[must_use]
    pub const fn address(&self) -> u16 {
        DATA_MEMORY_OFFSET + self.index
    }

    /// Validates a write of `value` against the access mode and bounds.
    #[must_use]
    pub fn validate(&self, value: u16) -> WriteOutcome {
        if !self.access.writable() {
            return WriteOutcome::Rejected(self.access);
        }
        match self.bounds {
            Some((lo, hi)) if value < lo || value > hi => WriteOutcome::Clamped {
                requested: value,
                value: value.clamp(lo, hi.max(lo)),
            },
            _ => WriteOutcome::Written(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    #[case(WriteOutcome::Written(10), Access::ReadWrite, None, 10)]
    #[case(WriteOutcome::Written(10), Access::WriteOnly, Some((2, 28)), 10)]
    #[case(WriteOutcome::Clamped { requested: 30, value: 28 }, Access::ReadWrite, Some((2, 28)), 30)]
    #[case(WriteOutcome::Clamped { requested: 1, value: 2 }, Access::ReadWrite, Some((2, 28)), 1)]
    #[case(WriteOutcome::Written(0xFFFF), Access::ReadWrite, Some((0, 0)), 0xFFFF)]
    #[case(WriteOutcome::Clamped { requested: 300, value: 255 }, Access::ReadWrite, Some((0, 255)), 300)]
    #[case(WriteOutcome::Rejected(Access::ReadOnly), Access::ReadOnly, None, 1)]
    fn validate(
        #[case] expect: WriteOutcome,
        #[case] access: Access,
        #[case] bounds: Option<(u16, u16)>,
        #[case] value: u16,
    ) {
        assert_eq!(expect, Symbol::new("X", 0, access, bounds).validate(value));
    }

    #[test]
    fn address() {
        assert_eq!(0x4012, Symbol::new("X", 0x12, Access::ReadWrite, None).address());
    }

    #[test]
    fn zero_bounds_mean_unbounded() {
        assert_eq!(None, Symbol::new("X", 0, Access::ReadWrite, Some((0, 0))).bounds());
    }
}
