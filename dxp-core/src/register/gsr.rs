use bitfield_struct::bitfield;

/// Global status register.
///
/// Run-active bits are set while the channel acquires.
/// FiPPI error bits are set when the last configuration download failed.
#[bitfield(u16)]
#[derive(PartialEq, Eq)]
pub struct GlobalStatus {
    /// One run-active bit per channel.
    #[bits(4)]
    pub run_active_bits: u8,
    #[bits(4)]
    __: u8,
    /// One FiPPI download error bit per channel.
    #[bits(4)]
    pub fippi_error_bits: u8,
    #[bits(4)]
    __: u8,
}

impl GlobalStatus {
    /// Checks if `channel` is running.
    #[must_use]
    pub const fn run_active(&self, channel: u8) -> bool {
        (self.run_active_bits() >> channel) & 0x01 != 0
    }

    /// Checks if the FiPPI configuration of `channel` loaded.
    #[must_use]
    pub const fn download_ok(&self, channel: u8) -> bool {
        (self.fippi_error_bits() >> channel) & 0x01 == 0
    }
}
