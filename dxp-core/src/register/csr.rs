use bitflags::bitflags;

bitflags! {
    /// Bits of the control/status register.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ControlStatus: u16 {
        /// Enable acquisition.
        const RUNENABLE  = 0x0008;
        /// Clear the MCA and statistics on run start.
        const RESETMCA   = 0x0010;
        /// Channel index, bit 0.
        const CHANNEL0   = 0x0040;
        /// Channel index, bit 1.
        const CHANNEL1   = 0x0080;
        /// Address every channel.
        const ALLCHAN    = 0x0100;
        /// Hold the DSP in reset for a program download.
        const DSPRESET   = 0x0200;
        /// Hold the FiPPI in reset for a configuration download.
        const FIPRESET   = 0x0400;
        /// Run regardless of the gate input.
        const IGNOREGATE = 0x0800;

        /// Every channel select bit.
        const CHANNEL_MASK = Self::CHANNEL0.bits() | Self::CHANNEL1.bits() | Self::ALLCHAN.bits();
    }
}
