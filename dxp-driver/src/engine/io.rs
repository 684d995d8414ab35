use dxp_core::{
    link::Link,
    register::{ChannelSelect, Register},
};

use crate::error::DXPDriverError;

/// Word and block transfers over the module bus.
///
/// Every DSP memory access selects the channel in GCR, sets the start address in TSAR and then
/// streams words on DATA. Blocks are split into calls of at most `max_block` words; the first
/// failing call aborts the transfer and earlier chunks stay written.
pub struct RegisterIo<'a> {
    link: &'a mut dyn Link,
    max_block: usize,
}

impl<'a> RegisterIo<'a> {
    /// Creates a new [`RegisterIo`].
    pub fn new(link: &'a mut dyn Link, max_block: usize) -> Self {
        Self { link, max_block }
    }

    /// Borrows the same link for a shorter lifetime.
    pub fn reborrow(&mut self) -> RegisterIo<'_> {
        RegisterIo {
            link: &mut *self.link,
            max_block: self.max_block,
        }
    }

    fn ensure_is_open(&self) -> Result<(), DXPDriverError> {
        if self.link.is_open() {
            Ok(())
        } else {
            Err(DXPDriverError::LinkClosed)
        }
    }

    fn check(reg: Register, expected: usize, actual: usize) -> Result<(), DXPDriverError> {
        if expected == actual {
            Ok(())
        } else {
            Err(DXPDriverError::LengthMismatch {
                reg,
                expected,
                actual,
            })
        }
    }

    fn write_raw(&mut self, reg: Register, data: &[u16]) -> Result<(), DXPDriverError> {
        self.ensure_is_open()?;
        tracing::trace!("write {} words to {}", data.len(), reg);
        let n = self.link.write(reg, data)?;
        Self::check(reg, data.len(), n)
    }

    fn read_raw(&mut self, reg: Register, data: &mut [u16]) -> Result<(), DXPDriverError> {
        self.ensure_is_open()?;
        tracing::trace!("read {} words from {}", data.len(), reg);
        let n = self.link.read(reg, data)?;
        Self::check(reg, data.len(), n)
    }

    fn chunk_size(&self, len: usize) -> usize {
        if self.max_block == 0 {
            len.max(1)
        } else {
            self.max_block
        }
    }

    /// Reads a single register.
    pub fn read_register(&mut self, reg: Register) -> Result<u16, DXPDriverError> {
        let mut data = [0u16];
        self.read_raw(reg, &mut data)?;
        Ok(data[0])
    }

    /// Writes a single register.
    pub fn write_register(&mut self, reg: Register, value: u16) -> Result<(), DXPDriverError> {
        self.write_raw(reg, &[value])
    }

    fn frame(&mut self, sel: ChannelSelect, addr: u16) -> Result<(), DXPDriverError> {
        self.write_register(Register::Gcr, sel.bits().bits())?;
        self.write_register(Register::Tsar, addr)
    }

    /// Reads one word of DSP memory.
    pub fn read_word(&mut self, sel: ChannelSelect, addr: u16) -> Result<u16, DXPDriverError> {
        self.frame(sel, addr)?;
        self.read_register(Register::Data)
    }

    /// Writes one word of DSP memory.
    pub fn write_word(
        &mut self,
        sel: ChannelSelect,
        addr: u16,
        value: u16,
    ) -> Result<(), DXPDriverError> {
        self.frame(sel, addr)?;
        self.write_register(Register::Data, value)
    }

    /// Reads `data.len()` words of DSP memory starting at `addr`.
    pub fn read_block(
        &mut self,
        sel: ChannelSelect,
        addr: u16,
        data: &mut [u16],
    ) -> Result<(), DXPDriverError> {
        if data.is_empty() {
            return Ok(());
        }
        self.frame(sel, addr)?;
        let size = self.chunk_size(data.len());
        data.chunks_mut(size)
            .try_for_each(|chunk| self.read_raw(Register::Data, chunk))
    }

    /// Writes `data` to DSP memory starting at `addr`.
    pub fn write_block(
        &mut self,
        sel: ChannelSelect,
        addr: u16,
        data: &[u16],
    ) -> Result<(), DXPDriverError> {
        if data.is_empty() {
            return Ok(());
        }
        self.frame(sel, addr)?;
        self.write_stream(Register::Data, data)
    }

    /// Writes `data` to `reg` in chunks without address framing.
    pub fn write_stream(&mut self, reg: Register, data: &[u16]) -> Result<(), DXPDriverError> {
        let size = self.chunk_size(data.len());
        data.chunks(size)
            .try_for_each(|chunk| self.write_raw(reg, chunk))
    }
}
