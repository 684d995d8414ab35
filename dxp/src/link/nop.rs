use dxp_core::{
    link::{Link, LinkError},
    register::Register,
    symbol::SymbolTable,
};
use dxp_firmware_emulator::ModuleEmulator;

/// A [`Link`] to an emulated module.
///
/// This link is mainly used for explanation.
pub struct Nop {
    is_open: bool,
    module: ModuleEmulator,
}

impl Default for Nop {
    fn default() -> Self {
        Self::new()
    }
}

impl Nop {
    /// Creates a new [`Nop`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            is_open: false,
            module: ModuleEmulator::new(SymbolTable::default()),
        }
    }
}

impl Link for Nop {
    fn open(&mut self) -> Result<(), LinkError> {
        self.module =
            ModuleEmulator::with_bundled_firmware().map_err(|e| LinkError::new(e.to_string()))?;
        self.is_open = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), LinkError> {
        self.is_open = false;
        Ok(())
    }

    fn write(&mut self, reg: Register, data: &[u16]) -> Result<usize, LinkError> {
        Ok(self.module.write(reg, data))
    }

    fn read(&mut self, reg: Register, data: &mut [u16]) -> Result<usize, LinkError> {
        Ok(self.module.read(reg, data))
    }

    fn is_open(&self) -> bool {
        self.is_open
    }
}
