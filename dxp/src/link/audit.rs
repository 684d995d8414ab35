use dxp_core::{
    link::{Link, LinkError},
    register::Register,
    symbol::SymbolTable,
};
use dxp_firmware_emulator::ModuleEmulator;

use derive_more::{Deref, DerefMut};

#[derive(Default, Clone, Copy)]
#[doc(hidden)]
pub struct AuditOption {
    pub broken: bool,
}

#[doc(hidden)]
#[derive(Deref, DerefMut)]
pub struct Audit {
    option: AuditOption,
    is_open: bool,
    #[deref]
    #[deref_mut]
    module: ModuleEmulator,
    broken: bool,
}

impl Audit {
    pub fn new(option: AuditOption) -> Self {
        Self {
            option,
            is_open: false,
            module: ModuleEmulator::new(SymbolTable::default()),
            broken: false,
        }
    }

    pub const fn break_down(&mut self) {
        self.broken = true;
    }

    pub const fn repair(&mut self) {
        self.broken = false;
    }

    fn ensure_not_broken(&self) -> Result<(), LinkError> {
        if self.broken {
            return Err(LinkError::new("broken".to_owned()));
        }
        Ok(())
    }
}

impl Link for Audit {
    fn open(&mut self) -> Result<(), LinkError> {
        self.module =
            ModuleEmulator::with_bundled_firmware().map_err(|e| LinkError::new(e.to_string()))?;
        self.broken = self.option.broken;
        self.is_open = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), LinkError> {
        self.is_open = false;
        Ok(())
    }

    fn write(&mut self, reg: Register, data: &[u16]) -> Result<usize, LinkError> {
        self.ensure_not_broken()?;
        Ok(self.module.write(reg, data))
    }

    fn read(&mut self, reg: Register, data: &mut [u16]) -> Result<usize, LinkError> {
        self.ensure_not_broken()?;
        Ok(self.module.read(reg, data))
    }

    fn is_open(&self) -> bool {
        self.is_open
    }
}
