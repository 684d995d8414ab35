use std::time::Duration;

use dxp_core::{
    firmware::FirmwareSource,
    link::{Link, LinkError},
    register::Register,
    sleep::Sleeper,
    symbol::SymbolTable,
};
use dxp_firmware_emulator::{firmware, ModuleEmulator};

pub(crate) struct NoSleep;

impl Sleeper for NoSleep {
    fn sleep(&self, _: Duration) {}
}

pub(crate) struct Bus {
    pub module: ModuleEmulator,
    pub is_open: bool,
}

impl Bus {
    pub fn booted() -> anyhow::Result<Self> {
        let image = firmware::source().dsp(firmware::DSP)?;
        let mut module = ModuleEmulator::new(image.symbols().clone());
        module.write(Register::Csr, &[0x0300]);
        module.write(Register::Gcr, &[0x0100]);
        module.write(Register::Tsar, &[1]);
        module.write(Register::Data, &image.program()[2..]);
        module.write(Register::Tsar, &[0]);
        module.write(Register::Data, &image.program()[..2]);
        module.clear_calls();
        Ok(Self {
            module,
            is_open: true,
        })
    }
}

impl Link for Bus {
    fn open(&mut self) -> Result<(), LinkError> {
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

pub(crate) fn symbols() -> anyhow::Result<SymbolTable> {
    Ok(firmware::source().dsp(firmware::DSP)?.into_symbols())
}

