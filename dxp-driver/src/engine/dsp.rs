use std::time::Duration;

use dxp_core::{
    defined::DATA_MEMORY_OFFSET,
    register::ChannelSelect,
    sleep::Sleeper,
    symbol::{Symbol, SymbolTable, WriteOutcome},
};

use crate::{error::DXPDriverError, option::DriverOption};

use super::RegisterIo;

/// Named access to the parameter memory of one DSP.
pub struct Dsp<'a> {
    io: RegisterIo<'a>,
    symbols: &'a SymbolTable,
    channel: u8,
    option: &'a DriverOption,
    sleeper: &'a dyn Sleeper,
}

impl<'a> Dsp<'a> {
    /// Creates a new [`Dsp`].
    pub fn new(
        io: RegisterIo<'a>,
        symbols: &'a SymbolTable,
        channel: u8,
        option: &'a DriverOption,
        sleeper: &'a dyn Sleeper,
    ) -> Self {
        Self {
            io,
            symbols,
            channel,
            option,
            sleeper,
        }
    }

    /// Channel index of the DSP.
    #[must_use]
    pub const fn channel(&self) -> u8 {
        self.channel
    }

    /// Bus selection of the DSP.
    #[must_use]
    pub const fn select(&self) -> ChannelSelect {
        ChannelSelect::Single(self.channel)
    }

    /// Symbol table of the loaded program.
    #[must_use]
    pub const fn symbols(&self) -> &'a SymbolTable {
        self.symbols
    }

    /// Driver configuration.
    #[must_use]
    pub const fn option(&self) -> &'a DriverOption {
        self.option
    }

    /// Register I/O of the module.
    pub fn io(&mut self) -> &mut RegisterIo<'a> {
        &mut self.io
    }

    pub(crate) fn sleep(&self, duration: Duration) {
        self.sleeper.sleep(duration);
    }

    /// Resolves `name` in the loaded symbol table.
    pub fn locate(&self, name: &str) -> Result<&'a Symbol, DXPDriverError> {
        self.symbols
            .locate(name)
            .ok_or_else(|| DXPDriverError::UnknownSymbol(name.to_string()))
    }

    /// Reads the word behind `name`.
    pub fn read_param(&mut self, name: &str) -> Result<u16, DXPDriverError> {
        let symbol = self.locate(name)?;
        if !symbol.access().readable() {
            return Err(DXPDriverError::SymbolAccess {
                name: name.to_string(),
                access: symbol.access(),
            });
        }
        let value = self.io.read_word(self.select(), symbol.address())?;
        tracing::debug!("channel {}: {} = {}", self.channel, name, value);
        Ok(value)
    }

    /// Reads `name` as a number.
    ///
    /// Counters wider than a word are split into `NAME0` (high word) and `NAME1` (low word), with
    /// an optional `NAME2` holding bits 32 to 47.
    pub fn read_symbol(&mut self, name: &str) -> Result<f64, DXPDriverError> {
        if self.symbols.contains(name) {
            return self.read_param(name).map(f64::from);
        }
        let hi_name = format!("{name}0");
        let lo_name = format!("{name}1");
        if !(self.symbols.contains(&hi_name) && self.symbols.contains(&lo_name)) {
            return Err(DXPDriverError::UnknownSymbol(name.to_string()));
        }
        let hi = self.read_param(&hi_name)? as f64;
        let lo = self.read_param(&lo_name)? as f64;
        let top_name = format!("{name}2");
        let top = if self.symbols.contains(&top_name) {
            self.read_param(&top_name)? as f64
        } else {
            0.0
        };
        Ok(top * 4294967296.0 + hi * 65536.0 + lo)
    }

    /// Writes `value` to `name`.
    ///
    /// A write outside the declared bounds is clamped and reported in the returned
    /// [`WriteOutcome`]. A write to a read-only symbol issues no bus traffic and fails.
    pub fn write_param(&mut self, name: &str, value: u16) -> Result<WriteOutcome, DXPDriverError> {
        let symbol = self.locate(name)?;
        let outcome = symbol.validate(value);
        match outcome {
            WriteOutcome::Rejected(access) => {
                return Err(DXPDriverError::SymbolAccess {
                    name: name.to_string(),
                    access,
                })
            }
            WriteOutcome::Clamped { requested, value } => {
                tracing::warn!(
                    "channel {}: {} = {} is out of bounds, {} is written",
                    self.channel,
                    name,
                    requested,
                    value
                );
            }
            WriteOutcome::Written(_) => {}
        }
        if let Some(v) = outcome.value() {
            tracing::debug!("channel {}: {} <- {}", self.channel, name, v);
            self.io.write_word(self.select(), symbol.address(), v)?;
        }
        Ok(outcome)
    }

    /// Rounds `value` to a word and writes it to `name`, returning the word written.
    pub fn write_value(&mut self, name: &str, value: f64) -> Result<u16, DXPDriverError> {
        let word = value.round();
        if !(0.0..=u16::MAX as f64).contains(&word) {
            return Err(DXPDriverError::WordOutOfRange {
                name: name.to_string(),
                value,
            });
        }
        Ok(self.write_param(name, word as u16)?.value().unwrap_or(word as u16))
    }

    /// Reads `data.len()` words of DSP memory at `addr`.
    pub fn read_memory(&mut self, addr: u16, data: &mut [u16]) -> Result<(), DXPDriverError> {
        let sel = self.select();
        self.io.read_block(sel, addr, data)
    }

    /// Writes `data` to DSP memory at `addr`.
    pub fn write_memory(&mut self, addr: u16, data: &[u16]) -> Result<(), DXPDriverError> {
        let sel = self.select();
        self.io.write_block(sel, addr, data)
    }

    /// Reads `len` words of parameter memory starting at the index stored in `start`.
    pub fn read_buffer(&mut self, start: &str, len: usize) -> Result<Vec<u16>, DXPDriverError> {
        let offset = self.read_param(start)?;
        let mut data = vec![0; len];
        self.read_memory(DATA_MEMORY_OFFSET.wrapping_add(offset), &mut data)?;
        Ok(data)
    }

    /// Clock speed of the DSP in \[MHz\]
    pub fn clock_mhz(&mut self) -> f64 {
        match self.read_param("SYSMICROSEC") {
            Ok(v) if v > 0 => v as f64,
            _ => {
                tracing::warn!(
                    "channel {}: cannot read SYSMICROSEC, using {} MHz",
                    self.channel,
                    self.option.default_clock_mhz
                );
                self.option.default_clock_mhz
            }
        }
    }

    /// Length of one slow filter tick in \[µs\]
    pub fn filter_tick(&mut self) -> Result<f64, DXPDriverError> {
        let clock = self.clock_mhz();
        let decimation = self.read_param("DECIMATION")?;
        Ok(2f64.powi(decimation as i32) / clock)
    }
}
