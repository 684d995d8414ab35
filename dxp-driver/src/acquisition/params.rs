use dxp_core::{defined::DATA_MEMORY_OFFSET, symbol::Symbol};

use crate::{engine::Dsp, error::DXPDriverError};

/// Parameter table data of the loaded DSP program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamData {
    /// Symbol names in program order.
    Names(Vec<String>),
    /// One word per symbol in program order.
    Words(Vec<u16>),
}

impl Dsp<'_> {
    /// Number of symbols of the loaded program.
    #[must_use]
    pub fn num_params(&self) -> usize {
        self.symbols().len()
    }

    /// Name of the symbol at `index`.
    pub fn param_name(&self, index: usize) -> Result<&str, DXPDriverError> {
        self.symbols()
            .get(index)
            .map(|s| s.name().as_str())
            .ok_or_else(|| DXPDriverError::UnknownSymbol(format!("#{index}")))
    }

    /// Reads the table `name` of the symbol table.
    ///
    /// `values` reads the whole parameter memory in one block, so write-only symbols report
    /// whatever the DSP holds.
    pub fn param_data(&mut self, name: &str) -> Result<ParamData, DXPDriverError> {
        let symbols = self.symbols();
        let words = |f: fn(&Symbol) -> u16| -> Vec<u16> { symbols.iter().map(f).collect() };
        Ok(match name {
            "names" => ParamData::Names(symbols.iter().map(|s| s.name().clone()).collect()),
            "values" => {
                let len = symbols.iter().map(|s| s.index() as usize + 1).max().unwrap_or(0);
                let mut memory = vec![0; len];
                self.read_memory(DATA_MEMORY_OFFSET, &mut memory)?;
                ParamData::Words(symbols.iter().map(|s| memory[s.index() as usize]).collect())
            }
            "access" => ParamData::Words(words(|s| s.access().code())),
            "lower_bounds" => ParamData::Words(words(|s| s.bounds().map_or(0, |b| b.0))),
            "upper_bounds" => ParamData::Words(words(|s| s.bounds().map_or(0, |b| b.1))),
            _ => return Err(DXPDriverError::UnknownParamData(name.to_string())),
        })
    }
}
