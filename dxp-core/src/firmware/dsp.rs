use getset::Getters;

use crate::{error::ParseError, symbol::SymbolTable};

use super::{content_lines, trim_hex};

/// A DSP program with its symbol table.
#[derive(Debug, Clone, PartialEq, Getters)]
#[getset(get = "pub")]
pub struct DspImage {
    /// Identifying name of the image.
    filename: String,
    /// Parameter symbols.
    symbols: SymbolTable,
    /// Program words.
    program: Vec<u16>,
}

impl DspImage {
    /// Creates an image from already parsed parts.
    #[must_use]
    pub fn new(filename: impl Into<String>, symbols: SymbolTable, program: Vec<u16>) -> Self {
        Self {
            filename: filename.into(),
            symbols,
            program,
        }
    }

    /// Parses a DSP file.
    ///
    /// The symbol section is followed by the program as hexadecimal text. Every six digits encode
    /// one 24-bit instruction as a 16-bit high word and an 8-bit low word.
    pub fn parse(filename: impl Into<String>, text: &str) -> Result<Self, ParseError> {
        let mut lines = content_lines(text);
        let symbols = SymbolTable::parse(&mut lines)?;

        let mut program = Vec::new();
        for (line, text) in lines {
            let hex = trim_hex(text);
            if hex.len() % 6 != 0 {
                return Err(ParseError::InvalidHex { line });
            }
            for group in hex.as_bytes().chunks(6) {
                let invalid = |_: std::num::ParseIntError| ParseError::InvalidHex { line };
                let group =
                    std::str::from_utf8(group).map_err(|_| ParseError::InvalidHex { line })?;
                let hi = u16::from_str_radix(&group[..4], 16).map_err(invalid)?;
                let lo = u16::from_str_radix(&group[4..], 16).map_err(invalid)?;
                program.push(hi);
                program.push(lo);
            }
        }

        Ok(Self::new(filename, symbols, program))
    }

    /// Consumes the image and returns its symbol table.
    #[must_use]
    pub fn into_symbols(self) -> SymbolTable {
        self.symbols
    }
}
