use thiserror::Error;

/// An error produced while reading firmware images, symbol tables or parameter files.
#[derive(Error, Debug, PartialEq, Clone)]
#[non_exhaustive]
pub enum ParseError {
    /// A file could not be read.
    #[error("Failed to read {path}: {msg}")]
    Io {
        /// Path of the file.
        path: String,
        /// Message of the underlying I/O error.
        msg: String,
    },
    /// The symbol count line is missing.
    #[error("Symbol count is missing")]
    MissingSymbolCount,
    /// The symbol count line is not a number.
    #[error("Invalid symbol count ({0})")]
    InvalidSymbolCount(String),
    /// Fewer symbol lines than announced.
    #[error("Expected {expected} symbols, but found {found}")]
    SymbolCountMismatch {
        /// Announced number of symbols.
        expected: usize,
        /// Number of symbol lines found.
        found: usize,
    },
    /// A symbol line cannot be parsed.
    #[error("Malformed symbol at line {line}: {text}")]
    MalformedSymbol {
        /// 1-based line number.
        line: usize,
        /// The offending text.
        text: String,
    },
    /// A symbol declares a lower bound without an upper bound.
    #[error("Symbol {name} at line {line} declares only one bound")]
    MissingBound {
        /// 1-based line number.
        line: usize,
        /// Name of the symbol.
        name: String,
    },
    /// The same symbol name appears twice.
    #[error("Duplicate symbol {0}")]
    DuplicateSymbol(String),
    /// Program image contains a non-hexadecimal group.
    #[error("Invalid hexadecimal data at line {line}")]
    InvalidHex {
        /// 1-based line number.
        line: usize,
    },
    /// A parameter defaults line cannot be parsed.
    #[error("Invalid parameter default at line {line}: {text}")]
    InvalidDefault {
        /// 1-based line number.
        line: usize,
        /// The offending text.
        text: String,
    },
    /// A firmware record has `min > max`.
    #[error("Invalid peaking time range ([{min}, {max}])")]
    InvalidRange {
        /// Lower peaking time in \[µs\]
        min: f64,
        /// Upper peaking time in \[µs\]
        max: f64,
    },
    /// Two firmware records share a peaking time.
    #[error("Peaking time ranges [{0}, {1}] and [{2}, {3}] overlap")]
    OverlappingRanges(f64, f64, f64, f64),
    /// No firmware record covers the peaking time.
    #[error("No firmware covers peaking time {0} µs")]
    NoFirmware(f64),
    /// A firmware source does not know the image.
    #[error("Unknown firmware image ({0})")]
    UnknownImage(String),
}

impl ParseError {
    pub(crate) fn io(path: &std::path::Path, e: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            msg: e.to_string(),
        }
    }
}
