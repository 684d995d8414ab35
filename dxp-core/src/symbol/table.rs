use std::collections::HashMap;

use crate::error::ParseError;

use super::{Access, Symbol};

/// Symbols of one DSP program in program order.
///
/// Lookup is by exact, case-sensitive name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    index: HashMap<String, usize>,
}

impl SymbolTable {
    /// Creates a table from `symbols`, rejecting duplicated names.
    pub fn new(symbols: Vec<Symbol>) -> Result<Self, ParseError> {
        let mut index = HashMap::with_capacity(symbols.len());
        for (i, s) in symbols.iter().enumerate() {
            if index.insert(s.name().clone(), i).is_some() {
                return Err(ParseError::DuplicateSymbol(s.name().clone()));
            }
        }
        Ok(Self { symbols, index })
    }

    /// Parses the symbol section of a DSP file.
    ///
    /// `lines` yields `(line number, text)` with comments already removed. The first line holds the
    /// number of symbols, each following line `NAME [access] [lower upper]`. Symbols are assigned
    /// consecutive parameter memory indices.
    pub(crate) fn parse<'a>(
        lines: &mut impl Iterator<Item = (usize, &'a str)>,
    ) -> Result<Self, ParseError> {
        let (_, count) = lines.next().ok_or(ParseError::MissingSymbolCount)?;
        let count = count
            .trim()
            .parse::<usize>()
            .map_err(|_| ParseError::InvalidSymbolCount(count.trim().to_owned()))?;

        let symbols = (0..count)
            .map(|i| {
                let (line, text) = lines.next().ok_or(ParseError::SymbolCountMismatch {
                    expected: count,
                    found: i,
                })?;
                Self::parse_symbol(line, text, i)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(symbols)
    }

    fn parse_symbol(line: usize, text: &str, index: usize) -> Result<Symbol, ParseError> {
        let malformed = || ParseError::MalformedSymbol {
            line,
            text: text.to_owned(),
        };
        let index = u16::try_from(index).map_err(|_| malformed())?;
        let tokens = text.split_whitespace().collect::<Vec<_>>();
        let bound = |t: &str| t.parse::<u16>().map_err(|_| malformed());
        match tokens.as_slice() {
            [name] => Ok(Symbol::new(*name, index, Access::ReadWrite, None)),
            [name, access] => Ok(Symbol::new(*name, index, Access::from_token(access), None)),
            [name, _, _] => Err(ParseError::MissingBound {
                line,
                name: (*name).to_owned(),
            }),
            [name, access, lo, hi] => Ok(Symbol::new(
                *name,
                index,
                Access::from_token(access),
                Some((bound(lo)?, bound(hi)?)),
            )),
            _ => Err(malformed()),
        }
    }

    /// Finds a symbol by name.
    #[must_use]
    pub fn locate(&self, name: &str) -> Option<&Symbol> {
        self.index.get(name).map(|&i| &self.symbols[i])
    }

    /// Checks if `name` is defined.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// The symbol at `index` in program order.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Symbol> {
        self.symbols.get(index)
    }

    /// Number of symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Checks if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Iterates over the symbols in program order.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }
}

impl<'a> IntoIterator for &'a SymbolTable {
    type Item = &'a Symbol;
    type IntoIter = std::slice::Iter<'a, Symbol>;

    fn into_iter(self) -> Self::IntoIter {
        self.symbols.iter()
    }
}
