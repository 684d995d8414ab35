use crate::error::ParseError;

use super::content_lines;

/// Initial DSP parameter values loaded after a program download.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamDefaults {
    values: Vec<(String, u16)>,
}

impl ParamDefaults {
    /// Name meaning "no parameter defaults".
    pub const NULL: &'static str = "NULL";

    /// Checks if `name` refers to the empty parameter set.
    #[must_use]
    pub fn is_null(name: &str) -> bool {
        name
            .get(..Self::NULL.len())
            .is_some_and(|p| p.eq_ignore_ascii_case(Self::NULL))
    }

    /// Parses `NAME value` lines. A trailing `h` marks a hexadecimal value and `END` stops parsing.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut values = Vec::new();
        for (line, text) in content_lines(text) {
            let tokens = text.split_whitespace().collect::<Vec<_>>();
            if tokens.first().is_some_and(|t| t.eq_ignore_ascii_case("END")) {
                break;
            }
            let invalid = || ParseError::InvalidDefault {
                line,
                text: text.to_owned(),
            };
            let [name, value] = tokens.as_slice() else {
                return Err(invalid());
            };
            let value = match value.strip_suffix(['h', 'H']) {
                Some(hex) => u16::from_str_radix(hex, 16),
                None => value.parse::<u16>(),
            }
            .map_err(|_| invalid())?;
            values.push(((*name).to_owned(), value));
        }
        Ok(Self { values })
    }

    /// Iterates over the `(name, value)` pairs in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u16)> {
        self.values.iter().map(|(n, v)| (n.as_str(), *v))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Checks if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
