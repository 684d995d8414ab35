use getset::Getters;

use crate::error::ParseError;

use super::{content_lines, trim_hex};

/// A FiPPI configuration image.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
#[getset(get = "pub")]
pub struct FippiImage {
    /// Identifying name of the image.
    filename: String,
    /// Configuration words, one byte each.
    data: Vec<u16>,
}

impl FippiImage {
    /// Creates an image from raw configuration words.
    #[must_use]
    pub fn new(filename: impl Into<String>, data: Vec<u16>) -> Self {
        Self {
            filename: filename.into(),
            data,
        }
    }

    /// Parses a FiPPI file: hexadecimal text, two digits per configuration word.
    pub fn parse(filename: impl Into<String>, text: &str) -> Result<Self, ParseError> {
        let data = content_lines(text)
            .map(|(line, text)| {
                trim_hex(text)
                    .as_bytes()
                    .chunks(2)
                    .map(|pair| {
                        std::str::from_utf8(pair)
                            .ok()
                            .and_then(|s| u16::from_str_radix(s, 16).ok())
                            .ok_or(ParseError::InvalidHex { line })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?
            .concat();
        Ok(Self::new(filename, data))
    }
}
