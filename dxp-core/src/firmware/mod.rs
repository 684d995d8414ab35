mod defaults;
mod dsp;
mod fippi;
mod set;
mod source;

pub use defaults::ParamDefaults;
pub use dsp::DspImage;
pub use fippi::FippiImage;
pub use set::{FilterInfo, FirmwareDatabase, FirmwareRecord, FirmwareSet, SelectedFirmware};
pub use source::{FileSource, FirmwareSource, MemorySource};

/// Numbered, non-comment lines of a firmware text file.
pub(crate) fn content_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim_end()))
        .filter(|(_, l)| !l.trim().is_empty() && !l.starts_with('*'))
}

/// Drops trailing characters that are not hexadecimal digits.
pub(crate) fn trim_hex(line: &str) -> &str {
    line.trim().trim_end_matches(|c: char| !c.is_ascii_hexdigit())
}
