use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use crate::error::ParseError;

use super::{DspImage, FippiImage, ParamDefaults};

/// A provider of firmware images by name.
pub trait FirmwareSource: Send + Sync {
    /// Reads the text of the image called `name`.
    fn read(&self, name: &str) -> Result<String, ParseError>;

    /// Loads a DSP image.
    fn dsp(&self, name: &str) -> Result<DspImage, ParseError> {
        DspImage::parse(name, &self.read(name)?)
    }

    /// Loads a FiPPI image.
    fn fippi(&self, name: &str) -> Result<FippiImage, ParseError> {
        FippiImage::parse(name, &self.read(name)?)
    }

    /// Loads DSP parameter defaults. The [`ParamDefaults::NULL`] name yields an empty set.
    fn param_defaults(&self, name: &str) -> Result<ParamDefaults, ParseError> {
        if ParamDefaults::is_null(name) {
            return Ok(ParamDefaults::default());
        }
        ParamDefaults::parse(&self.read(name)?)
    }
}

/// Images stored as files below a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    /// Creates a source reading from `root`.
    #[must_use]
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl FirmwareSource for FileSource {
    fn read(&self, name: &str) -> Result<String, ParseError> {
        let path = self.root.join(name);
        tracing::debug!("Reading firmware image {}", path.display());
        std::fs::read_to_string(&path).map_err(|e| ParseError::io(&path, e))
    }
}

/// Images held in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySource {
    files: HashMap<String, String>,
}

impl MemorySource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an image.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(name, text);
        self
    }

    /// Adds or replaces an image.
    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.files.insert(name.into(), text.into());
    }
}

impl FirmwareSource for MemorySource {
    fn read(&self, name: &str) -> Result<String, ParseError> {
        self.files
            .get(name)
            .cloned()
            .ok_or_else(|| ParseError::UnknownImage(name.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn file_source() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let mut f = std::fs::File::create(dir.path().join("a.fip"))?;
        writeln!(f, "0102")?;

        let source = FileSource::new(dir.path());
        assert_eq!(&[1, 2], source.fippi("a.fip")?.data().as_slice());
        assert!(matches!(source.fippi("missing.fip"), Err(ParseError::Io { .. })));
        assert!(source.param_defaults("NULL")?.is_empty());

        Ok(())
    }

    #[test]
    fn memory_source() -> anyhow::Result<()> {
        let source = MemorySource::new()
            .with("a.dsp", "1\nBUSY -\n000000\n")
            .with("p.itx", "BUSY 0\n");

        assert_eq!(1, source.dsp("a.dsp")?.symbols().len());
        assert_eq!(1, source.param_defaults("p.itx")?.len());
        assert_eq!(0, source.param_defaults("null")?.len());
        assert_eq!(
            Err(ParseError::UnknownImage("b.dsp".to_owned())),
            source.dsp("b.dsp")
        );

        Ok(())
    }
}
