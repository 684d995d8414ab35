use crate::register::Register;

use super::error::LinkError;

/// A trait that provides the interface with the module bus.
///
/// Each call is one bus transaction on a single register.
/// Implementations return the number of words actually transferred.
pub trait Link: Send {
    /// Opens the link.
    fn open(&mut self) -> Result<(), LinkError>;

    /// Closes the link.
    fn close(&mut self) -> Result<(), LinkError>;

    /// Writes `data` to `reg`.
    fn write(&mut self, reg: Register, data: &[u16]) -> Result<usize, LinkError>;

    /// Reads `data.len()` words from `reg`.
    fn read(&mut self, reg: Register, data: &mut [u16]) -> Result<usize, LinkError>;

    /// Checks if the link is open.
    #[must_use]
    fn is_open(&self) -> bool;
}

// GRCOV_EXCL_START
impl Link for Box<dyn Link> {
    fn open(&mut self) -> Result<(), LinkError> {
        self.as_mut().open()
    }

    fn close(&mut self) -> Result<(), LinkError> {
        self.as_mut().close()
    }

    fn write(&mut self, reg: Register, data: &[u16]) -> Result<usize, LinkError> {
        self.as_mut().write(reg, data)
    }

    fn read(&mut self, reg: Register, data: &mut [u16]) -> Result<usize, LinkError> {
        self.as_mut().read(reg, data)
    }

    fn is_open(&self) -> bool {
        self.as_ref().is_open()
    }
}
// GRCOV_EXCL_STOP
