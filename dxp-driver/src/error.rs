use dxp_core::{link::LinkError, register::Register, symbol::Access, ParseError};
use thiserror::Error;

use crate::run::ControlTask;

/// A interface for error handling in dxp-driver.
#[derive(Error, Debug, PartialEq, Clone)]
#[non_exhaustive]
pub enum DXPDriverError {
    /// Error in the Link.
    #[error("{0}")]
    Link(#[from] LinkError),
    /// Link is closed.
    #[error("Link is closed")]
    LinkClosed,
    /// A bus transaction moved fewer words than requested.
    #[error("Transfer on {reg} moved {actual} of {expected} words")]
    LengthMismatch {
        /// Register of the transaction.
        reg: Register,
        /// Requested number of words.
        expected: usize,
        /// Transferred number of words.
        actual: usize,
    },

    /// Error in a firmware or parameter file.
    #[error("{0}")]
    Parse(#[from] ParseError),
    /// A DSP program is too short to boot.
    #[error("DSP program has {0} words, at least 2 are required")]
    InvalidProgram(usize),
    /// FiPPI configuration did not load.
    #[error("FiPPI download failed on channel {0}")]
    FippiDownloadFailed(u8),
    /// The requested firmware kind cannot be downloaded.
    #[error("Downloading {0} firmware is not supported")]
    NotSupported(String),
    /// Unknown firmware kind.
    #[error("Unknown firmware type ({0})")]
    UnknownFirmware(String),

    /// The channel index does not exist.
    #[error("Channel ({0}) does not exist")]
    InvalidChannel(usize),
    /// No DSP program is loaded on the channel.
    #[error("No symbol table is loaded on channel {0}")]
    NoSymbolTable(u8),
    /// The symbol is not defined by the loaded program.
    #[error("Unknown DSP symbol ({0})")]
    UnknownSymbol(String),
    /// The access mode of the symbol forbids the operation.
    #[error("DSP symbol {name} is {access}")]
    SymbolAccess {
        /// Name of the symbol.
        name: String,
        /// Access mode of the symbol.
        access: Access,
    },
    /// A raw value does not fit a DSP word.
    #[error("Value ({value}) of {name} is out of range ([0, 65535])")]
    WordOutOfRange {
        /// Name of the symbol.
        name: String,
        /// Requested value.
        value: f64,
    },

    /// BUSY did not reach the expected value in time.
    #[error("Timed out waiting for BUSY = {target} on channel {channel} (last value {last})")]
    Timeout {
        /// Channel polled.
        channel: u8,
        /// Expected BUSY value.
        target: u16,
        /// Last BUSY value read.
        last: u16,
    },
    /// A channel did not report a started run in time.
    #[error("Run did not start on channel {0}")]
    RunStartTimeout(u8),
    /// Control task information is too short.
    #[error("{task:?} requires {required} info values, but {len} are given")]
    InvalidInfoLength {
        /// The task.
        task: ControlTask,
        /// Given length.
        len: usize,
        /// Required length.
        required: usize,
    },

    /// Computed gain is out of range.
    #[error("Gain ({0} dB) is out of range ([{min}, {max}])", min = crate::acquisition::GAIN_DB_MIN, max = crate::acquisition::GAIN_DB_MAX)]
    GainOutOfRange(f64),
    /// Slow filter length is out of range.
    #[error("SLOWLEN ({0}) is out of range ([2, 28])")]
    SlowLengthOutOfRange(f64),
    /// Slow filter gap is out of range.
    #[error("SLOWGAP ({0}) is out of range ([3, 29])")]
    SlowGapOutOfRange(f64),
    /// Fast filter length is out of range.
    #[error("FASTLEN ({0}) is out of range ([2, 28])")]
    FastLengthOutOfRange(f64),
    /// Fast filter gap is out of range.
    #[error("FASTGAP ({0}) is out of range ([0, 29])")]
    FastGapOutOfRange(f64),
    /// Filter length and gap exceed the filter memory.
    #[error("Filter length ({length}) + gap ({gap}) exceeds 31")]
    FilterSumOutOfRange {
        /// Filter length.
        length: f64,
        /// Filter gap.
        gap: f64,
    },
    /// Threshold is out of range.
    #[error("THRESHOLD ({0}) is out of range ([0, 255])")]
    ThresholdOutOfRange(f64),
    /// Number of bins is out of range.
    #[error("Number of MCA bins ({0}) is out of range")]
    BinsOutOfRange(f64),
    /// Baseline parameter is out of range.
    #[error("Baseline parameter ({0}) is out of range")]
    BaselineOutOfRange(f64),
    /// Preset length does not fit the preset registers.
    #[error("Preset length ({0}) is out of range")]
    PresetOutOfRange(f64),
    /// A negative or non-finite physical value.
    #[error("Value ({value}) of {name} is invalid")]
    InvalidValue {
        /// Name of the acquisition value.
        name: String,
        /// Requested value.
        value: f64,
    },
    /// SCA index is out of range.
    #[error("SCA ({index}) is out of range ([0, {count}))")]
    ScaOutOfRange {
        /// Requested SCA.
        index: usize,
        /// Configured number of SCAs.
        count: usize,
    },
    /// SCA lower bound exceeds the upper bound.
    #[error("SCA lower bin ({lo}) exceeds upper bin ({hi})")]
    BinMismatch {
        /// Lower bin.
        lo: f64,
        /// Upper bin.
        hi: f64,
    },

    /// Unknown acquisition value.
    #[error("Unknown acquisition value ({0})")]
    UnknownValue(String),
    /// Unknown run data.
    #[error("Unknown run data ({0})")]
    UnknownRunData(String),
    /// Unknown special run.
    #[error("Unknown special run ({0})")]
    UnknownSpecialRun(String),
    /// Unknown board operation.
    #[error("Unknown board operation ({0})")]
    UnknownBoardOperation(String),
    /// Unknown parameter data.
    #[error("Unknown parameter data ({0})")]
    UnknownParamData(String),
    /// A required default is missing.
    #[error("Required acquisition value ({0}) has no default")]
    IncompleteDefaults(String),
    /// The acquisition value is required and cannot be removed.
    #[error("Acquisition value ({0}) is required")]
    RequiredValue(String),
    /// The detector preamplifier type is not supported.
    #[error("Unknown preamplifier type on channel {0}")]
    UnknownPreampType(u8),
}
