pub const MEMORY_SIZE: usize = 0x10000;
pub const PROGRAM_SIZE: usize = 0x4000;

pub const SYSMICROSEC: u16 = 40;
pub const SPECTSTART: u16 = 0x8000;
pub const BASESTART: u16 = 0x0400;
pub const BASELEN: u16 = 1024;
pub const HSTSTART: u16 = 0x0800;
pub const HSTLEN: u16 = 1024;
pub const SCADSTART: u16 = 0x0C00;
pub const SCADLEN: u16 = 32;
pub const MAXSCA: u16 = 16;

pub const WHICHTEST_SET_ASCDAC: u16 = 0;
pub const WHICHTEST_ACQUIRE_ADC: u16 = 1;
pub const WHICHTEST_SLEEP_DSP: u16 = 6;
pub const WHICHTEST_CHECK_MEMORY: u16 = 20;
pub const WHICHTEST_READ_MEMORY: u16 = 21;

pub const BOOT_VALUES: &[(&str, u16)] = &[
    ("SYSMICROSEC", SYSMICROSEC),
    ("SPECTSTART", SPECTSTART),
    ("BASESTART", BASESTART),
    ("BASELEN", BASELEN),
    ("HSTSTART", HSTSTART),
    ("HSTLEN", HSTLEN),
    ("CIRCULAR", HSTSTART),
    ("SCADSTART", SCADSTART),
    ("SCADLEN", SCADLEN),
    ("MAXSCA", MAXSCA),
    ("MCALIMHI", 4096),
    ("SLOWLEN", 20),
    ("SLOWGAP", 3),
    ("FASTLEN", 8),
];
