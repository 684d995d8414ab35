mod download;
mod dsp;
mod io;

pub use dsp::Dsp;
pub use io::RegisterIo;
