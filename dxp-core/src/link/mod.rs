mod error;
mod sync;

pub use error::LinkError;
#[doc(inline)]
pub use sync::*;
