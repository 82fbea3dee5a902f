#![forbid(unsafe_code)]

mod load;
mod types;

pub use load::*;
pub use types::*;
