//! Scan domain: error taxonomy and the rendering / evaluation ports

pub mod errors;
pub mod ports;

pub use errors::*;
pub use ports::*;
