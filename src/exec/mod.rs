//! External process execution

pub mod go;
pub mod subprocess;
