//! Configuration module
//!
//! Handles parsing of Gox.toml and layering command-line flags on top of it.

pub mod gox_toml;

pub use gox_toml::{BuildSection, GoxToml, PlatformsSection};
