//! Shared building blocks for the user API binaries and crates.

pub mod types;
pub mod utils;
