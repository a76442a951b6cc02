//! Traits and definitions used throughout the cartbuf crates.
//!
//! # Modules
//!
//! - [`memory_space`]: Type-level tags identifying the memory space a buffer
//!   lives in (host or accelerator).
//! - [`pitched_region`]: The minimal interface a buffer of any memory space exposes
//!   to transfer operations.

pub mod memory_space;
pub mod pitched_region;
