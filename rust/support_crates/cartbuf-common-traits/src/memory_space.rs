//! Memory space tags.
//!
//! The set of memory spaces is closed: [`Host`] and [`Device`] are the only types
//! implementing [`MemorySpace`]. Operations that move data between spaces are
//! selected by these tags at compile time.

use std::fmt;

/// Runtime identification of a memory space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryKind {
    /// Memory directly addressable by the host processor.
    Host,
    /// Memory of an attached compute accelerator.
    Device,
}

impl fmt::Display for MemoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryKind::Host => write!(f, "host"),
            MemoryKind::Device => write!(f, "device"),
        }
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Host {}
    impl Sealed for super::Device {}
}

/// A type-level memory space tag.
pub trait MemorySpace: sealed::Sealed + Send + Sync + 'static {
    const KIND: MemoryKind;
}

/// Host memory space tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Host;

/// Accelerator memory space tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Device;

impl MemorySpace for Host {
    const KIND: MemoryKind = MemoryKind::Host;
}

impl MemorySpace for Device {
    const KIND: MemoryKind = MemoryKind::Device;
}
