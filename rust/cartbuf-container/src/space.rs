//! Binding of accelerator memory spaces to their transfer engines.

use cartbuf_common_traits::memory_space::{Device, MemorySpace};

use crate::memcopy::{EmulatedEngine, TransferEngine};

/// A memory space other than host memory, reachable from the host only through
/// explicit transfers.
///
/// Host memory deliberately does not implement this trait: operations that move
/// data from an accelerator into a host buffer accept only sources whose space
/// implements it, so passing a host buffer there does not type-check.
pub trait AcceleratorSpace: MemorySpace {
    /// Engine performing copies to, from and within this memory space.
    type Engine: TransferEngine;
}

impl AcceleratorSpace for Device {
    type Engine = EmulatedEngine;
}
