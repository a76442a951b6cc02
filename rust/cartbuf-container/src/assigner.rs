//! Broadcast assignment policies.

use cartbuf_common::Result;
use cartbuf_common_traits::memory_space::{Device, Host, MemorySpace};
use cartbuf_geometry::{Pitch, Size};

use crate::element::Element;
use crate::memcopy::fill_pitched;

/// Writes one value into every element of a pitched region.
pub trait Assigner<const D: usize>: 'static {
    /// Memory space the region resides in.
    type Space: MemorySpace;

    /// Sets every element addressed by `size` under `pitch` to `value`. Padding
    /// bytes between rows are left untouched.
    ///
    /// # Safety
    ///
    /// `dst` must be valid for writes of `size` elements laid out with `pitch`, in
    /// memory space `Space`.
    unsafe fn assign<T: Element>(dst: *mut T, pitch: Pitch<D>, size: Size<D>, value: T)
    -> Result<()>;
}

/// Assigner for host memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostMemAssigner;

impl<const D: usize> Assigner<D> for HostMemAssigner {
    type Space = Host;

    unsafe fn assign<T: Element>(
        dst: *mut T,
        pitch: Pitch<D>,
        size: Size<D>,
        value: T,
    ) -> Result<()> {
        unsafe { fill_pitched(dst, pitch, size, value) };
        Ok(())
    }
}

/// Assigner for the emulated accelerator memory space.
///
/// Stands in for a fill kernel: the region lives in host RAM, so the fill runs on
/// the calling thread and has completed when `assign` returns.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceMemAssigner;

impl<const D: usize> Assigner<D> for DeviceMemAssigner {
    type Space = Device;

    unsafe fn assign<T: Element>(
        dst: *mut T,
        pitch: Pitch<D>,
        size: Size<D>,
        value: T,
    ) -> Result<()> {
        log::trace!("device fill: size {size}, dst {dst:p} pitch {pitch}");
        unsafe { fill_pitched(dst, pitch, size, value) };
        Ok(())
    }
}
