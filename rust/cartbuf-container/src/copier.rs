//! Same-space copy policies.

use cartbuf_common::Result;
use cartbuf_common_traits::memory_space::{Device, Host, MemorySpace};
use cartbuf_geometry::{Pitch, Size};

use crate::element::Element;
use crate::memcopy::{MemcopyDirection, TransferEngine, copy_pitched};
use crate::space::AcceleratorSpace;

/// Copies element data between two pitched regions of the same memory space.
pub trait Copier<const D: usize>: 'static {
    /// Memory space both regions reside in.
    type Space: MemorySpace;

    /// Copies `size` elements from `src` to `dst`, honoring both pitches.
    ///
    /// # Safety
    ///
    /// `src` must be valid for reads and `dst` valid for writes of `size` elements
    /// laid out with their respective pitch, both in memory space `Space`.
    unsafe fn copy<T: Element>(
        dst: *mut T,
        dst_pitch: Pitch<D>,
        src: *const T,
        src_pitch: Pitch<D>,
        size: Size<D>,
    ) -> Result<()>;
}

/// Host-to-host copier.
#[derive(Debug, Clone, Copy, Default)]
pub struct H2HCopier;

impl<const D: usize> Copier<D> for H2HCopier {
    type Space = Host;

    unsafe fn copy<T: Element>(
        dst: *mut T,
        dst_pitch: Pitch<D>,
        src: *const T,
        src_pitch: Pitch<D>,
        size: Size<D>,
    ) -> Result<()> {
        unsafe { copy_pitched(dst, dst_pitch, src, src_pitch, size) };
        Ok(())
    }
}

/// Device-to-device copier, executed by the accelerator's transfer engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct D2DCopier;

impl<const D: usize> Copier<D> for D2DCopier {
    type Space = Device;

    unsafe fn copy<T: Element>(
        dst: *mut T,
        dst_pitch: Pitch<D>,
        src: *const T,
        src_pitch: Pitch<D>,
        size: Size<D>,
    ) -> Result<()> {
        unsafe {
            <Device as AcceleratorSpace>::Engine::memcopy(
                dst,
                dst_pitch,
                src,
                src_pitch,
                size,
                MemcopyDirection::DeviceToDevice,
            )
        }
    }
}
