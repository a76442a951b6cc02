//! Buffers in the emulated accelerator memory space.
//!
//! Device buffers are allocated with a padded row pitch and are never exposed as
//! host-addressable elements: their contents are reached through
//! [`assign`](CartBuffer::assign), same-space copies and explicit transfers to and
//! from host buffers.

use cartbuf_common::Result;
use cartbuf_common_traits::{
    memory_space::{Device, Host, MemorySpace},
    pitched_region::PitchedRegion,
};

use crate::allocator::{Allocator, DeviceMemAllocator};
use crate::assigner::{Assigner, DeviceMemAssigner};
use crate::cart_buffer::{CartBuffer, verify_same_size};
use crate::copier::{Copier, D2DCopier};
use crate::element::Element;
use crate::memcopy::{MemcopyDirection, TransferEngine};
use crate::space::AcceleratorSpace;

/// A buffer in accelerator memory with the default device policies.
pub type DeviceBuffer<T, const D: usize> =
    CartBuffer<T, D, DeviceMemAllocator, D2DCopier, DeviceMemAssigner>;

impl<T, const D: usize, A, C, G> CartBuffer<T, D, A, C, G>
where
    T: Element,
    A: Allocator<T, D, Space = Device>,
    C: Copier<D, Space = Device>,
    G: Assigner<D, Space = Device>,
{
    /// Uploads the contents of a host buffer into this device buffer.
    ///
    /// The mirror of
    /// [`assign_from_accelerator`](CartBuffer::assign_from_accelerator): sizes
    /// must match, this buffer keeps its memory and pitch, and the copy has
    /// completed when the call returns.
    ///
    /// # Errors
    ///
    /// Returns an invalid-argument error if the sizes differ, in which case the
    /// buffer is left untouched. Transfer engine errors are propagated.
    pub fn assign_from_host<S>(&mut self, src: &S) -> Result<&mut Self>
    where
        S: PitchedRegion<T, D, Space = Host>,
    {
        let size = self.size();
        verify_same_size(&size, &src.size())?;
        if size.is_empty() {
            return Ok(self);
        }
        let pitch = self.pitch();
        unsafe {
            <Device as AcceleratorSpace>::Engine::memcopy(
                self.data_ptr_mut(),
                pitch,
                src.data_ptr(),
                src.pitch(),
                size,
                MemcopyDirection::new(Host::KIND, Device::KIND),
            )?
        };
        Ok(self)
    }
}
