//! Allocation policies.
//!
//! An [`Allocator`] decides how memory of one memory space is obtained for a buffer
//! of a given size and which pitch the buffer is laid out with. Buffers keep the
//! allocator instance that produced their memory and hand the region back to it
//! when the last alias goes away.

use std::alloc::{Layout, alloc_zeroed, dealloc};
use std::ptr::NonNull;

use cartbuf_common::{Result, error::Error};
use cartbuf_common_traits::memory_space::{Device, Host, MemoryKind, MemorySpace};
use cartbuf_geometry::{Pitch, Size};

use crate::config::{DeviceAllocConfig, HostAllocConfig};
use crate::element::Element;

/// Obtains and releases pitched memory regions in one memory space.
///
/// # Safety
///
/// Implementors must guarantee that a successful `allocate(size)` returns a pointer
/// valid for reads and writes of every element addressed by `size` laid out with
/// the returned pitch, aligned for `T`, and initialized to valid `T` values. The
/// region must stay valid until it is passed to `release`.
pub unsafe trait Allocator<T: Element, const D: usize>: Send + Sync + 'static {
    /// Memory space the allocated regions reside in.
    type Space: MemorySpace;

    /// Allocates a region for `size` elements and returns it with its pitch.
    fn allocate(&self, size: Size<D>) -> Result<(NonNull<T>, Pitch<D>)>;

    /// Releases a region.
    ///
    /// # Safety
    ///
    /// `ptr`, `size` and `pitch` must be exactly what a previous `allocate` call on
    /// an equivalent allocator produced, and the region must not be used afterwards.
    unsafe fn release(&self, ptr: NonNull<T>, size: Size<D>, pitch: Pitch<D>);
}

/// Host memory allocator producing tight-packed (unpadded) regions.
#[derive(Debug, Clone, Default)]
pub struct HostMemAllocator {
    config: HostAllocConfig,
}

impl HostMemAllocator {
    pub fn with_config(config: HostAllocConfig) -> Result<HostMemAllocator> {
        config.validate()?;
        Ok(HostMemAllocator { config })
    }

    pub fn config(&self) -> &HostAllocConfig {
        &self.config
    }
}

unsafe impl<T: Element, const D: usize> Allocator<T, D> for HostMemAllocator {
    type Space = Host;

    fn allocate(&self, size: Size<D>) -> Result<(NonNull<T>, Pitch<D>)> {
        let pitch = Pitch::dense(&size, std::mem::size_of::<T>());
        let ptr = allocate_region::<T, D>(Host::KIND, &size, &pitch, self.config.alignment)?;
        Ok((ptr, pitch))
    }

    unsafe fn release(&self, ptr: NonNull<T>, size: Size<D>, pitch: Pitch<D>) {
        unsafe { release_region(Host::KIND, ptr, &size, &pitch, self.config.alignment) };
    }
}

/// Allocator of the emulated accelerator memory space.
///
/// Regions are backed by host RAM but laid out the way pitched accelerator memory
/// is: every row of a 2-D or 3-D buffer is padded to a multiple of the configured
/// pitch alignment.
#[derive(Debug, Clone, Default)]
pub struct DeviceMemAllocator {
    config: DeviceAllocConfig,
}

impl DeviceMemAllocator {
    pub fn with_config(config: DeviceAllocConfig) -> Result<DeviceMemAllocator> {
        config.validate()?;
        Ok(DeviceMemAllocator { config })
    }

    pub fn config(&self) -> &DeviceAllocConfig {
        &self.config
    }
}

unsafe impl<T: Element, const D: usize> Allocator<T, D> for DeviceMemAllocator {
    type Space = Device;

    fn allocate(&self, size: Size<D>) -> Result<(NonNull<T>, Pitch<D>)> {
        let pitch = Pitch::padded(&size, std::mem::size_of::<T>(), self.config.pitch_alignment)
            .ok_or_else(|| Error::layout_overflow(format!("pitch of {size}")))?;
        let ptr =
            allocate_region::<T, D>(Device::KIND, &size, &pitch, self.config.base_alignment)?;
        Ok((ptr, pitch))
    }

    unsafe fn release(&self, ptr: NonNull<T>, size: Size<D>, pitch: Pitch<D>) {
        unsafe { release_region(Device::KIND, ptr, &size, &pitch, self.config.base_alignment) };
    }
}

/// Layout of the region spanned by `size` under `pitch`, or `None` for an empty
/// region, which is never backed by memory.
fn region_layout<T: Element, const D: usize>(
    size: &Size<D>,
    pitch: &Pitch<D>,
    alignment: usize,
) -> Result<Option<Layout>> {
    let bytes = pitch
        .checked_byte_len(size, std::mem::size_of::<T>())
        .ok_or_else(|| Error::layout_overflow(format!("region of {size} with pitch {pitch}")))?;
    if bytes == 0 {
        return Ok(None);
    }
    let alignment = alignment.max(std::mem::align_of::<T>());
    Ok(Some(Layout::from_size_align(bytes, alignment)?))
}

fn allocate_region<T: Element, const D: usize>(
    kind: MemoryKind,
    size: &Size<D>,
    pitch: &Pitch<D>,
    alignment: usize,
) -> Result<NonNull<T>> {
    let Some(layout) = region_layout::<T, D>(size, pitch, alignment)? else {
        return Ok(NonNull::dangling());
    };
    let ptr = unsafe { alloc_zeroed(layout) };
    let ptr = NonNull::new(ptr as *mut T)
        .ok_or_else(|| Error::allocation_failed(layout.size(), layout.align()))?;
    log::trace!(
        "allocated {} bytes of {kind} memory at {ptr:p}: size {size}, pitch {pitch}",
        layout.size()
    );
    Ok(ptr)
}

unsafe fn release_region<T: Element, const D: usize>(
    kind: MemoryKind,
    ptr: NonNull<T>,
    size: &Size<D>,
    pitch: &Pitch<D>,
    alignment: usize,
) {
    // The layout was computed successfully when the region was allocated.
    if let Ok(Some(layout)) = region_layout::<T, D>(size, pitch, alignment) {
        log::trace!(
            "releasing {} bytes of {kind} memory at {ptr:p}",
            layout.size()
        );
        unsafe { dealloc(ptr.as_ptr() as *mut u8, layout) };
    }
}

#[cfg(test)]
mod tests {
    use cartbuf_geometry::align::is_ptr_aligned;

    use super::*;

    #[test]
    fn test_host_allocation_is_dense_and_zeroed() {
        let alloc = HostMemAllocator::default();
        let size = Size::new([5, 3, 2]);
        let (ptr, pitch) = Allocator::<f64, 3>::allocate(&alloc, size).unwrap();
        assert_eq!(pitch, Pitch::<3>::new(40, 120));
        assert!(is_ptr_aligned(ptr.as_ptr(), 64));
        let data = unsafe { std::slice::from_raw_parts(ptr.as_ptr(), size.len()) };
        assert!(data.iter().all(|&v| v == 0.0));
        unsafe { Allocator::<f64, 3>::release(&alloc, ptr, size, pitch) };
    }

    #[test]
    fn test_host_custom_alignment() {
        let alloc = HostMemAllocator::with_config(HostAllocConfig { alignment: 4096 }).unwrap();
        let size = Size::new([10]);
        let (ptr, pitch) = Allocator::<u8, 1>::allocate(&alloc, size).unwrap();
        assert!(is_ptr_aligned(ptr.as_ptr(), 4096));
        unsafe { Allocator::<u8, 1>::release(&alloc, ptr, size, pitch) };

        assert!(HostMemAllocator::with_config(HostAllocConfig { alignment: 3 }).is_err());
    }

    #[test]
    fn test_device_allocation_is_padded() {
        let alloc = DeviceMemAllocator::default();
        let size = Size::new([10, 4]);
        let (ptr, pitch) = Allocator::<f32, 2>::allocate(&alloc, size).unwrap();
        assert_eq!(pitch, Pitch::<2>::new(256));
        assert!(is_ptr_aligned(ptr.as_ptr(), 256));
        unsafe { Allocator::<f32, 2>::release(&alloc, ptr, size, pitch) };

        let alloc = DeviceMemAllocator::with_config(DeviceAllocConfig {
            base_alignment: 1024,
            pitch_alignment: 64,
        })
        .unwrap();
        let size = Size::new([10, 4, 3]);
        let (ptr, pitch) = Allocator::<f32, 3>::allocate(&alloc, size).unwrap();
        assert_eq!(pitch, Pitch::<3>::new(64, 256));
        assert!(is_ptr_aligned(ptr.as_ptr(), 1024));
        unsafe { Allocator::<f32, 3>::release(&alloc, ptr, size, pitch) };
    }

    #[test]
    fn test_empty_allocation() {
        let alloc = HostMemAllocator::default();
        let size = Size::new([0, 16]);
        let (ptr, pitch) = Allocator::<u32, 2>::allocate(&alloc, size).unwrap();
        assert_eq!(ptr, NonNull::dangling());
        assert_eq!(pitch, Pitch::<2>::new(0));
        unsafe { Allocator::<u32, 2>::release(&alloc, ptr, size, pitch) };
    }

    #[test]
    fn test_oversized_allocation_fails() {
        let alloc = HostMemAllocator::default();
        let size = Size::new([usize::MAX / 2, 4]);
        let e = Allocator::<u64, 2>::allocate(&alloc, size).unwrap_err();
        assert!(matches!(
            e.kind(),
            cartbuf_common::error::ErrorKind::LayoutOverflow { .. }
        ));

        // Representable but far beyond any address space.
        let size = Size::new([1 << 40, 1 << 20]);
        assert!(Allocator::<u8, 2>::allocate(&alloc, size).is_err());
    }
}
