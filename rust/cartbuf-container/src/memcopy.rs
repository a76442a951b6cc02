//! Pitched memory copies and the transfer engine interface.
//!
//! Every copy in this crate, whether it stays within one memory space or crosses
//! between host and accelerator, is a row-by-row copy of a pitched region. The
//! helpers here walk the rows of a region, and [`TransferEngine`] is the seam
//! through which an accelerator runtime performs such copies on its own memory.

use std::fmt;

use cartbuf_common::{Result, error::Error};
use cartbuf_common_traits::memory_space::MemoryKind;
use cartbuf_geometry::{Pitch, Size};

use crate::element::Element;

/// Direction of a memory copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemcopyDirection {
    HostToHost,
    HostToDevice,
    DeviceToHost,
    DeviceToDevice,
}

impl MemcopyDirection {
    /// Direction of a copy from memory of kind `src` to memory of kind `dst`.
    pub fn new(src: MemoryKind, dst: MemoryKind) -> MemcopyDirection {
        match (src, dst) {
            (MemoryKind::Host, MemoryKind::Host) => MemcopyDirection::HostToHost,
            (MemoryKind::Host, MemoryKind::Device) => MemcopyDirection::HostToDevice,
            (MemoryKind::Device, MemoryKind::Host) => MemcopyDirection::DeviceToHost,
            (MemoryKind::Device, MemoryKind::Device) => MemcopyDirection::DeviceToDevice,
        }
    }

    pub fn source(&self) -> MemoryKind {
        match self {
            MemcopyDirection::HostToHost | MemcopyDirection::HostToDevice => MemoryKind::Host,
            MemcopyDirection::DeviceToHost | MemcopyDirection::DeviceToDevice => {
                MemoryKind::Device
            }
        }
    }

    pub fn destination(&self) -> MemoryKind {
        match self {
            MemcopyDirection::HostToHost | MemcopyDirection::DeviceToHost => MemoryKind::Host,
            MemcopyDirection::HostToDevice | MemcopyDirection::DeviceToDevice => {
                MemoryKind::Device
            }
        }
    }
}

impl fmt::Display for MemcopyDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.source(), self.destination())
    }
}

/// Performs pitched copies involving accelerator memory.
///
/// A transfer is synchronous: when `memcopy` returns `Ok`, the destination region
/// holds the source elements. An engine reporting an error makes no promise about
/// the destination contents.
pub trait TransferEngine {
    /// Copies a region of `size` elements from `src` to `dst`.
    ///
    /// # Safety
    ///
    /// - `src` must address a region valid for reads of `size` laid out with
    ///   `src_pitch`, residing in the memory space `direction.source()`.
    /// - `dst` must address a region valid for writes of `size` laid out with
    ///   `dst_pitch`, residing in the memory space `direction.destination()`.
    unsafe fn memcopy<T: Element, const D: usize>(
        dst: *mut T,
        dst_pitch: Pitch<D>,
        src: *const T,
        src_pitch: Pitch<D>,
        size: Size<D>,
        direction: MemcopyDirection,
    ) -> Result<()>;
}

/// Transfer engine for accelerator memory emulated in host RAM.
///
/// Device regions of the emulated accelerator are ordinary host allocations, so
/// every direction reduces to [`copy_pitched`]. Like a pitched accelerator copy,
/// the engine rejects a pitch too small to hold a row (or a slice) of the region.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmulatedEngine;

impl TransferEngine for EmulatedEngine {
    unsafe fn memcopy<T: Element, const D: usize>(
        dst: *mut T,
        dst_pitch: Pitch<D>,
        src: *const T,
        src_pitch: Pitch<D>,
        size: Size<D>,
        direction: MemcopyDirection,
    ) -> Result<()> {
        log::trace!(
            "memcopy {direction}: size {size}, src {src:p} pitch {src_pitch}, dst {dst:p} pitch {dst_pitch}"
        );
        verify_engine_pitch(direction, "source", &src_pitch, &size, std::mem::size_of::<T>())?;
        verify_engine_pitch(direction, "destination", &dst_pitch, &size, std::mem::size_of::<T>())?;
        unsafe { copy_pitched(dst, dst_pitch, src, src_pitch, size) };
        Ok(())
    }
}

fn verify_engine_pitch<const D: usize>(
    direction: MemcopyDirection,
    side: &str,
    pitch: &Pitch<D>,
    size: &Size<D>,
    elem_size: usize,
) -> Result<()> {
    let dense = Pitch::dense(size, elem_size);
    let too_small = pitch
        .as_slice()
        .iter()
        .zip(dense.as_slice())
        .any(|(&given, &needed)| given < needed);
    if too_small {
        return Err(Error::transfer_failed(
            direction.to_string(),
            format!("{side} pitch {pitch} is smaller than the extent {size} requires ({dense})"),
        ));
    }
    Ok(())
}

/// Copies a region of `size` elements between two pitched regions of host-addressable
/// memory.
///
/// The regions may overlap. Overlapping regions with equal pitches are copied row by
/// row in the order that never reads a row already overwritten; overlapping regions
/// with different pitches are staged through a temporary tight-packed copy.
///
/// # Safety
///
/// `src` must be valid for reads and `dst` valid for writes of every element
/// addressed by `size` under their respective pitch.
pub unsafe fn copy_pitched<T: Element, const D: usize>(
    dst: *mut T,
    dst_pitch: Pitch<D>,
    src: *const T,
    src_pitch: Pitch<D>,
    size: Size<D>,
) {
    if size.is_empty() {
        return;
    }
    let elem_size = std::mem::size_of::<T>();
    let dense = Pitch::dense(&size, elem_size);
    if dst_pitch == dense && src_pitch == dense {
        unsafe { std::ptr::copy(src, dst, size.len()) };
        return;
    }

    let span = |ptr: usize, pitch: &Pitch<D>| {
        let len = pitch.checked_byte_len(&size, elem_size).unwrap_or(usize::MAX);
        ptr..ptr.saturating_add(len)
    };
    let dst_span = span(dst as usize, &dst_pitch);
    let src_span = span(src as usize, &src_pitch);
    let overlapping = dst_span.start < src_span.end && src_span.start < dst_span.end;
    let rows = 0..size.row_count();

    if !overlapping || (dst_pitch == src_pitch && dst_span.start <= src_span.start) {
        unsafe { copy_rows(dst, dst_pitch, src, src_pitch, size, rows) };
    } else if dst_pitch == src_pitch {
        unsafe { copy_rows(dst, dst_pitch, src, src_pitch, size, rows.rev()) };
    } else {
        let len = size.len();
        let mut staging = Vec::<T>::with_capacity(len);
        unsafe {
            copy_rows(staging.as_mut_ptr(), dense, src, src_pitch, size, rows.clone());
            staging.set_len(len);
            copy_rows(dst, dst_pitch, staging.as_ptr(), dense, size, rows);
        }
    }
}

/// Copies the rows of a region in the order given by `rows`.
unsafe fn copy_rows<T: Element, const D: usize>(
    dst: *mut T,
    dst_pitch: Pitch<D>,
    src: *const T,
    src_pitch: Pitch<D>,
    size: Size<D>,
    rows: impl Iterator<Item = usize>,
) {
    let (dst, src) = (dst as *mut u8, src as *const u8);
    for row in rows {
        let (y, z) = size.row_coords(row);
        unsafe {
            std::ptr::copy(
                src.add(src_pitch.row_offset(y, z)) as *const T,
                dst.add(dst_pitch.row_offset(y, z)) as *mut T,
                size.x(),
            );
        }
    }
}

/// Writes `value` into every element of a pitched region of host-addressable memory.
///
/// # Safety
///
/// `dst` must be valid for writes of every element addressed by `size` under `pitch`.
pub unsafe fn fill_pitched<T: Element, const D: usize>(
    dst: *mut T,
    pitch: Pitch<D>,
    size: Size<D>,
    value: T,
) {
    if size.is_empty() {
        return;
    }
    let base = dst as *mut u8;
    for row in 0..size.row_count() {
        let (y, z) = size.row_coords(row);
        let row_ptr = unsafe { base.add(pitch.row_offset(y, z)) } as *mut T;
        for x in 0..size.x() {
            unsafe { row_ptr.add(x).write(value) };
        }
    }
}
