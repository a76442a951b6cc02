//! `PitchedRegion`: a pitched memory region of known element type and dimension.

use cartbuf_geometry::{Pitch, Size};

use crate::memory_space::MemorySpace;

/// A `D`-dimensional pitched region of `T` elements living in memory space `Space`.
///
/// This is what a transfer operation needs to know about the other side of a copy.
/// The element type and the dimension are part of the trait's parameters, so a
/// mismatch between source and destination is rejected by the type checker.
///
/// # Safety
///
/// Implementors must guarantee that:
/// - `data_ptr()` addresses element `(0, 0, 0)` of a region that stays valid for as
///   long as the implementor is alive.
/// - Every element addressed by `size()` laid out with `pitch()` lies within that
///   region.
/// - `Space` truthfully names the memory space the region resides in.
pub unsafe trait PitchedRegion<T, const D: usize> {
    /// Memory space the region lives in.
    type Space: MemorySpace;

    /// Extent of the region in elements.
    fn size(&self) -> Size<D>;

    /// Byte strides of the region.
    fn pitch(&self) -> Pitch<D>;

    /// Address of the first element.
    fn data_ptr(&self) -> *const T;
}
