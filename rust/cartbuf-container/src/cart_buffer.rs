//! `CartBuffer`: a shared-ownership handle to a pitched, `D`-dimensional region.
//!
//! Cloning a `CartBuffer` never copies element data: the clone aliases the same
//! memory and shares its ownership cell. The region is handed back to the
//! allocator when the last alias of an owned region is dropped. Regions wrapped
//! as [`Ownership::Foreign`] are never released by the buffer.
//!
//! # Threads
//!
//! Aliases write the same elements through shared handles, so a `CartBuffer` is
//! neither `Send` nor `Sync` and all aliases of a region stay on the thread that
//! created them. A buffer without other aliases can be handed to another thread
//! through [`CartBuffer::into_sendable`]. The ownership cell is atomic, so aliases
//! handed over with [`CartBuffer::into_sendable_unchecked`] may be cloned and
//! dropped on any thread.

use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;
use std::sync::Arc;

use cartbuf_common::{Result, error::Error};
use cartbuf_common_traits::{
    memory_space::{MemoryKind, MemorySpace},
    pitched_region::PitchedRegion,
};
use cartbuf_geometry::{Pitch, Size};

use crate::allocator::Allocator;
use crate::assigner::Assigner;
use crate::copier::Copier;
use crate::element::Element;

/// Whether a buffer is responsible for releasing the region it references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ownership {
    /// The region is released through the allocator when the last alias is dropped.
    Owned,
    /// The region's lifetime is managed elsewhere; it is never released.
    Foreign,
}

/// A `D`-dimensional pitched buffer of `T` elements.
///
/// The buffer configuration is the combination of element type, dimension and the
/// three memory policies: the allocator `A` (which also fixes the memory space),
/// the same-space copier `C` and the assigner `G`.
///
/// A buffer is either backed by a region (allocated or wrapped) or *inert*: the
/// state of [`CartBuffer::default`] and of a buffer that has been
/// [`take`](CartBuffer::take)n from. An inert buffer has zero size, references no
/// memory and releases nothing.
pub struct CartBuffer<T: Element, const D: usize, A: Allocator<T, D>, C, G> {
    /// Address of element `(0, 0, 0)`.
    ptr: NonNull<T>,
    size: Size<D>,
    pitch: Pitch<D>,
    /// Ownership cell shared by every alias of the region; `None` when inert.
    region: Option<Arc<Region<T, D, A>>>,
    _policies: PhantomData<fn() -> (C, G)>,
}

impl<T, const D: usize, A, C, G> CartBuffer<T, D, A, C, G>
where
    T: Element,
    A: Allocator<T, D>,
    C: Copier<D, Space = A::Space>,
    G: Assigner<D, Space = A::Space>,
{
    /// Allocates a buffer of `size` elements with a default-constructed allocator.
    ///
    /// The new buffer is the sole owner of its memory.
    pub fn new(size: Size<D>) -> Result<Self>
    where
        A: Default,
    {
        Self::new_in(size, A::default())
    }

    /// Allocates a buffer of `size` elements through `alloc`.
    ///
    /// The allocator is kept with the region and releases it once the last alias
    /// is dropped. Allocation failures are returned as-is.
    pub fn new_in(size: Size<D>, alloc: A) -> Result<Self> {
        let (ptr, pitch) = alloc.allocate(size)?;
        let region = Region {
            base: ptr,
            size,
            pitch,
            ownership: Ownership::Owned,
            alloc,
        };
        Ok(CartBuffer {
            ptr,
            size,
            pitch,
            region: Some(Arc::new(region)),
            _policies: PhantomData,
        })
    }

    /// Wraps an existing region without allocating.
    ///
    /// Zero components of `pitch` are replaced by the tight-packed stride
    /// (`pitch[0] = size.x() * size_of::<T>()`, `pitch[1] = pitch[0] * size.y()`);
    /// non-zero components are used as given.
    ///
    /// With [`Ownership::Owned`] the region is released through a
    /// default-constructed `A` once the last alias is dropped; with
    /// [`Ownership::Foreign`] it is never released.
    ///
    /// # Safety
    ///
    /// - `ptr` must be valid for reads and writes of every element addressed by
    ///   `size` under the resolved pitch, in memory space `A::Space`, for as long as
    ///   any alias of the returned buffer is alive.
    /// - With [`Ownership::Owned`], the region must have been produced by
    ///   `A::allocate(size)` with exactly the resolved pitch.
    /// - Code outside the buffer's aliases must not access the region while a
    ///   buffer operation reads or writes it.
    pub unsafe fn from_raw_parts(
        ptr: NonNull<T>,
        size: Size<D>,
        ownership: Ownership,
        pitch: Pitch<D>,
    ) -> Self
    where
        A: Default,
    {
        unsafe { Self::from_raw_parts_in(ptr, size, ownership, pitch, A::default()) }
    }

    /// Wraps an existing region without allocating, releasing an owned region
    /// through `alloc`.
    ///
    /// # Safety
    ///
    /// See [`CartBuffer::from_raw_parts`].
    pub unsafe fn from_raw_parts_in(
        ptr: NonNull<T>,
        size: Size<D>,
        ownership: Ownership,
        pitch: Pitch<D>,
        alloc: A,
    ) -> Self {
        let pitch = pitch.resolve(&size, std::mem::size_of::<T>());
        let region = Region {
            base: ptr,
            size,
            pitch,
            ownership,
            alloc,
        };
        CartBuffer {
            ptr,
            size,
            pitch,
            region: Some(Arc::new(region)),
            _policies: PhantomData,
        }
    }

    /// Extent of the buffer in elements.
    #[inline]
    pub fn size(&self) -> Size<D> {
        self.size
    }

    /// Byte strides of the buffer.
    #[inline]
    pub fn pitch(&self) -> Pitch<D> {
        self.pitch
    }

    #[inline]
    pub fn data_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    #[inline]
    pub fn data_ptr_mut(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Returns `true` if the buffer holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size.is_empty()
    }

    /// Memory space of the buffer.
    #[inline]
    pub fn memory_kind(&self) -> MemoryKind {
        A::Space::KIND
    }

    /// Number of live aliases of the underlying region, including this one.
    ///
    /// Returns 0 for an inert buffer.
    pub fn ref_count(&self) -> usize {
        self.region.as_ref().map_or(0, Arc::strong_count)
    }

    /// Ownership mode of the underlying region, or `None` for an inert buffer.
    pub fn ownership(&self) -> Option<Ownership> {
        self.region.as_ref().map(|r| r.ownership)
    }

    /// Allocator that releases the underlying region.
    pub fn allocator(&self) -> Option<&A> {
        self.region.as_ref().map(|r| &r.alloc)
    }

    /// Returns `true` if both buffers alias the same region.
    pub fn shares_memory_with(&self, other: &Self) -> bool {
        match (&self.region, &other.region) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Moves the buffer out, leaving an inert buffer in its place.
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    /// Prepares the buffer to be moved to another thread.
    ///
    /// Succeeds only if no other alias of the region exists, so the receiving
    /// thread gets exclusive access to the elements. Otherwise the buffer is
    /// returned unchanged.
    ///
    /// ```
    /// use cartbuf_container::{HostBuffer, Size};
    ///
    /// let buf = HostBuffer::<u32, 1>::new(Size::new([4])).unwrap();
    /// let sendable = buf.into_sendable().unwrap();
    /// let buf = std::thread::spawn(move || {
    ///     let mut buf = sendable.into_inner();
    ///     buf.set([0], 7).unwrap();
    ///     buf.into_sendable().unwrap()
    /// })
    /// .join()
    /// .unwrap()
    /// .into_inner();
    /// assert_eq!(buf.get([0]), Some(7));
    /// ```
    ///
    /// Aliases themselves cannot cross threads:
    ///
    /// ```compile_fail
    /// use cartbuf_container::{HostBuffer, Size};
    ///
    /// let mut a = HostBuffer::<u32, 1>::new(Size::new([4])).unwrap();
    /// let mut b = a.clone();
    /// let t = std::thread::spawn(move || b.set([0], 1).unwrap());
    /// a.set([0], 2).unwrap();
    /// t.join().unwrap();
    /// ```
    pub fn into_sendable(self) -> std::result::Result<SendableBuffer<T, D, A, C, G>, Self> {
        if self.ref_count() > 1 {
            return Err(self);
        }
        Ok(SendableBuffer(self))
    }

    /// Prepares the buffer to be moved to another thread while other aliases of
    /// the region may exist.
    ///
    /// # Safety
    ///
    /// No two threads may access the elements of the region at the same time
    /// unless all of them only read: element reads and writes through this buffer,
    /// its clones and any other alias must be ordered by the caller.
    pub unsafe fn into_sendable_unchecked(self) -> SendableBuffer<T, D, A, C, G> {
        SendableBuffer(self)
    }

    /// Sets every element to `value` through the assigner policy.
    pub fn assign(&mut self, value: T) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        unsafe { G::assign(self.ptr.as_ptr(), self.pitch, self.size, value) }
    }

    /// Copies the elements of `src` into this buffer through the copier policy.
    ///
    /// Unlike `clone`, this is a data copy: afterwards both buffers hold equal
    /// elements in separate memory (unless they already aliased each other).
    ///
    /// # Errors
    ///
    /// Returns an invalid-argument error if the sizes differ; the buffer is not
    /// modified in that case.
    pub fn copy_from(&mut self, src: &Self) -> Result<()> {
        verify_same_size(&self.size, &src.size)?;
        if self.is_empty() {
            return Ok(());
        }
        unsafe {
            C::copy(
                self.ptr.as_ptr(),
                self.pitch,
                src.ptr.as_ptr(),
                src.pitch,
                self.size,
            )
        }
    }

    /// Allocates a new buffer of the same size through a clone of this buffer's
    /// allocator and copies all elements into it.
    pub fn deep_clone(&self) -> Result<Self>
    where
        A: Clone,
    {
        let Some(alloc) = self.allocator() else {
            return Ok(Self::default());
        };
        let mut copy = Self::new_in(self.size, alloc.clone())?;
        copy.copy_from(self)?;
        Ok(copy)
    }

    /// Creates a buffer viewing the window of `size` elements starting at `offset`.
    ///
    /// The view aliases this buffer's region (sharing its ownership cell) and keeps
    /// its pitch.
    ///
    /// # Errors
    ///
    /// Returns an invalid-operation error if the window does not lie within the
    /// buffer.
    pub fn view(&self, offset: [usize; D], size: Size<D>) -> Result<Self> {
        let fits = offset
            .iter()
            .zip(size.as_array())
            .zip(self.size.as_array())
            .all(|((&start, &len), &extent)| {
                start.checked_add(len).is_some_and(|end| end <= extent)
            });
        if !fits {
            return Err(Error::invalid_operation(format!(
                "view at {offset:?} of size {size} exceeds buffer of size {}",
                self.size
            )));
        }
        let ptr = if size.is_empty() {
            self.ptr
        } else {
            let byte_offset = self
                .pitch
                .element_offset(&offset, std::mem::size_of::<T>());
            // In bounds: the window's first element lies inside the region.
            unsafe { self.ptr.byte_add(byte_offset) }
        };
        Ok(CartBuffer {
            ptr,
            size,
            pitch: self.pitch,
            region: self.region.clone(),
            _policies: PhantomData,
        })
    }
}

impl<T, A, C, G> CartBuffer<T, 1, A, C, G>
where
    T: Element,
    A: Allocator<T, 1> + Default,
    C: Copier<1, Space = A::Space>,
    G: Assigner<1, Space = A::Space>,
{
    pub fn new_1d(x: usize) -> Result<Self> {
        Self::new(Size::new([x]))
    }
}

impl<T, A, C, G> CartBuffer<T, 2, A, C, G>
where
    T: Element,
    A: Allocator<T, 2> + Default,
    C: Copier<2, Space = A::Space>,
    G: Assigner<2, Space = A::Space>,
{
    pub fn new_2d(x: usize, y: usize) -> Result<Self> {
        Self::new(Size::new([x, y]))
    }
}

impl<T, A, C, G> CartBuffer<T, 3, A, C, G>
where
    T: Element,
    A: Allocator<T, 3> + Default,
    C: Copier<3, Space = A::Space>,
    G: Assigner<3, Space = A::Space>,
{
    pub fn new_3d(x: usize, y: usize, z: usize) -> Result<Self> {
        Self::new(Size::new([x, y, z]))
    }
}

/// A buffer in transit to another thread, produced by
/// [`CartBuffer::into_sendable`].
pub struct SendableBuffer<T: Element, const D: usize, A: Allocator<T, D>, C, G>(
    CartBuffer<T, D, A, C, G>,
);

// SAFETY: `into_sendable` only wraps a buffer without other aliases, and
// `into_sendable_unchecked` leaves ordering of element accesses to the caller.
// The ownership cell is an `Arc`, the allocator is `Send + Sync` and the elements
// are `Send`.
unsafe impl<T: Element, const D: usize, A: Allocator<T, D>, C, G> Send
    for SendableBuffer<T, D, A, C, G>
{
}

impl<T: Element, const D: usize, A: Allocator<T, D>, C, G> SendableBuffer<T, D, A, C, G> {
    pub fn into_inner(self) -> CartBuffer<T, D, A, C, G> {
        self.0
    }
}

impl<T: Element, const D: usize, A: Allocator<T, D>, C, G> fmt::Debug
    for SendableBuffer<T, D, A, C, G>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SendableBuffer").field(&self.0).finish()
    }
}

/// Checks that two buffer sizes are equal, producing the invalid-argument error
/// reported by every shape-checked copy.
pub(crate) fn verify_same_size<const D: usize>(dst: &Size<D>, src: &Size<D>) -> Result<()> {
    if dst != src {
        return Err(Error::invalid_arg(
            "rhs",
            format!("sizes of buffers do not match: {dst} <-> {src}"),
        ));
    }
    Ok(())
}

impl<T: Element, const D: usize, A: Allocator<T, D>, C, G> Clone for CartBuffer<T, D, A, C, G> {
    /// Creates an alias of the same region; no element data is copied.
    fn clone(&self) -> Self {
        CartBuffer {
            ptr: self.ptr,
            size: self.size,
            pitch: self.pitch,
            region: self.region.clone(),
            _policies: PhantomData,
        }
    }
}

impl<T: Element, const D: usize, A: Allocator<T, D>, C, G> Default for CartBuffer<T, D, A, C, G> {
    fn default() -> Self {
        CartBuffer {
            ptr: NonNull::dangling(),
            size: Size::zero(),
            pitch: Pitch::zero(),
            region: None,
            _policies: PhantomData,
        }
    }
}

impl<T: Element, const D: usize, A: Allocator<T, D>, C, G> fmt::Debug
    for CartBuffer<T, D, A, C, G>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartBuffer")
            .field("space", &A::Space::KIND)
            .field("ptr", &self.ptr)
            .field("size", &self.size)
            .field("pitch", &self.pitch)
            .field("ownership", &self.region.as_ref().map(|r| r.ownership))
            .field(
                "ref_count",
                &self.region.as_ref().map_or(0, Arc::strong_count),
            )
            .finish()
    }
}

unsafe impl<T: Element, const D: usize, A: Allocator<T, D>, C, G> PitchedRegion<T, D>
    for CartBuffer<T, D, A, C, G>
{
    type Space = A::Space;

    fn size(&self) -> Size<D> {
        self.size
    }

    fn pitch(&self) -> Pitch<D> {
        self.pitch
    }

    fn data_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }
}

/// The region shared by all aliases of a buffer, together with the allocator that
/// releases it.
struct Region<T: Element, const D: usize, A: Allocator<T, D>> {
    base: NonNull<T>,
    size: Size<D>,
    pitch: Pitch<D>,
    ownership: Ownership,
    alloc: A,
}

impl<T: Element, const D: usize, A: Allocator<T, D>> Drop for Region<T, D, A> {
    fn drop(&mut self) {
        if self.ownership == Ownership::Owned {
            unsafe { self.alloc.release(self.base, self.size, self.pitch) };
        }
    }
}
