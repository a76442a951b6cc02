/// Aligns a number up to the next multiple of the specified alignment.
///
/// If the input is already aligned, it is returned unchanged. Returns `None` if the
/// rounded value does not fit into `usize`.
///
/// # Examples
///
/// ```
/// use cartbuf_geometry::align::align_up;
///
/// assert_eq!(align_up(0, 256), Some(0));
/// assert_eq!(align_up(1, 256), Some(256));
/// assert_eq!(align_up(256, 256), Some(256));
/// assert_eq!(align_up(257, 256), Some(512));
/// assert_eq!(align_up(usize::MAX, 256), None);
/// ```
///
/// # Panics
///
/// This function will panic in debug builds if `alignment` is 0 or not a power of 2.
#[inline]
pub fn align_up(n: usize, alignment: usize) -> Option<usize> {
    debug_assert_ne!(alignment, 0);
    debug_assert!(alignment.is_power_of_two());
    Some(n.checked_add(alignment - 1)? & !(alignment - 1))
}

/// Checks if a number is aligned to the specified alignment boundary.
///
/// # Examples
///
/// ```
/// use cartbuf_geometry::align::is_aligned;
///
/// assert!(is_aligned(0, 8));
/// assert!(!is_aligned(1, 8));
/// assert!(is_aligned(16, 8));
/// ```
///
/// # Panics
///
/// This function will panic in debug builds if `alignment` is 0 or not a power of 2.
#[inline]
pub fn is_aligned(n: usize, alignment: usize) -> bool {
    debug_assert_ne!(alignment, 0);
    debug_assert!(alignment.is_power_of_two());
    (n & (alignment - 1)) == 0
}

/// Checks whether a pointer is aligned to `alignment` bytes.
#[inline]
pub fn is_ptr_aligned<T>(ptr: *const T, alignment: usize) -> bool {
    alignment.is_power_of_two() && is_aligned(ptr as usize, alignment)
}
