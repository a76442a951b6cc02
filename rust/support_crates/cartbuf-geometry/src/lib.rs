//! Geometry value types for pitched multi-dimensional buffers.
//!
//! - [`Size`]: per-dimension element counts (the extent of a buffer).
//! - [`Pitch`]: byte strides for every dimension above the first, accounting for
//!   row padding.
//! - [`align`]: power-of-two alignment helpers used when computing padded pitches.
//!
//! Both geometry types are parameterized by the dimension `D`, which must be 1, 2
//! or 3. Other dimensions are rejected at compile time.

pub mod align;
pub mod pitch;
pub mod size;

pub use pitch::Pitch;
pub use size::Size;

/// Compile-time check that `D` is a supported buffer dimension.
#[inline(always)]
pub(crate) const fn assert_supported_dim<const D: usize>() {
    const { assert!(D >= 1 && D <= 3, "buffer dimension must be 1, 2 or 3") }
}
