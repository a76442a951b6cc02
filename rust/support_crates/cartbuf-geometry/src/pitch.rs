//! `Pitch`: byte strides of the dimensions above the first.

use std::fmt;
use std::ops::Index;

use crate::{Size, align::align_up, assert_supported_dim};

/// Byte strides of a `D`-dimensional pitched buffer.
///
/// A pitch holds `D - 1` components: `pitch[0]` is the distance in bytes between
/// two consecutive rows (successive `y`), `pitch[1]` the distance between two
/// consecutive slices (successive `z`). Both may include padding beyond the
/// tight-packed size.
///
/// A zero component means "not specified"; [`Pitch::resolve`] replaces such
/// components with the tight-packed stride.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pitch<const D: usize>([usize; 2]);

impl<const D: usize> Pitch<D> {
    /// Creates a pitch with every component unspecified.
    #[inline]
    pub const fn zero() -> Pitch<D> {
        assert_supported_dim::<D>();
        Pitch([0; 2])
    }

    /// Tight-packed pitch for `size` with elements of `elem_size` bytes.
    #[inline]
    pub fn dense(size: &Size<D>, elem_size: usize) -> Pitch<D> {
        Self::zero().resolve(size, elem_size)
    }

    /// Pitch for `size` whose rows are padded to a multiple of `row_alignment` bytes.
    ///
    /// The slice stride of a 3-D pitch is the padded row stride times `size.y()`.
    /// Returns `None` if a stride overflows `usize`.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `row_alignment` is not a power of two.
    pub fn padded(size: &Size<D>, elem_size: usize, row_alignment: usize) -> Option<Pitch<D>> {
        let mut strides = Self::zero().0;
        if D >= 2 {
            strides[0] = align_up(size.x().checked_mul(elem_size)?, row_alignment)?;
        }
        if D == 3 {
            strides[1] = strides[0].checked_mul(size.get(1).unwrap_or(1))?;
        }
        Some(Pitch(strides))
    }

    /// Fills every unspecified (zero) component with the tight-packed stride,
    /// leaving explicit components untouched:
    ///
    /// - `pitch[0] = size.x() * elem_size`
    /// - `pitch[1] = pitch[0] * size.y()`
    ///
    /// The strides saturate at `usize::MAX` instead of wrapping.
    pub fn resolve(self, size: &Size<D>, elem_size: usize) -> Pitch<D> {
        let mut strides = self.0;
        if D >= 2 && strides[0] == 0 {
            strides[0] = size.x().saturating_mul(elem_size);
        }
        if D == 3 && strides[1] == 0 {
            strides[1] = strides[0].saturating_mul(size.get(1).unwrap_or(1));
        }
        Pitch(strides)
    }

    /// Returns `true` if no component has been specified.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == [0; 2]
    }

    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.0[..D - 1]
    }

    /// Stride of dimension `i + 1`, or `None` if `i >= D - 1`.
    #[inline]
    pub fn get(&self, i: usize) -> Option<usize> {
        self.as_slice().get(i).copied()
    }

    /// Byte offset of the first element of row `(y, z)`.
    #[inline]
    pub fn row_offset(&self, y: usize, z: usize) -> usize {
        y * self.0[0] + z * self.0[1]
    }

    /// Byte offset of the element at `index`, given elements of `elem_size` bytes.
    #[inline]
    pub fn element_offset(&self, index: &[usize; D], elem_size: usize) -> usize {
        let y = index.get(1).copied().unwrap_or(0);
        let z = index.get(2).copied().unwrap_or(0);
        index[0] * elem_size + self.row_offset(y, z)
    }

    /// Number of bytes spanned by a region of `size` laid out with this pitch,
    /// from the first element to one past the last element.
    ///
    /// Returns `None` if the computation overflows.
    pub fn checked_byte_len(&self, size: &Size<D>, elem_size: usize) -> Option<usize> {
        if size.is_empty() {
            return Some(0);
        }
        let last_y = size.get(1).map_or(0, |e| e - 1);
        let last_z = size.get(2).map_or(0, |e| e - 1);
        let last_row = last_y
            .checked_mul(self.0[0])?
            .checked_add(last_z.checked_mul(self.0[1])?)?;
        last_row.checked_add(size.x().checked_mul(elem_size)?)
    }
}

impl Pitch<2> {
    /// Creates a 2-D pitch from its row stride.
    #[inline]
    pub const fn new(row: usize) -> Pitch<2> {
        Pitch([row, 0])
    }
}

impl Pitch<3> {
    /// Creates a 3-D pitch from its row and slice strides.
    #[inline]
    pub const fn new(row: usize, slice: usize) -> Pitch<3> {
        Pitch([row, slice])
    }
}

impl<const D: usize> Default for Pitch<D> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<const D: usize> Index<usize> for Pitch<D> {
    type Output = usize;

    #[inline]
    fn index(&self, index: usize) -> &usize {
        &self.as_slice()[index]
    }
}

impl<const D: usize> fmt::Display for Pitch<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, p) in self.as_slice().iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{p}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dense_3d() {
        let size = Size::new([5, 3, 2]);
        let pitch = Pitch::dense(&size, 4);
        assert_eq!(pitch, Pitch::<3>::new(20, 60));
        assert_eq!(pitch[0], 20);
        assert_eq!(pitch[1], 60);
        assert_eq!(pitch.as_slice(), &[20, 60]);
    }

    #[test]
    fn test_dense_2d_and_1d() {
        assert_eq!(Pitch::dense(&Size::new([7, 9]), 8), Pitch::<2>::new(56));
        let p = Pitch::dense(&Size::new([7]), 8);
        assert!(p.as_slice().is_empty());
        assert!(p.is_zero());
    }

    #[test]
    fn test_explicit_pitch_passes_through() {
        let size = Size::new([5, 3, 2]);
        let explicit = Pitch::<3>::new(64, 512);
        assert_eq!(explicit.resolve(&size, 4), explicit);

        // Explicit pitches are trusted even when below the tight-packed stride.
        let tiny = Pitch::<3>::new(4, 8);
        assert_eq!(tiny.resolve(&size, 4), tiny);
    }

    #[test]
    fn test_partial_pitch() {
        let size = Size::new([5, 3, 2]);
        // Row stride given, slice stride derived from it.
        assert_eq!(
            Pitch::<3>::new(32, 0).resolve(&size, 4),
            Pitch::<3>::new(32, 96)
        );
        // Slice stride given, row stride derived from size.
        assert_eq!(
            Pitch::<3>::new(0, 1000).resolve(&size, 4),
            Pitch::<3>::new(20, 1000)
        );
    }

    #[test]
    fn test_padded() {
        let size = Size::new([5, 3, 2]);
        assert_eq!(Pitch::padded(&size, 4, 256), Some(Pitch::<3>::new(256, 768)));
        assert_eq!(
            Pitch::padded(&Size::new([64, 3]), 4, 256),
            Some(Pitch::<2>::new(256))
        );
        assert_eq!(Pitch::padded(&Size::new([65, 3]), 4, 256), Some(Pitch::<2>::new(512)));
        assert!(Pitch::padded(&Size::new([10]), 4, 256).unwrap().is_zero());
        assert_eq!(Pitch::padded(&Size::new([usize::MAX, 2]), 4, 256), None);
    }

    #[test]
    fn test_offsets() {
        let pitch = Pitch::<3>::new(256, 1024);
        assert_eq!(pitch.row_offset(2, 1), 1536);
        assert_eq!(pitch.element_offset(&[3, 2, 1], 4), 1548);
        assert_eq!(Pitch::<1>::zero().element_offset(&[5], 8), 40);
    }

    #[test]
    fn test_byte_len() {
        let size = Size::new([5, 3, 2]);
        let pitch = Pitch::<3>::new(256, 1024);
        assert_eq!(pitch.checked_byte_len(&size, 4), Some(1024 + 2 * 256 + 20));
        assert_eq!(Pitch::dense(&size, 4).checked_byte_len(&size, 4), Some(120));
        assert_eq!(pitch.checked_byte_len(&Size::new([5, 0, 2]), 4), Some(0));
        let huge = Size::new([usize::MAX, 2]);
        assert_eq!(Pitch::dense(&huge, 4).checked_byte_len(&huge, 4), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Pitch::<3>::new(16, 64).to_string(), "[16, 64]");
        assert_eq!(Pitch::<1>::zero().to_string(), "[]");
    }
}
