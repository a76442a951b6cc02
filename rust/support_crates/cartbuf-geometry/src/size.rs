//! `Size`: the per-dimension extent of a buffer, in elements.

use std::fmt;
use std::ops::Index;

use crate::assert_supported_dim;

/// Per-dimension element counts of a `D`-dimensional buffer.
///
/// Component `0` is the innermost (contiguous) dimension. A size with any zero
/// component is valid and describes an empty buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size<const D: usize>([usize; D]);

impl<const D: usize> Size<D> {
    /// Creates a size from its extents, innermost dimension first.
    #[inline]
    pub const fn new(extents: [usize; D]) -> Size<D> {
        assert_supported_dim::<D>();
        Size(extents)
    }

    /// Creates a size with every extent set to zero.
    #[inline]
    pub const fn zero() -> Size<D> {
        Self::new([0; D])
    }

    /// Extent of the innermost dimension.
    #[inline]
    pub fn x(&self) -> usize {
        self.0[0]
    }

    /// Extent of dimension `i`, or `None` if `i >= D`.
    #[inline]
    pub fn get(&self, i: usize) -> Option<usize> {
        self.0.get(i).copied()
    }

    #[inline]
    pub fn as_array(&self) -> &[usize; D] {
        &self.0
    }

    /// Total number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.iter().product()
    }

    /// Total number of elements, or `None` on overflow.
    pub fn checked_len(&self) -> Option<usize> {
        self.0.iter().try_fold(1usize, |acc, &e| acc.checked_mul(e))
    }

    /// Returns `true` if any extent is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.contains(&0)
    }

    /// Number of rows, i.e. the product of all extents above the first.
    ///
    /// A 1-D size always has a single row.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.0[1..].iter().product()
    }

    /// Maps a linear row number to its `(y, z)` coordinates.
    ///
    /// Rows are numbered with `y` varying fastest. For 1-D sizes the result is
    /// always `(0, 0)`, for 2-D sizes `z` is always `0`.
    #[inline]
    pub fn row_coords(&self, row: usize) -> (usize, usize) {
        let height = self.get(1).unwrap_or(1);
        if height == 0 {
            return (0, 0);
        }
        (row % height, row / height)
    }

    /// Returns `true` if `index` addresses an element inside this extent.
    #[inline]
    pub fn contains(&self, index: &[usize; D]) -> bool {
        index.iter().zip(self.0.iter()).all(|(&i, &e)| i < e)
    }
}

impl Size<2> {
    /// Extent of the second dimension.
    #[inline]
    pub fn y(&self) -> usize {
        self.0[1]
    }
}

impl Size<3> {
    /// Extent of the second dimension.
    #[inline]
    pub fn y(&self) -> usize {
        self.0[1]
    }

    /// Extent of the third dimension.
    #[inline]
    pub fn z(&self) -> usize {
        self.0[2]
    }
}

impl<const D: usize> Default for Size<D> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<const D: usize> From<[usize; D]> for Size<D> {
    #[inline]
    fn from(extents: [usize; D]) -> Self {
        Size::new(extents)
    }
}

impl<const D: usize> Index<usize> for Size<D> {
    type Output = usize;

    #[inline]
    fn index(&self, index: usize) -> &usize {
        &self.0[index]
    }
}

impl<const D: usize> fmt::Display for Size<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, e) in self.0.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{e}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let s = Size::new([4, 3, 2]);
        assert_eq!(s.x(), 4);
        assert_eq!(s.y(), 3);
        assert_eq!(s.z(), 2);
        assert_eq!(s[1], 3);
        assert_eq!(s.get(2), Some(2));
        assert_eq!(s.get(3), None);
        assert_eq!(s.len(), 24);
        assert_eq!(s.row_count(), 6);
        assert!(!s.is_empty());

        let s = Size::new([7]);
        assert_eq!(s.x(), 7);
        assert_eq!(s.row_count(), 1);
        assert_eq!(s.row_coords(0), (0, 0));
    }

    #[test]
    fn test_equality() {
        assert_eq!(Size::new([4, 4]), Size::from([4, 4]));
        assert_ne!(Size::new([4, 4, 4]), Size::new([4, 4, 2]));
        assert_eq!(Size::<3>::default(), Size::zero());
    }

    #[test]
    fn test_empty() {
        assert!(Size::new([0, 5]).is_empty());
        assert!(Size::new([5, 5, 0]).is_empty());
        assert_eq!(Size::new([5, 0, 5]).len(), 0);
        assert_eq!(Size::new([3, 0, 2]).row_coords(4), (0, 0));
    }

    #[test]
    fn test_row_coords() {
        let s = Size::new([8, 3, 2]);
        let coords: Vec<_> = (0..s.row_count()).map(|r| s.row_coords(r)).collect();
        assert_eq!(
            coords,
            vec![(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]
        );

        let s = Size::new([8, 3]);
        assert_eq!(s.row_coords(2), (2, 0));
    }

    #[test]
    fn test_contains() {
        let s = Size::new([4, 2]);
        assert!(s.contains(&[3, 1]));
        assert!(!s.contains(&[4, 1]));
        assert!(!s.contains(&[0, 2]));
    }

    #[test]
    fn test_checked_len() {
        assert_eq!(Size::new([2, 3]).checked_len(), Some(6));
        assert_eq!(Size::new([usize::MAX, 2]).checked_len(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Size::new([4, 4, 2]).to_string(), "(4, 4, 2)");
        assert_eq!(Size::new([9]).to_string(), "(9)");
    }
}
