//! Host-memory buffers and the accelerator-to-host transfer.

use cartbuf_common::{Result, error::Error, verify_arg};
use cartbuf_common_traits::{
    memory_space::{Host, MemorySpace},
    pitched_region::PitchedRegion,
};
use cartbuf_geometry::{Pitch, Size};

use crate::allocator::{Allocator, HostMemAllocator};
use crate::assigner::{Assigner, HostMemAssigner};
use crate::cart_buffer::{CartBuffer, verify_same_size};
use crate::copier::{Copier, H2HCopier};
use crate::element::Element;
use crate::memcopy::{MemcopyDirection, TransferEngine, copy_pitched};
use crate::space::AcceleratorSpace;

/// A buffer in host memory with the default host policies.
pub type HostBuffer<T, const D: usize> =
    CartBuffer<T, D, HostMemAllocator, H2HCopier, HostMemAssigner>;

impl<T, const D: usize, A, C, G> CartBuffer<T, D, A, C, G>
where
    T: Element,
    A: Allocator<T, D, Space = Host>,
    C: Copier<D, Space = Host>,
    G: Assigner<D, Space = Host>,
{
    /// Allocates a buffer of `size` elements and fills it from the tight-packed
    /// `data` (innermost dimension first).
    pub fn from_slice(size: Size<D>, data: &[T]) -> Result<Self>
    where
        A: Default,
    {
        verify_slice_len(&size, data)?;
        let mut buf = Self::new(size)?;
        buf.copy_from_slice(data)?;
        Ok(buf)
    }

    /// Returns the element at `index`, or `None` if `index` is out of bounds.
    pub fn get(&self, index: [usize; D]) -> Option<T> {
        if !self.size().contains(&index) {
            return None;
        }
        let offset = self
            .pitch()
            .element_offset(&index, std::mem::size_of::<T>());
        // In bounds of the region; host memory is directly addressable.
        Some(unsafe { self.data_ptr().byte_add(offset).read() })
    }

    /// Sets the element at `index` to `value`.
    ///
    /// The write is visible through every alias of the buffer.
    pub fn set(&mut self, index: [usize; D], value: T) -> Result<()> {
        if !self.size().contains(&index) {
            return Err(Error::invalid_arg(
                "index",
                format!("{index:?} is out of bounds for size {}", self.size()),
            ));
        }
        let offset = self
            .pitch()
            .element_offset(&index, std::mem::size_of::<T>());
        unsafe { self.data_ptr_mut().byte_add(offset).write(value) };
        Ok(())
    }

    /// Copies the elements into a tight-packed vector, innermost dimension first.
    pub fn to_vec(&self) -> Vec<T> {
        let size = self.size();
        let len = size.len();
        let mut out = Vec::<T>::with_capacity(len);
        unsafe {
            copy_pitched(
                out.as_mut_ptr(),
                Pitch::dense(&size, std::mem::size_of::<T>()),
                self.data_ptr(),
                self.pitch(),
                size,
            );
            out.set_len(len);
        }
        out
    }

    /// Overwrites the elements from the tight-packed `data`.
    ///
    /// # Errors
    ///
    /// Returns an invalid-argument error if `data.len()` differs from the element
    /// count; the buffer is not modified in that case.
    pub fn copy_from_slice(&mut self, data: &[T]) -> Result<()> {
        let size = self.size();
        verify_slice_len(&size, data)?;
        let pitch = self.pitch();
        unsafe {
            copy_pitched(
                self.data_ptr_mut(),
                pitch,
                data.as_ptr(),
                Pitch::dense(&size, std::mem::size_of::<T>()),
                size,
            )
        };
        Ok(())
    }

    /// Copies the contents of an accelerator buffer into this host buffer.
    ///
    /// Only the element data moves: this buffer keeps its own memory, pitch and
    /// aliases, and every alias observes the new contents. Both pitches are
    /// honored, so a padded accelerator layout lands correctly in a tight host
    /// layout. The copy has completed when the call returns.
    ///
    /// Sources must live in an accelerator memory space; a host source is
    /// rejected at compile time:
    ///
    /// ```compile_fail
    /// use cartbuf_container::{HostBuffer, Size};
    ///
    /// let src = HostBuffer::<f32, 2>::new(Size::new([4, 4])).unwrap();
    /// let mut dst = HostBuffer::<f32, 2>::new(Size::new([4, 4])).unwrap();
    /// dst.assign_from_accelerator(&src).unwrap();
    /// ```
    ///
    /// and so is a source with a different element type or dimension:
    ///
    /// ```compile_fail
    /// use cartbuf_container::{DeviceBuffer, HostBuffer, Size};
    ///
    /// let src = DeviceBuffer::<i32, 2>::new(Size::new([4, 4])).unwrap();
    /// let mut dst = HostBuffer::<f32, 2>::new(Size::new([4, 4])).unwrap();
    /// dst.assign_from_accelerator(&src).unwrap();
    /// ```
    ///
    /// ```
    /// use cartbuf_container::{DeviceBuffer, HostBuffer, Size};
    ///
    /// let mut src = DeviceBuffer::<f32, 2>::new(Size::new([4, 4])).unwrap();
    /// src.assign(1.5).unwrap();
    /// let mut dst = HostBuffer::<f32, 2>::new(Size::new([4, 4])).unwrap();
    /// dst.assign_from_accelerator(&src).unwrap();
    /// assert!(dst.to_vec().iter().all(|&v| v == 1.5));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an invalid-argument error if the sizes differ, in which case the
    /// buffer is left untouched. Errors reported by the transfer engine are
    /// propagated; the buffer contents are unspecified afterwards.
    pub fn assign_from_accelerator<S>(&mut self, src: &S) -> Result<&mut Self>
    where
        S: PitchedRegion<T, D>,
        S::Space: AcceleratorSpace,
    {
        let size = self.size();
        verify_same_size(&size, &src.size())?;
        if size.is_empty() {
            return Ok(self);
        }
        let direction = MemcopyDirection::new(S::Space::KIND, Host::KIND);
        let pitch = self.pitch();
        unsafe {
            <S::Space as AcceleratorSpace>::Engine::memcopy(
                self.data_ptr_mut(),
                pitch,
                src.data_ptr(),
                src.pitch(),
                size,
                direction,
            )?
        };
        Ok(self)
    }
}

fn verify_slice_len<T, const D: usize>(size: &Size<D>, data: &[T]) -> Result<()> {
    verify_arg!(data, size.checked_len() == Some(data.len()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slice_and_get() {
        let data: Vec<u16> = (0..12).collect();
        let buf = HostBuffer::<u16, 3>::from_slice(Size::new([3, 2, 2]), &data).unwrap();
        assert_eq!(buf.get([0, 0, 0]), Some(0));
        assert_eq!(buf.get([2, 0, 0]), Some(2));
        assert_eq!(buf.get([0, 1, 0]), Some(3));
        assert_eq!(buf.get([1, 1, 1]), Some(10));
        assert_eq!(buf.get([3, 0, 0]), None);
        assert_eq!(buf.get([0, 0, 2]), None);
        assert_eq!(buf.to_vec(), data);
    }

    #[test]
    fn test_from_slice_length_mismatch() {
        let e = HostBuffer::<u16, 2>::from_slice(Size::new([3, 2]), &[1, 2, 3]).unwrap_err();
        assert!(e.is_invalid_arg());
        assert_eq!(
            e.to_string(),
            "invalid argument data: size.checked_len() == Some(data.len())"
        );
    }

    #[test]
    fn test_set_visible_through_aliases() {
        let mut a = HostBuffer::<i64, 2>::new(Size::new([4, 4])).unwrap();
        let b = a.clone();
        a.set([3, 2], -5).unwrap();
        assert_eq!(b.get([3, 2]), Some(-5));
        assert!(a.set([4, 0], 1).unwrap_err().is_invalid_arg());
    }

    #[test]
    fn test_assign_and_to_vec() {
        let mut buf = HostBuffer::<f32, 1>::new(Size::new([5])).unwrap();
        assert_eq!(buf.to_vec(), vec![0.0; 5]);
        buf.assign(2.5).unwrap();
        assert_eq!(buf.to_vec(), vec![2.5; 5]);
    }

    #[test]
    fn test_copy_from_slice_mismatch_leaves_buffer() {
        let mut buf = HostBuffer::<u8, 1>::from_slice(Size::new([3]), &[1, 2, 3]).unwrap();
        assert!(buf.copy_from_slice(&[9, 9]).is_err());
        assert_eq!(buf.to_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn test_view_reads_window() {
        let data: Vec<u32> = (0..24).collect();
        let buf = HostBuffer::<u32, 2>::from_slice(Size::new([6, 4]), &data).unwrap();
        let mut view = buf.view([2, 1], Size::new([3, 2])).unwrap();
        assert_eq!(view.to_vec(), vec![8, 9, 10, 14, 15, 16]);
        view.assign(0).unwrap();
        assert_eq!(buf.get([2, 1]), Some(0));
        assert_eq!(buf.get([5, 1]), Some(11));
        assert_eq!(buf.get([4, 2]), Some(0));
        assert_eq!(buf.get([1, 2]), Some(13));
    }
}
