//! Record layout: the alignment and stride a view is bound with.

use mapview_common::{Error, Result, result::verify};

/// A validated `(align, stride)` pair.
///
/// `align` is positive and `stride` is a positive multiple of `align`. The
/// alignment does not have to be a power of two.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RecordLayout {
    align: usize,
    stride: usize,
}

impl RecordLayout {
    /// Validates and creates a layout.
    ///
    /// # Errors
    ///
    /// - `InvalidAlignment` if `align` is zero.
    /// - `MisalignedSize` if `stride` is zero or not a multiple of `align`.
    pub fn new(align: usize, stride: usize) -> Result<RecordLayout> {
        verify(align != 0, || Error::invalid_alignment(align))?;
        verify(stride != 0 && stride.is_multiple_of(align), || {
            Error::misaligned_size(stride, align)
        })?;
        Ok(RecordLayout { align, stride })
    }

    /// Layout of a plain-old-data record type: its natural alignment and size.
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized.
    pub fn of<T>() -> RecordLayout
    where
        T: bytemuck::Pod,
    {
        let stride = std::mem::size_of::<T>();
        assert_ne!(stride, 0, "zero-sized records cannot be addressed");
        RecordLayout {
            align: std::mem::align_of::<T>(),
            stride,
        }
    }

    #[inline]
    pub fn align(&self) -> usize {
        self.align
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }
}
