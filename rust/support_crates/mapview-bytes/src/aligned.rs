//! Fixed-size heap blocks with a guaranteed start alignment.

use std::alloc::{self, Layout};
use std::ptr::NonNull;

use mapview_common_traits::memory_owner::{MemoryAllocation, MemoryOwner};

use crate::align::{align_up, is_ptr_aligned};

/// A fixed-size, zero-initialized heap block whose start address is aligned to
/// a caller-chosen power of two.
///
/// Unlike a `Vec<u8>`, the block never grows or moves, so raw addresses taken
/// from it remain valid until it is dropped. The memory is reached through a
/// raw pointer rather than through an owned slice, which keeps writes made by
/// views (through that pointer, while the block is shared) well-defined.
///
/// The allocation size is rounded up to [`AlignedBytes::BLOCK_SIZE`]; the extra
/// bytes are zeroed and reported as capacity.
pub struct AlignedBytes {
    ptr: NonNull<u8>,
    len: usize,
    capacity: usize,
    alignment: usize,
}

// SAFETY: `AlignedBytes` exclusively owns its allocation. Concurrent writes
// through raw addresses are the caller's responsibility, as with any raw memory.
unsafe impl Send for AlignedBytes {}

unsafe impl Sync for AlignedBytes {}

impl AlignedBytes {
    /// Alignment used when none is requested.
    pub const DEFAULT_ALIGNMENT: usize = 64;
    /// Granularity of the allocation size.
    pub const BLOCK_SIZE: usize = 64;

    /// Allocates a zeroed block of `len` bytes with [`Self::DEFAULT_ALIGNMENT`].
    pub fn zeroed(len: usize) -> AlignedBytes {
        Self::zeroed_with_alignment(len, Self::DEFAULT_ALIGNMENT)
    }

    /// Allocates a zeroed block of `len` bytes whose start is aligned to `alignment`.
    ///
    /// # Panics
    ///
    /// Panics if `alignment` is not a power of two, or if the rounded allocation
    /// size overflows.
    pub fn zeroed_with_alignment(len: usize, alignment: usize) -> AlignedBytes {
        let alignment = alignment.max(1);
        assert!(
            alignment.is_power_of_two(),
            "alignment must be a power of two: {alignment}"
        );

        let capacity = align_up(len.max(1), Self::BLOCK_SIZE);
        let layout = Layout::from_size_align(capacity, alignment).expect("layout");
        // SAFETY: `layout` has a non-zero size.
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let Some(ptr) = NonNull::new(raw) else {
            alloc::handle_alloc_error(layout);
        };
        debug_assert!(is_ptr_aligned(ptr.as_ptr(), alignment));

        AlignedBytes {
            ptr,
            len,
            capacity,
            alignment,
        }
    }

    /// Allocates a block with [`Self::DEFAULT_ALIGNMENT`] holding a copy of `data`.
    pub fn copy_from_slice(data: &[u8]) -> AlignedBytes {
        let mut bytes = Self::zeroed(data.len());
        bytes.as_mut_slice().copy_from_slice(data);
        bytes
    }

    /// Allocates a zeroed block sized for `count` values of `T`, aligned to at least
    /// `align_of::<T>()`.
    pub fn zeroed_for<T>(count: usize) -> AlignedBytes
    where
        T: bytemuck::Pod,
    {
        let len = count
            .checked_mul(std::mem::size_of::<T>())
            .expect("size overflow");
        let alignment = std::mem::align_of::<T>().max(Self::DEFAULT_ALIGNMENT);
        Self::zeroed_with_alignment(len, alignment)
    }

    /// Returns the requested length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the requested length is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the size of the allocation in bytes, always a multiple of
    /// [`Self::BLOCK_SIZE`] and at least `len`.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the alignment of the start address.
    #[inline]
    pub fn alignment(&self) -> usize {
        self.alignment
    }

    /// Returns a raw pointer to the start of the block.
    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    /// Returns a mutable raw pointer to the start of the block.
    ///
    /// The pointer is derived from the allocation itself, not from a borrow of
    /// `self`, so it may be written through while the block is shared.
    #[inline]
    pub fn as_mut_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Returns the first `len` bytes of the block.
    ///
    /// The caller must not hold this slice across writes made through raw
    /// addresses into the same block.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// Returns the first `len` bytes of the block, mutably.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    fn layout(&self) -> Layout {
        Layout::from_size_align(self.capacity, self.alignment).expect("layout")
    }
}

impl Drop for AlignedBytes {
    fn drop(&mut self) {
        // SAFETY: allocated in `zeroed_with_alignment` with the same layout.
        unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout()) };
    }
}

impl std::fmt::Debug for AlignedBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlignedBytes")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .field("capacity", &self.capacity)
            .field("alignment", &self.alignment)
            .finish_non_exhaustive()
    }
}

unsafe impl MemoryOwner for AlignedBytes {
    fn memory(&self) -> MemoryAllocation {
        MemoryAllocation {
            ptr: self.as_mut_ptr(),
            len: self.len,
            capacity: self.capacity,
            alignment: self.alignment,
        }
    }
}
