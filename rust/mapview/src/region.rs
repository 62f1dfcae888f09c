//! Backing regions: shared handles to a block of addressable memory.

use std::sync::Arc;

use mapview_bytes::AlignedBytes;
use mapview_common_traits::memory_owner::{MemoryAllocation, MemoryOwner};

/// A contiguous, externally owned block of memory that views can be bound to.
///
/// `Region` is a cheaply cloneable handle. Each clone (and each view bound
/// through one) holds the memory owner through an `Arc`, so the memory is
/// released only after the last handle is dropped.
///
/// Like a byte buffer, a region has a `position`: binding a view uses
/// `start + position` as the address of record 0.
#[derive(Clone)]
pub struct Region {
    owner: Arc<dyn MemoryOwner + Send + Sync + 'static>,
    start: usize,
    capacity: usize,
    position: usize,
    direct: bool,
}

impl Region {
    /// Creates a region over the memory of any `MemoryOwner`.
    ///
    /// The region covers the owner's `len` bytes.
    pub fn from_owner(owner: Arc<dyn MemoryOwner + Send + Sync + 'static>) -> Region {
        let MemoryAllocation { ptr, len, .. } = owner.memory();
        let direct = owner.is_direct();
        Region {
            owner,
            start: ptr as usize,
            capacity: len,
            position: 0,
            direct,
        }
    }

    /// Creates a region that takes ownership of `owner`.
    pub fn new<O>(owner: O) -> Region
    where
        O: MemoryOwner + Send + Sync + 'static,
    {
        Self::from_owner(Arc::new(owner))
    }

    /// Allocates a zeroed region of `len` bytes with the default alignment.
    pub fn zeroed(len: usize) -> Region {
        Self::new(AlignedBytes::zeroed(len))
    }

    /// Allocates a zeroed region of `len` bytes whose start is aligned to `alignment`
    /// (a power of two).
    pub fn zeroed_with_alignment(len: usize, alignment: usize) -> Region {
        Self::new(AlignedBytes::zeroed_with_alignment(len, alignment))
    }

    /// Allocates a region holding a copy of `data`.
    pub fn copy_from_slice(data: &[u8]) -> Region {
        Self::new(AlignedBytes::copy_from_slice(data))
    }

    /// Start address of the region.
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Size of the region in bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current read/write position, in bytes from the start.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of bytes between the position and the end of the region.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.capacity - self.position
    }

    /// Absolute address of the current position.
    #[inline]
    pub fn address(&self) -> usize {
        self.start + self.position
    }

    /// Returns `true` if the region has no start address.
    #[inline]
    pub fn is_null(&self) -> bool {
        self.start == 0
    }

    /// Returns `true` if the memory has a stable address for its lifetime.
    #[inline]
    pub fn is_direct(&self) -> bool {
        self.direct
    }

    /// Moves the position.
    ///
    /// # Panics
    ///
    /// Panics if `position` is beyond the end of the region.
    pub fn set_position(&mut self, position: usize) {
        assert!(
            position <= self.capacity,
            "position out of bounds: {position} > {}",
            self.capacity
        );
        self.position = position;
    }

    /// Returns this region with the position moved.
    ///
    /// # Panics
    ///
    /// Panics if `position` is beyond the end of the region.
    pub fn with_position(mut self, position: usize) -> Region {
        self.set_position(position);
        self
    }

    /// Creates a region over `capacity` bytes starting `offset` bytes into this
    /// one. The new region shares this region's owner and starts at position 0.
    ///
    /// # Panics
    ///
    /// Panics if the sub-range does not lie within this region.
    pub fn sub_region(&self, offset: usize, capacity: usize) -> Region {
        let end = offset.checked_add(capacity).expect("out of range");
        assert!(
            end <= self.capacity,
            "sub-region out of bounds: {end} > {}",
            self.capacity
        );
        Region {
            owner: self.owner.clone(),
            start: self.start + offset,
            capacity,
            position: 0,
            direct: self.direct,
        }
    }

    /// Returns the owner that keeps the memory alive.
    pub fn owner(&self) -> &Arc<dyn MemoryOwner + Send + Sync + 'static> {
        &self.owner
    }

    /// Returns the region's bytes.
    ///
    /// # Safety
    ///
    /// The region must describe valid memory, and no writes may be made into it
    /// (for example through views) while the returned slice is alive.
    pub unsafe fn as_slice(&self) -> &[u8] {
        if self.is_null() {
            return &[];
        }
        unsafe { std::slice::from_raw_parts(self.start as *const u8, self.capacity) }
    }
}

impl From<AlignedBytes> for Region {
    fn from(bytes: AlignedBytes) -> Region {
        Region::new(bytes)
    }
}

impl std::fmt::Debug for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Region")
            .field("start", &format_args!("{:#x}", self.start))
            .field("capacity", &self.capacity)
            .field("position", &self.position)
            .field("direct", &self.direct)
            .finish_non_exhaustive()
    }
}

/// Wraps `capacity` bytes starting at `address` as a new region.
///
/// This re-exposes a raw address (for example a computed sub-range of another
/// region) as fresh storage. The returned region does not own the memory and
/// does not keep it alive; [`crate::MappedView::region_at`] is the owning
/// alternative when the address comes from a view.
///
/// # Safety
///
/// `address..address + capacity` must be valid, writable memory for as long as
/// the returned region or any view bound to it is used.
pub unsafe fn make_region(address: usize, capacity: usize) -> Region {
    log::trace!("make_region: address={address:#x}, capacity={capacity}");
    Region::new(ForeignMemory { address, capacity })
}

/// Memory described by a raw address, owned elsewhere.
struct ForeignMemory {
    address: usize,
    capacity: usize,
}

unsafe impl MemoryOwner for ForeignMemory {
    fn memory(&self) -> MemoryAllocation {
        if self.address == 0 {
            return MemoryAllocation::null();
        }
        MemoryAllocation {
            ptr: self.address as *mut u8,
            len: self.capacity,
            capacity: self.capacity,
            // Largest power of two dividing the address.
            alignment: self.address & self.address.wrapping_neg(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroed_region() {
        let region = Region::zeroed(40);
        assert!(!region.is_null());
        assert!(region.is_direct());
        assert_eq!(region.capacity(), 40);
        assert_eq!(region.position(), 0);
        assert_eq!(region.address(), region.start());
        assert_eq!(region.start() % AlignedBytes::DEFAULT_ALIGNMENT, 0);
        assert!(unsafe { region.as_slice() }.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_position() {
        let mut region = Region::zeroed(32);
        region.set_position(12);
        assert_eq!(region.address(), region.start() + 12);
        assert_eq!(region.remaining(), 20);

        let region = region.with_position(32);
        assert_eq!(region.remaining(), 0);
    }

    #[test]
    #[should_panic]
    fn test_position_out_of_bounds() {
        let _ = Region::zeroed(8).with_position(9);
    }

    #[test]
    fn test_clones_share_owner() {
        let owner = Arc::new(AlignedBytes::zeroed(16));
        let region = Region::from_owner(owner.clone());
        assert_eq!(Arc::strong_count(&owner), 2);

        let clone = region.clone();
        let sub = region.sub_region(4, 8);
        assert_eq!(Arc::strong_count(&owner), 4);
        assert_eq!(Arc::strong_count(region.owner()), 4);

        drop(region);
        drop(clone);
        assert_eq!(Arc::strong_count(&owner), 2);
        assert_eq!(sub.capacity(), 8);
        drop(sub);
        assert_eq!(Arc::strong_count(&owner), 1);
    }

    #[test]
    fn test_sub_region() {
        let region = Region::copy_from_slice(&[0, 1, 2, 3, 4, 5, 6, 7]);
        let sub = region.sub_region(2, 4);
        assert_eq!(sub.start(), region.start() + 2);
        assert_eq!(unsafe { sub.as_slice() }, &[2, 3, 4, 5]);
    }

    #[test]
    #[should_panic]
    fn test_sub_region_out_of_bounds() {
        let region = Region::zeroed(8);
        let _ = region.sub_region(4, 5);
    }

    #[test]
    fn test_make_region() {
        let backing = AlignedBytes::copy_from_slice(&[9, 8, 7, 6]);
        let region = unsafe { make_region(backing.as_ptr() as usize, 4) };
        assert_eq!(region.start(), backing.as_ptr() as usize);
        assert_eq!(region.capacity(), 4);
        assert!(region.is_direct());
        assert_eq!(unsafe { region.as_slice() }, &[9, 8, 7, 6]);
        assert_eq!(
            region.owner().memory().alignment % AlignedBytes::DEFAULT_ALIGNMENT,
            0
        );
    }

    #[test]
    fn test_make_null_region() {
        let region = unsafe { make_region(0, 16) };
        assert!(region.is_null());
        assert_eq!(region.capacity(), 0);
        assert!(unsafe { region.as_slice() }.is_empty());
    }

    #[test]
    fn test_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Region>();
    }
}
