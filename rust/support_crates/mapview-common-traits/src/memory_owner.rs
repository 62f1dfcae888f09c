//! `MemoryOwner`: a trait for types that own a contiguous block of addressable memory.

/// A trait for types that own a contiguous memory block which views may address
/// by raw pointer.
///
/// # Safety
///
/// Implementors must guarantee that:
/// - The block described by `memory()` stays valid and at the same address for
///   the entire lifetime of the owner. If it cannot (for example, storage that may
///   be relocated), `is_direct()` must return `false`.
/// - The reported `len` and `capacity` are accurate and `len <= capacity`.
/// - Writes through the pointer are permitted: the block is not placed in
///   read-only memory and the owner does not hand out references that assume
///   the bytes never change.
pub unsafe trait MemoryOwner {
    /// Returns information about the owned memory block.
    fn memory(&self) -> MemoryAllocation;

    /// Whether the block has a stable, directly addressable location.
    fn is_direct(&self) -> bool {
        true
    }
}

/// Represents a block of allocated memory with its size information.
#[derive(Debug, Clone, Copy)]
pub struct MemoryAllocation {
    /// Pointer to the start of the allocated memory.
    pub ptr: *mut u8,
    /// Current length of the allocated memory in bytes.
    pub len: usize,
    /// Total capacity of the allocated memory in bytes.
    pub capacity: usize,
    /// Formal alignment of the memory block.
    pub alignment: usize,
}

impl MemoryAllocation {
    /// A descriptor for a block that does not exist.
    pub const fn null() -> MemoryAllocation {
        MemoryAllocation {
            ptr: std::ptr::null_mut(),
            len: 0,
            capacity: 0,
            alignment: 1,
        }
    }

    /// Start address of the block as an integer.
    #[inline]
    pub fn address(&self) -> usize {
        self.ptr as usize
    }

    /// Returns `true` if the block has no start address.
    #[inline]
    pub fn is_null(&self) -> bool {
        self.ptr.is_null()
    }
}
