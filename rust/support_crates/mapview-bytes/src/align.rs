/// Aligns a number up to the next multiple of the specified alignment.
///
/// If the input is already aligned, it is returned unchanged.
///
/// # Examples
///
/// ```
/// use mapview_bytes::align::align_up;
///
/// assert_eq!(align_up(0, 8), 0);
/// assert_eq!(align_up(1, 8), 8);
/// assert_eq!(align_up(8, 8), 8);
/// assert_eq!(align_up(9, 8), 16);
/// ```
///
/// # Panics
///
/// Panics in debug builds if `alignment` is zero or not a power of 2.
/// Panics if the result overflows `usize`.
#[inline]
pub fn align_up(n: usize, alignment: usize) -> usize {
    debug_assert_ne!(alignment, 0);
    debug_assert!(alignment.is_power_of_two());
    n.checked_add(alignment - 1).expect("align_up overflow") & !(alignment - 1)
}

/// Checks whether `n` lies on a multiple of `alignment`.
///
/// Unlike [`align_up`], the alignment does not have to be a
/// power of two: record alignments are arbitrary positive divisors. A zero
/// alignment is never satisfied.
///
/// # Examples
///
/// ```
/// use mapview_bytes::align::is_aligned;
///
/// assert!(is_aligned(0, 8));
/// assert!(!is_aligned(7, 8));
/// assert!(is_aligned(24, 12));
/// assert!(!is_aligned(20, 12));
/// assert!(!is_aligned(16, 0));
/// ```
#[inline]
pub fn is_aligned(n: usize, alignment: usize) -> bool {
    alignment != 0 && n.is_multiple_of(alignment)
}

/// Checks whether a pointer lies on a multiple of `alignment`.
#[inline]
pub fn is_ptr_aligned(ptr: *const u8, alignment: usize) -> bool {
    is_aligned(ptr as usize, alignment)
}
