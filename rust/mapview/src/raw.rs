//! Raw loads and stores at absolute addresses.
//!
//! These are the primitives field accessors are built on. None of them validate
//! anything: alignment and lifetime are established once, when a view is bound,
//! and every address passed here is expected to be derived from a bound view
//! (`view_address + field_offset`).

use crate::scalar::{Char16, Scalar};
use crate::view::MappedView;

/// Loads a `T` from `address`.
///
/// The load is a plain, non-atomic, non-volatile read. Misaligned addresses are
/// tolerated (the read is performed as an unaligned read).
///
/// # Safety
///
/// `address..address + size_of::<T>()` must be readable memory that is kept
/// alive, and must not be concurrently written.
#[inline(always)]
pub unsafe fn get<T: Scalar>(address: usize) -> T {
    unsafe { (address as *const T).read_unaligned() }
}

/// Stores `value` at `address`.
///
/// # Safety
///
/// `address..address + size_of::<T>()` must be writable memory that is kept
/// alive, and must not be concurrently accessed.
#[inline(always)]
pub unsafe fn put<T: Scalar>(address: usize, value: T) {
    unsafe { (address as *mut T).write_unaligned(value) }
}

macro_rules! width_accessors {
    ($($get:ident, $put:ident => $ty:ty;)*) => {
        $(
            #[doc = concat!("Loads a `", stringify!($ty), "` from `address`. See [`get`].")]
            ///
            /// # Safety
            ///
            /// Same contract as [`get`].
            #[inline(always)]
            pub unsafe fn $get(address: usize) -> $ty {
                unsafe { get::<$ty>(address) }
            }

            #[doc = concat!("Stores a `", stringify!($ty), "` at `address`. See [`put`].")]
            ///
            /// # Safety
            ///
            /// Same contract as [`put`].
            #[inline(always)]
            pub unsafe fn $put(address: usize, value: $ty) {
                unsafe { put::<$ty>(address, value) }
            }
        )*
    };
}

width_accessors! {
    get_i8, put_i8 => i8;
    get_i16, put_i16 => i16;
    get_char, put_char => Char16;
    get_i32, put_i32 => i32;
    get_f32, put_f32 => f32;
    get_i64, put_i64 => i64;
    get_f64, put_f64 => f64;
}

/// Copies `num_bytes` bytes from the current record of `src` to the current
/// record of `dst`.
///
/// Debug builds assert that the two ranges are disjoint.
///
/// # Safety
///
/// Both ranges must lie in live memory, and they must not overlap.
pub unsafe fn copy(src: &MappedView, dst: &MappedView, num_bytes: usize) {
    let from = src.view_address();
    let to = dst.view_address();
    debug_assert!(
        from + num_bytes <= to || to + num_bytes <= from,
        "overlapping copy: {from:#x} -> {to:#x}, {num_bytes} bytes"
    );
    unsafe { std::ptr::copy_nonoverlapping(from as *const u8, to as *mut u8, num_bytes) }
}
