//! Heap memory blocks with alignment guarantees, suitable as backing storage
//! for mapped views, plus the alignment arithmetic shared by the mapview crates.

pub mod align;
pub mod aligned;

pub use aligned::AlignedBytes;
