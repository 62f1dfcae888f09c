//! Zero-copy mapped views over externally owned memory.
//!
//! A [`MappedView`] interprets a region of contiguous memory as an array of
//! fixed-size records and addresses one record at a time. Repositioning the view
//! ([`MappedView::select`]) is a single multiply-add; no per-record objects are
//! created. Field accessors (typically generated) read and write scalars at
//! `view_address + field_offset` through [`raw::get`] and [`raw::put`].
//!
//! ```text
//! Region (Arc<dyn MemoryOwner>, start, capacity, position)
//!   └── MappedView::bind(region, align, record_size)
//!         ├── select(index) / current_index()
//!         ├── duplicate() ── same origin, independent position
//!         ├── slice()     ── origin moved to the current record
//!         └── raw::get / raw::put / raw::copy at computed addresses
//! ```
//!
//! Validation happens once, at bind time: the region must be non-null and
//! direct, the alignment positive, the record size a multiple of the alignment,
//! and the bound address aligned. The raw accessors perform no checks at all.
//!
//! Every view holds a clone of its [`Region`], which holds the memory owner
//! through an `Arc`; the memory cannot be released while any view that
//! addresses it is alive.

pub mod layout;
pub mod raw;
pub mod region;
pub mod scalar;
pub mod view;

#[cfg(test)]
mod tests;

pub use layout::RecordLayout;
pub use mapview_common::{Error, ErrorKind, Result};
pub use raw::copy;
pub use region::{Region, make_region};
pub use scalar::{Char16, Scalar, ScalarKind};
pub use view::MappedView;
