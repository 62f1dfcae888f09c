use thiserror::Error;

/// Error raised by view setup operations.
///
/// All failures are synchronous setup errors: they are reported at the
/// offending call and are not meant to be retried.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn already_bound(base_address: usize) -> Error {
        ErrorKind::AlreadyBound { base_address }.into()
    }

    pub fn not_bound() -> Error {
        ErrorKind::NotBound.into()
    }

    pub fn null_region() -> Error {
        ErrorKind::NullRegion.into()
    }

    pub fn invalid_region(reason: impl Into<String>) -> Error {
        ErrorKind::InvalidRegion {
            reason: reason.into(),
        }
        .into()
    }

    pub fn invalid_alignment(align: usize) -> Error {
        ErrorKind::InvalidAlignment { align }.into()
    }

    pub fn misaligned_size(size: usize, align: usize) -> Error {
        ErrorKind::MisalignedSize { size, align }.into()
    }

    pub fn misaligned_address(address: usize, align: usize) -> Error {
        ErrorKind::MisalignedAddress { address, align }.into()
    }

    pub fn range_out_of_bounds(offset: usize, len: usize, capacity: usize) -> Error {
        ErrorKind::RangeOutOfBounds {
            offset,
            len,
            capacity,
        }
        .into()
    }

    /// Returns `true` if this error was raised because a view was already bound.
    pub fn is_already_bound(&self) -> bool {
        matches!(self.kind(), ErrorKind::AlreadyBound { .. })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The destination view already has a base address.
    #[error("view is already bound to base address {base_address:#x}")]
    AlreadyBound { base_address: usize },

    /// A bound view was required.
    #[error("view is not bound")]
    NotBound,

    /// The supplied region has no start address.
    #[error("region is null")]
    NullRegion,

    /// The supplied region is not a stable, directly addressable block.
    #[error("invalid region: {reason}")]
    InvalidRegion { reason: String },

    #[error("invalid alignment {align}")]
    InvalidAlignment { align: usize },

    #[error("record size {size} is not a positive multiple of alignment {align}")]
    MisalignedSize { size: usize, align: usize },

    #[error("region address {address:#x} is not aligned on {align} bytes")]
    MisalignedAddress { address: usize, align: usize },

    /// A byte range does not lie within the bound region.
    #[error("range {offset}..{offset}+{len} is outside a region of {capacity} bytes")]
    RangeOutOfBounds {
        offset: usize,
        len: usize,
        capacity: usize,
    },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}
