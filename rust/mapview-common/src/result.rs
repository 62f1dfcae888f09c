use crate::error::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Verifies a bind-time precondition, returning `err()` if it does not hold.
///
/// The error constructor is only invoked on failure, keeping the success path
/// free of allocations.
#[inline]
pub fn verify(predicate: bool, err: impl FnOnce() -> Error) -> Result<()> {
    if predicate { Ok(()) } else { fail(err) }
}

#[cold]
fn fail(err: impl FnOnce() -> Error) -> Result<()> {
    Err(err())
}
