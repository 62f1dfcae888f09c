//! The closed set of scalar kinds that can be read and written at raw addresses.

use std::fmt::Debug;

mod private {
    pub trait Sealed {}
}

/// A fixed-width value that can be loaded from or stored to a raw address.
///
/// Implemented for `i8`, `u8`, `i16`, `u16`, [`Char16`], `i32`, `u32`, `f32`,
/// `i64`, `u64` and `f64`. The trait is sealed; field accessors for other types
/// are composed from these.
pub trait Scalar: bytemuck::Pod + Debug + PartialEq + private::Sealed {
    const KIND: ScalarKind;
}

/// Tag identifying a [`Scalar`] type at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    I8,
    U8,
    I16,
    U16,
    Char16,
    I32,
    U32,
    F32,
    I64,
    U64,
    F64,
}

impl ScalarKind {
    /// Width in bytes, which is also the natural alignment.
    pub const fn size(self) -> usize {
        match self {
            ScalarKind::I8 | ScalarKind::U8 => 1,
            ScalarKind::I16 | ScalarKind::U16 | ScalarKind::Char16 => 2,
            ScalarKind::I32 | ScalarKind::U32 | ScalarKind::F32 => 4,
            ScalarKind::I64 | ScalarKind::U64 | ScalarKind::F64 => 8,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ScalarKind::I8 => "i8",
            ScalarKind::U8 => "u8",
            ScalarKind::I16 => "i16",
            ScalarKind::U16 => "u16",
            ScalarKind::Char16 => "char16",
            ScalarKind::I32 => "i32",
            ScalarKind::U32 => "u32",
            ScalarKind::F32 => "f32",
            ScalarKind::I64 => "i64",
            ScalarKind::U64 => "u64",
            ScalarKind::F64 => "f64",
        }
    }
}

impl std::fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A 16-bit character: one UTF-16 code unit.
#[repr(transparent)]
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    bytemuck::Pod,
    bytemuck::Zeroable,
)]
pub struct Char16(pub u16);

impl Char16 {
    /// Encodes `c` as a single code unit, or `None` if it lies outside the
    /// Basic Multilingual Plane.
    pub fn from_char(c: char) -> Option<Char16> {
        u16::try_from(u32::from(c)).ok().map(Char16)
    }

    /// Decodes the code unit, or `None` if it is a surrogate.
    pub fn to_char(self) -> Option<char> {
        char::from_u32(u32::from(self.0))
    }
}

impl From<u16> for Char16 {
    fn from(unit: u16) -> Char16 {
        Char16(unit)
    }
}

impl From<Char16> for u16 {
    fn from(c: Char16) -> u16 {
        c.0
    }
}

macro_rules! impl_scalar {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl private::Sealed for $ty {}

            impl Scalar for $ty {
                const KIND: ScalarKind = ScalarKind::$kind;
            }
        )*
    };
}

impl_scalar! {
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    Char16 => Char16,
    i32 => I32,
    u32 => U32,
    f32 => F32,
    i64 => I64,
    u64 => U64,
    f64 => F64,
}
