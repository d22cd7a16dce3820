//! IR types

use std::fmt;

/// First-class IR type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// `void`
    Void,
    /// `iN`
    Int(u32),
    /// Opaque `ptr`
    Ptr,
    /// `[len x element]`
    Array {
        /// Element count
        len: u64,
        /// Element type
        element: Box<Type>,
    },
}

impl Type {
    /// `i1`
    #[must_use]
    pub const fn i1() -> Self {
        Self::Int(1)
    }

    /// `i8`
    #[must_use]
    pub const fn i8() -> Self {
        Self::Int(8)
    }

    /// `i32`
    #[must_use]
    pub const fn i32() -> Self {
        Self::Int(32)
    }

    /// `[len x i8]`
    #[must_use]
    pub fn bytes(len: u64) -> Self {
        Self::Array {
            len,
            element: Box::new(Self::i8()),
        }
    }

    /// Whether values of this type can be produced and stored
    #[must_use]
    pub fn is_sized(&self) -> bool {
        !matches!(self, Self::Void)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => f.write_str("void"),
            Self::Int(bits) => write!(f, "i{bits}"),
            Self::Ptr => f.write_str("ptr"),
            Self::Array { len, element } => write!(f, "[{len} x {element}]"),
        }
    }
}
