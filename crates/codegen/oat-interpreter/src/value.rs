//! Runtime value representation

use std::fmt;

/// Position inside one allocation, counted in the allocation's own units
/// (bytes or cells)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pointer {
    /// Allocation index
    pub allocation: usize,
    /// Offset from the start of the allocation
    pub offset: usize,
}

impl Pointer {
    /// Same allocation, `delta` units further on
    #[must_use]
    pub fn offset_by(self, delta: usize) -> Self {
        Self {
            offset: self.offset + delta,
            ..self
        }
    }
}

/// Runtime value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    /// Result of a `void` call, and the contents of an unwritten pointer slot
    Void,
    /// Integer of any width, already wrapped to it
    Int(i64),
    /// Pointer into interpreter memory
    Ptr(Pointer),
    /// A whole byte array read by one `load`, copied into its own allocation
    Bytes(Pointer),
}

impl Value {
    /// Get the value as an integer, if possible
    #[must_use]
    pub fn as_int(self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(value),
            _ => None,
        }
    }

    /// Get the value as a pointer, if possible
    #[must_use]
    pub fn as_ptr(self) -> Option<Pointer> {
        match self {
            Self::Ptr(ptr) => Some(ptr),
            _ => None,
        }
    }

    /// Short description for type errors
    #[must_use]
    pub fn describe(self) -> &'static str {
        match self {
            Self::Void => "void",
            Self::Int(_) => "an integer",
            Self::Ptr(_) => "a pointer",
            Self::Bytes(_) => "a byte array",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => f.write_str("void"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Ptr(ptr) => write!(f, "ptr #{}+{}", ptr.allocation, ptr.offset),
            Self::Bytes(ptr) => write!(f, "bytes #{}", ptr.allocation),
        }
    }
}

/// Truncate `value` to a signed `bits`-wide integer; `i1` stays 0 or 1
#[must_use]
pub fn wrap(bits: u32, value: i64) -> i64 {
    match bits {
        1 => value & 1,
        8 => i64::from(value as i8),
        32 => i64::from(value as i32),
        _ => value,
    }
}
