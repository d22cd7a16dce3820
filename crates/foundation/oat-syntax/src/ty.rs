//! Value types resolved by semantic analysis

use std::fmt;

/// Type stamped onto a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ValueType {
    /// 32-bit integer
    Int,
    /// Boolean, stored as a 32-bit integer holding 0 or 1
    Bool,
    /// NUL-terminated byte array sized from its literal
    String,
    /// Array of integers (never lowered)
    IntArray,
    /// Array of booleans (never lowered)
    BoolArray,
    /// Array of strings (never lowered)
    StringArray,
    /// No value
    Void,
    /// Not yet resolved
    #[default]
    Unknown,
}

impl ValueType {
    /// Upper-case name used in tree dumps
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int => "INT",
            Self::Bool => "BOOL",
            Self::String => "STRING",
            Self::IntArray => "INT_ARRAY",
            Self::BoolArray => "BOOL_ARRAY",
            Self::StringArray => "STRING_ARRAY",
            Self::Void => "VOID",
            Self::Unknown => "NONE",
        }
    }

    /// Array types exist in the taxonomy only
    #[must_use]
    pub const fn is_array(self) -> bool {
        matches!(self, Self::IntArray | Self::BoolArray | Self::StringArray)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
