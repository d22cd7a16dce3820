//! Typed operands

use crate::Type;

/// A typed operand: a constant or a reference to a named value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Value {
    /// Type of the operand
    pub ty: Type,
    /// What the operand is
    pub kind: ValueKind,
}

/// Operand payload
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Integer constant of the operand's width
    ConstInt(i64),
    /// Byte-array constant (`c"..."`)
    ConstBytes(Vec<u8>),
    /// Function-local value `%name`
    Local(String),
    /// Module-level symbol `@name`
    Global(String),
}

impl Value {
    /// Integer constant of type `iN`
    #[must_use]
    pub fn int(bits: u32, value: i64) -> Self {
        Self {
            ty: Type::Int(bits),
            kind: ValueKind::ConstInt(value),
        }
    }

    /// `i32` constant
    #[must_use]
    pub fn i32(value: i64) -> Self {
        Self::int(32, value)
    }

    /// Byte-array constant; the array type is sized to `bytes`
    #[must_use]
    pub fn bytes(bytes: Vec<u8>) -> Self {
        Self {
            ty: Type::bytes(bytes.len() as u64),
            kind: ValueKind::ConstBytes(bytes),
        }
    }

    /// Local value `%name`
    #[must_use]
    pub fn local(ty: Type, name: impl Into<String>) -> Self {
        Self {
            ty,
            kind: ValueKind::Local(name.into()),
        }
    }

    /// Pointer to the module-level symbol `@name`
    #[must_use]
    pub fn global(name: impl Into<String>) -> Self {
        Self {
            ty: Type::Ptr,
            kind: ValueKind::Global(name.into()),
        }
    }

    /// Whether the operand is a constant
    #[must_use]
    pub fn is_constant(&self) -> bool {
        matches!(self.kind, ValueKind::ConstInt(_) | ValueKind::ConstBytes(_))
    }

    /// Integer payload, if the operand is an integer constant
    #[must_use]
    pub fn as_const_int(&self) -> Option<i64> {
        match self.kind {
            ValueKind::ConstInt(value) => Some(value),
            _ => None,
        }
    }
}
