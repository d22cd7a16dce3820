//! Interpreter memory
//!
//! Memory is a list of independent allocations. Byte arrays (strings) live in
//! [`Allocation::Bytes`]; everything else is a run of typed cells. Nothing is
//! ever freed: a run is short-lived and bounded by its fuel.

use crate::InterpreterError;
use crate::value::{Pointer, Value, wrap};
use oat_llir::Type;

/// One allocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Allocation {
    /// Raw bytes, addressed per byte
    Bytes(Vec<u8>),
    /// Scalar cells, addressed per cell
    Cells(Vec<Value>),
}

impl Allocation {
    fn len(&self) -> usize {
        match self {
            Self::Bytes(bytes) => bytes.len(),
            Self::Cells(cells) => cells.len(),
        }
    }
}

/// All allocations made during a run
#[derive(Debug, Default)]
pub struct Memory {
    allocations: Vec<Allocation>,
}

impl Memory {
    /// Empty memory
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an allocation; returns a pointer to its start
    pub fn allocate(&mut self, allocation: Allocation) -> Pointer {
        self.allocations.push(allocation);
        Pointer {
            allocation: self.allocations.len() - 1,
            offset: 0,
        }
    }

    /// Zero-initialized storage for one `ty`
    ///
    /// # Errors
    ///
    /// Returns [`InterpreterError::UnsizedType`] for `void`.
    pub fn allocate_type(&mut self, ty: &Type) -> Result<Pointer, InterpreterError> {
        let allocation = match ty {
            Type::Void => return Err(InterpreterError::UnsizedType(ty.clone())),
            Type::Int(_) => Allocation::Cells(vec![Value::Int(0)]),
            Type::Ptr => Allocation::Cells(vec![Value::Void]),
            Type::Array { len, element } if **element == Type::i8() => {
                Allocation::Bytes(vec![0; to_usize(*len)])
            }
            Type::Array { len, .. } => Allocation::Cells(vec![Value::Int(0); to_usize(*len)]),
        };
        Ok(self.allocate(allocation))
    }

    /// Allocation behind `ptr`
    ///
    /// # Errors
    ///
    /// Returns [`InterpreterError::DanglingPointer`] for an unknown allocation.
    pub fn allocation(&self, ptr: Pointer) -> Result<&Allocation, InterpreterError> {
        self.allocations
            .get(ptr.allocation)
            .ok_or(InterpreterError::DanglingPointer(ptr))
    }

    fn allocation_mut(&mut self, ptr: Pointer) -> Result<&mut Allocation, InterpreterError> {
        self.allocations
            .get_mut(ptr.allocation)
            .ok_or(InterpreterError::DanglingPointer(ptr))
    }

    /// Read a value of type `ty` at `ptr`
    ///
    /// A byte array type reads the whole array into a fresh allocation and
    /// returns it as [`Value::Bytes`].
    ///
    /// # Errors
    ///
    /// Fails on an out-of-bounds or dangling pointer, or if the cell does not
    /// hold a `ty`.
    pub fn load(&mut self, ty: &Type, ptr: Pointer) -> Result<Value, InterpreterError> {
        if let Some(len) = byte_array_len(ty) {
            let copy = self.read_bytes(ptr, len)?.to_vec();
            return Ok(Value::Bytes(self.allocate(Allocation::Bytes(copy))));
        }
        let allocation = self.allocation(ptr)?;
        check_bounds(allocation, ptr, 1)?;
        let value = match allocation {
            Allocation::Bytes(bytes) => Value::Int(i64::from(bytes[ptr.offset])),
            Allocation::Cells(cells) => cells[ptr.offset],
        };
        match (ty, value) {
            (Type::Int(bits), Value::Int(v)) => Ok(Value::Int(wrap(*bits, v))),
            (Type::Ptr, Value::Ptr(_)) => Ok(value),
            _ => Err(InterpreterError::TypeMismatch {
                expected: ty.to_string(),
                found: value.describe(),
            }),
        }
    }

    /// Write a value at `ptr`; a [`Value::Bytes`] is copied byte for byte
    ///
    /// # Errors
    ///
    /// Fails on an out-of-bounds or dangling pointer.
    pub fn store(&mut self, value: Value, ptr: Pointer) -> Result<(), InterpreterError> {
        if let Value::Bytes(source) = value {
            let len = self.allocation(source)?.len();
            let copy = self.read_bytes(source, len)?.to_vec();
            return self.store_bytes(&copy, ptr);
        }
        let allocation = self.allocation_mut(ptr)?;
        check_bounds(allocation, ptr, 1)?;
        match (allocation, value) {
            (Allocation::Cells(cells), _) => cells[ptr.offset] = value,
            (Allocation::Bytes(bytes), Value::Int(v)) => bytes[ptr.offset] = v as u8,
            (Allocation::Bytes(_), _) => {
                return Err(InterpreterError::TypeMismatch {
                    expected: "i8".to_owned(),
                    found: value.describe(),
                });
            }
        }
        Ok(())
    }

    /// Copy `data` into a byte allocation starting at `ptr`
    ///
    /// # Errors
    ///
    /// Fails if `ptr` is not into bytes or `data` does not fit.
    pub fn store_bytes(&mut self, data: &[u8], ptr: Pointer) -> Result<(), InterpreterError> {
        let allocation = self.allocation_mut(ptr)?;
        check_bounds(allocation, ptr, data.len())?;
        match allocation {
            Allocation::Bytes(bytes) => {
                bytes[ptr.offset..ptr.offset + data.len()].copy_from_slice(data);
                Ok(())
            }
            Allocation::Cells(_) => Err(InterpreterError::TypeMismatch {
                expected: "a byte array".to_owned(),
                found: "integer cells",
            }),
        }
    }

    fn read_bytes(&self, ptr: Pointer, len: usize) -> Result<&[u8], InterpreterError> {
        let allocation = self.allocation(ptr)?;
        check_bounds(allocation, ptr, len)?;
        match allocation {
            Allocation::Bytes(bytes) => Ok(&bytes[ptr.offset..ptr.offset + len]),
            Allocation::Cells(_) => Err(InterpreterError::TypeMismatch {
                expected: "a byte array".to_owned(),
                found: "integer cells",
            }),
        }
    }

    /// NUL-terminated string starting at `ptr`, without the terminator
    ///
    /// # Errors
    ///
    /// Fails if `ptr` is not into bytes or no terminator follows it.
    pub fn c_string(&self, ptr: Pointer) -> Result<&[u8], InterpreterError> {
        let Allocation::Bytes(bytes) = self.allocation(ptr)? else {
            return Err(InterpreterError::TypeMismatch {
                expected: "a string".to_owned(),
                found: "integer cells",
            });
        };
        let tail = bytes
            .get(ptr.offset..)
            .ok_or(InterpreterError::OutOfBounds {
                pointer: ptr,
                len: bytes.len(),
            })?;
        let end = tail
            .iter()
            .position(|&byte| byte == 0)
            .ok_or(InterpreterError::UnterminatedString(ptr))?;
        Ok(&tail[..end])
    }

    /// Allocate a fresh NUL-terminated copy of `text`
    pub fn allocate_c_string(&mut self, text: &[u8]) -> Pointer {
        let mut bytes = Vec::with_capacity(text.len() + 1);
        bytes.extend_from_slice(text);
        bytes.push(0);
        self.allocate(Allocation::Bytes(bytes))
    }
}

fn check_bounds(
    allocation: &Allocation,
    ptr: Pointer,
    width: usize,
) -> Result<(), InterpreterError> {
    if ptr.offset + width > allocation.len() {
        return Err(InterpreterError::OutOfBounds {
            pointer: ptr,
            len: allocation.len(),
        });
    }
    Ok(())
}

fn byte_array_len(ty: &Type) -> Option<usize> {
    match ty {
        Type::Array { len, element } if **element == Type::i8() => Some(to_usize(*len)),
        _ => None,
    }
}

pub(crate) fn to_usize(len: u64) -> usize {
    usize::try_from(len).unwrap_or(usize::MAX)
}
