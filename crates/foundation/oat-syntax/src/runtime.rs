//! Fixed runtime library surface
//!
//! Oat programs link against a small C runtime. Semantic analysis binds these
//! names in the outermost scope before any user declaration, and code
//! generation declares the matching external functions before any user code.

use crate::ValueType;

/// Scope id of the outermost (program) scope, where runtime names live
pub const RUNTIME_SCOPE_ID: u32 = 1;

/// Machine-level parameter or return type of a runtime function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbiType {
    /// No value
    Void,
    /// `int32_t`
    I32,
    /// `char*`
    CharPtr,
    /// `int32_t*`
    IntPtr,
}

/// One external runtime function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeFunction {
    /// Symbol name, also the Oat-level identifier
    pub name: &'static str,
    /// Type the name is bound to during semantic analysis
    pub binding: ValueType,
    /// Return type
    pub ret: AbiType,
    /// Parameter types
    pub params: &'static [AbiType],
}

impl RuntimeFunction {
    /// Unique name of the binding in the program scope
    #[must_use]
    pub fn unique_name(&self) -> String {
        format!("{}-{RUNTIME_SCOPE_ID}", self.name)
    }
}

/// The runtime library, in declaration order
// print_bool is bound as BOOL, not VOID; generated code never reads the binding type of a callee.
pub static RUNTIME_FUNCTIONS: [RuntimeFunction; 8] = [
    RuntimeFunction {
        name: "array_of_string",
        binding: ValueType::IntArray,
        ret: AbiType::IntPtr,
        params: &[AbiType::CharPtr],
    },
    RuntimeFunction {
        name: "string_of_array",
        binding: ValueType::String,
        ret: AbiType::CharPtr,
        params: &[AbiType::IntPtr],
    },
    RuntimeFunction {
        name: "length_of_string",
        binding: ValueType::Int,
        ret: AbiType::I32,
        params: &[AbiType::CharPtr],
    },
    RuntimeFunction {
        name: "string_of_int",
        binding: ValueType::String,
        ret: AbiType::CharPtr,
        params: &[AbiType::I32],
    },
    RuntimeFunction {
        name: "string_cat",
        binding: ValueType::String,
        ret: AbiType::CharPtr,
        params: &[AbiType::CharPtr, AbiType::CharPtr],
    },
    RuntimeFunction {
        name: "print_string",
        binding: ValueType::Void,
        ret: AbiType::Void,
        params: &[AbiType::CharPtr],
    },
    RuntimeFunction {
        name: "print_int",
        binding: ValueType::Void,
        ret: AbiType::Void,
        params: &[AbiType::I32],
    },
    RuntimeFunction {
        name: "print_bool",
        binding: ValueType::Bool,
        ret: AbiType::Void,
        params: &[AbiType::I32],
    },
];

/// Look up a runtime function by name
#[must_use]
pub fn find(name: &str) -> Option<&'static RuntimeFunction> {
    RUNTIME_FUNCTIONS.iter().find(|function| function.name == name)
}
