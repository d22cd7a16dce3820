//! Code generation errors

use oat_llir::LlirError;
use oat_syntax::{NodeKind, SyntaxError, ValueType};

/// Errors that abort code generation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodegenError {
    /// A value type with no IR lowering (arrays, or strings where a scalar is needed)
    #[error("node #{node}: values of type {ty} cannot be used {context}")]
    UnsupportedValueType {
        /// The type
        ty: ValueType,
        /// Diagnostic index of the node
        node: u32,
        /// Where the value appeared
        context: &'static str,
    },

    /// A node kind with no lowering in this position
    #[error("node #{node}: {kind} is not supported {context}")]
    UnsupportedExpression {
        /// Kind of the node
        kind: NodeKind,
        /// Diagnostic index of the node
        node: u32,
        /// Where the node appeared
        context: &'static str,
    },

    /// Wrong number of operands or arguments
    #[error("node #{node}: {kind} takes {expected} operand(s), found {found}")]
    UnsupportedArity {
        /// Kind of the node
        kind: NodeKind,
        /// Diagnostic index of the node
        node: u32,
        /// Operands the lowering needs
        expected: usize,
        /// Operands present
        found: usize,
    },

    /// A global initialized with something other than a literal
    #[error("node #{node}: global initializer must be a literal, found {kind}")]
    NonConstantInitializer {
        /// Kind of the initializer
        kind: NodeKind,
        /// Diagnostic index of the initializer
        node: u32,
    },

    /// A second global with the same unique name
    #[error("node #{node}: global `{name}` is already defined")]
    DuplicateGlobal {
        /// Unique name of the global
        name: String,
        /// Diagnostic index of the repeated identifier
        node: u32,
    },

    /// A unique name with nothing emitted for it
    #[error("no storage or function emitted for `{0}`")]
    MissingBinding(String),

    /// An integer literal that does not fit in 32 bits
    #[error("node #{node}: invalid 32-bit integer literal `{lexeme}`")]
    InvalidIntLiteral {
        /// Literal text
        lexeme: String,
        /// Diagnostic index of the literal
        node: u32,
    },

    /// Tree is missing a positional child
    #[error(transparent)]
    Malformed(#[from] SyntaxError),

    /// Builder misuse, such as code outside any function or after a `return`
    #[error(transparent)]
    Ir(#[from] LlirError),
}
