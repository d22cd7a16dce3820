//! Syntax tree for the Oat v.1 language
//!
//! The tree arrives pre-built from an upstream parser. Both compiler passes work
//! over the same [`Ast`]: semantic analysis stamps a unique name and a
//! [`ValueType`] onto nodes in place, and code generation reads them back.
//!
//! Children are positional. Each [`NodeKind`] has a fixed child layout
//! (for example a `<var_decl>` is `[identifier, initializer]`), and the
//! [`Ast::child`] accessor reports a [`SyntaxError::MalformedNode`] when a
//! positional child is missing.

pub mod ast;
pub mod error;
pub mod kind;
pub mod runtime;
pub mod ty;

pub use ast::{Ast, AstBuilder, AstNode, NodeId, Preorder};
pub use error::SyntaxError;
pub use kind::NodeKind;
pub use runtime::{AbiType, RUNTIME_FUNCTIONS, RUNTIME_SCOPE_ID, RuntimeFunction};
pub use ty::ValueType;
