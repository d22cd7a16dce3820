//! LLVM IR generation for analyzed Oat syntax trees
//!
//! [`generate`] walks a tree that has been through `oat-resolve` and emits an
//! [`oat_llir::Module`]:
//!
//! - global declarations become private constants initialized from literals
//! - function declarations become parameterless definitions with an `entry` block
//! - locals get a stack slot named after their unique name
//! - `if`/`for`/`while` become explicit basic blocks joined by branches
//!
//! All state lives in a [`GenContext`] passed by `&mut` through the lowering:
//! the module and builder, and the code map from unique names to what was
//! emitted for them. The runtime library is declared first (see
//! [`declare_runtime_functions`]).

mod control;
pub mod context;
pub mod error;
mod expr;
mod generate;
pub mod runtime;

#[cfg(test)]
mod tests;

pub use context::{Binding, GenContext};
pub use error::CodegenError;
pub use generate::generate;
pub use runtime::{abi_type, declare_runtime_functions};
