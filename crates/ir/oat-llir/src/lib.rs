//! Low-level IR in the shape of LLVM IR
//!
//! An in-memory [`Module`] of globals, external declarations and function
//! definitions built from basic blocks. Each block is a straight run of
//! [`Instruction`]s closed by one [`Terminator`]. The [`Builder`] owns the
//! module while it is under construction and keeps an insertion cursor, and
//! the module's `Display` impl prints textual LLVM IR that `llc`/`clang` accept.
//!
//! Only the slice of LLVM needed by the Oat code generator is modelled:
//! 32-bit integers, `i1` comparisons, byte arrays, opaque pointers,
//! stack slots, loads/stores, add/sub, signed comparisons, GEP and calls.

pub mod builder;
pub mod error;
pub mod module;
pub mod names;
pub mod print;
pub mod ty;
pub mod value;

pub use builder::Builder;
pub use error::LlirError;
pub use module::{
    BasicBlock, BlockId, Function, FunctionId, FunctionRef, Global, Instruction, IntPredicate,
    Module, Terminator,
};
pub use names::NameScope;
pub use ty::Type;
pub use value::{Value, ValueKind};
