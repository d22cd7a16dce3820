//! IR interpreter
//!
//! Executes an [`oat_llir::Module`] in-process, without going through LLVM.
//! External declarations are served by a native implementation of the Oat
//! runtime whose printed output is captured rather than written to stdout.
//! Every block entry is counted, so tests can check how often a loop body ran.

pub mod interpreter;
pub mod memory;
mod runtime;
pub mod value;

pub use interpreter::{Interpreter, InterpreterError};
pub use memory::{Allocation, Memory};
pub use value::{Pointer, Value};
