//! Graphviz DOT boundary of the compiler
//!
//! The upstream parser serializes the syntax tree as a DOT graph: every node
//! statement carries a `label` (the node kind) and a `lexeme` attribute, and
//! every edge `parent -- child` appends a child in declaration order. The
//! first declared node is the root.
//!
//! [`read_ast`] turns such a graph into an [`oat_syntax::Ast`]; [`write_ast`]
//! renders a tree back into DOT for debugging, showing unique names and
//! resolved types once semantic analysis has run.

mod error;
mod lexer;
mod reader;
mod writer;

pub use error::DotError;
pub use reader::read_ast;
pub use writer::write_ast;
