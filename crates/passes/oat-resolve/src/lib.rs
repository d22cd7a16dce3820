//! Semantic analysis for Oat
//!
//! Resolves every identifier of a syntax tree against a stack of lexical
//! scopes, stamping each node with a unique name (`lexeme-scopeid`) and a
//! [`oat_syntax::ValueType`]. Code generation relies on these annotations: two
//! bindings of the same lexeme in different scopes never share a unique name.
//!
//! ```rust,ignore
//! let analysis = oat_resolve::analyze(&mut ast)?;
//! assert_eq!(analysis.final_depth, 0);
//! ```

pub mod analyzer;
pub mod error;
pub mod scope;

pub use analyzer::{Analysis, analyze};
pub use error::ResolutionError;
pub use scope::{Binding, Scope, ScopeGuard, ScopeTable, unique_name};
