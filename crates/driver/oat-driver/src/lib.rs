//! Compilation driver
//!
//! Orchestrates the pipeline behind `oatc`: read a DOT tree, run semantic
//! analysis and code generation, dump the tree through Graphviz and write
//! the textual IR. Errors from every stage are collected into [`anyhow`]
//! errors with the file involved attached as context.

pub mod config;
pub mod pipeline;
pub mod render;

pub use config::{CONFIG_FILE_NAME, DriverConfig, GraphvizConfig};
pub use pipeline::{Driver, Report, Request, compile, load_ast, write_ir};
pub use render::{Rendered, dot_path, render_tree};
