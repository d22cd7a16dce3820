//! Load → analyze → generate → write

use crate::config::DriverConfig;
use crate::render::{Rendered, render_tree};
use anyhow::{Context, Result};
use oat_llir::Module;
use oat_resolve::Analysis;
use oat_syntax::Ast;
use std::path::{Path, PathBuf};
use tracing::info;

/// One invocation of the compiler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// DOT file holding the parsed tree
    pub ast: PathBuf,
    /// Where the tree dump goes
    pub image: PathBuf,
    /// Where the IR goes; without it only the pre-analysis tree is dumped
    pub ir: Option<PathBuf>,
}

/// What an invocation produced
#[derive(Debug)]
pub struct Report {
    /// The tree dump
    pub tree: Rendered,
    /// Analysis summary, when the tree was compiled
    pub analysis: Option<Analysis>,
    /// Generated module, when the tree was compiled
    pub module: Option<Module>,
}

/// Read and parse a DOT tree
///
/// # Errors
///
/// Fails if the file cannot be read or is not a valid tree.
pub fn load_ast(path: &Path) -> Result<Ast> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read tree: {}", path.display()))?;
    let ast = oat_dot::read_ast(&source)
        .with_context(|| format!("Failed to parse tree: {}", path.display()))?;
    info!(path = %path.display(), nodes = ast.len(), "loaded tree");
    Ok(ast)
}

/// Analyze `ast` in place and generate a module from it
///
/// # Errors
///
/// Fails on the first resolution or code generation error; generation does
/// not start if analysis failed.
pub fn compile(ast: &mut Ast, module_name: &str) -> Result<(Analysis, Module)> {
    let analysis = oat_resolve::analyze(ast).context("Semantic analysis failed")?;
    let module = oat_codegen::generate(ast, module_name).context("Code generation failed")?;
    Ok((analysis, module))
}

/// Write the textual IR of `module` to `path`
///
/// # Errors
///
/// Fails if the file cannot be written.
pub fn write_ir(module: &Module, path: &Path) -> Result<()> {
    std::fs::write(path, module.to_string())
        .with_context(|| format!("Failed to write IR: {}", path.display()))?;
    info!(path = %path.display(), "wrote IR");
    Ok(())
}

/// Runs requests under one configuration
#[derive(Debug, Clone, Default)]
pub struct Driver {
    config: DriverConfig,
}

impl Driver {
    /// Create a driver
    #[must_use]
    pub fn new(config: DriverConfig) -> Self {
        Self { config }
    }

    /// Configuration in effect
    #[must_use]
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Run one request
    ///
    /// Without an IR path the tree is dumped as parsed. With one, the tree is
    /// analyzed and compiled first, the annotated tree is dumped, and the IR
    /// is written. Nothing is written if analysis or generation fails.
    ///
    /// # Errors
    ///
    /// Returns the first failure of any stage.
    pub fn run(&self, request: &Request) -> Result<Report> {
        let mut ast = load_ast(&request.ast)?;

        let Some(ir_path) = &request.ir else {
            let tree = render_tree(&ast, &request.image, &self.config.graphviz)?;
            return Ok(Report {
                tree,
                analysis: None,
                module: None,
            });
        };

        let module_name = self.config.module_name_for(&request.ast);
        let (analysis, module) = compile(&mut ast, &module_name)?;
        let tree = render_tree(&ast, &request.image, &self.config.graphviz)?;
        write_ir(&module, ir_path)?;
        Ok(Report {
            tree,
            analysis: Some(analysis),
            module: Some(module),
        })
    }
}
