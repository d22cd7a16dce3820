//! Integration test utilities for the Oat pipeline
//!
//! Fixtures are DOT trees under `tests/fixtures/`, named by file stem. Each
//! starts with a comment holding the Oat source it was parsed from.

use anyhow::{Context, Result};
use oat_interpreter::Interpreter;
use oat_llir::Module;
use oat_syntax::Ast;
use std::path::PathBuf;

/// Path of the fixture `name`
#[must_use]
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(format!("{name}.dot"))
}

/// Parse the fixture `name`
///
/// # Errors
///
/// Returns an error if the fixture is missing or malformed
pub fn load_fixture(name: &str) -> Result<Ast> {
    oat_driver::load_ast(&fixture_path(name))
}

/// Analyze and compile the fixture `name` into a module of the same name
///
/// # Errors
///
/// Returns an error if any stage fails
pub fn compile_fixture(name: &str) -> Result<Module> {
    let mut ast = load_fixture(name)?;
    let (_, module) = oat_driver::compile(&mut ast, name)?;
    Ok(module)
}

/// Result of running a compiled fixture
#[derive(Debug)]
pub struct Run {
    /// Value returned by the entry function
    pub value: oat_interpreter::Value,
    /// Everything the runtime printed
    pub output: String,
    /// Visits per block label of the entry function, in block order
    pub visits: Vec<(String, u64)>,
}

/// Compile the fixture `name` and call `function` in the interpreter
///
/// # Errors
///
/// Returns an error if compilation or execution fails
pub fn run_fixture(name: &str, function: &str) -> Result<Run> {
    let module = compile_fixture(name)?;
    let mut interpreter = Interpreter::new(&module)?;
    let value = interpreter
        .run(function)
        .with_context(|| format!("running `{function}` of fixture `{name}`"))?;

    let (_, entry) = module
        .function_by_name(function)
        .context("entry function disappeared")?;
    let visits = entry
        .blocks
        .iter()
        .map(|block| (block.name.clone(), interpreter.visits(function, &block.name)))
        .collect();
    Ok(Run {
        value,
        output: interpreter.take_output(),
        visits,
    })
}

impl Run {
    /// Visits of the block labelled `block`
    #[must_use]
    pub fn visits_of(&self, block: &str) -> u64 {
        self.visits
            .iter()
            .find(|(name, _)| name == block)
            .map_or(0, |(_, count)| *count)
    }
}
