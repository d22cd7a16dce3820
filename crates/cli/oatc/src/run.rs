//! `--run`: execute the generated module in the interpreter

use anyhow::{Context, Result};
use colored::Colorize;
use oat_interpreter::{Interpreter, Value};
use oat_llir::Module;
use tracing::info;

pub fn execute(module: &Module, function: &str) -> Result<()> {
    let mut interpreter = Interpreter::new(module).context("Failed to load module")?;
    println!("{} {function}()", "Running".cyan().bold());
    println!("{}", "---".cyan());

    let result = interpreter.run(function);
    let output = interpreter.take_output();
    info!(function, bytes = output.len(), ok = result.is_ok(), "run finished");
    print!("{output}");
    if !output.is_empty() && !output.ends_with('\n') {
        println!();
    }
    println!("{}", "---".cyan());

    let value = result.with_context(|| format!("Execution of `{function}` failed"))?;
    match value {
        Value::Void => println!("{} {function}()", "Finished".green().bold()),
        value => println!("{} {function}() returned {value}", "Finished".green().bold()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use oat_llir::{Builder, Type, Value as IrValue};

    fn answer() -> Module {
        let mut b = Builder::new(Module::new("answer"));
        let main = b.define_function("main", Type::i32(), Vec::new());
        let entry = b.append_block(main, "entry").unwrap();
        b.position_at_end(main, entry);
        b.ret(IrValue::i32(42)).unwrap();
        b.finish()
    }

    #[test]
    fn executes_a_defined_function() {
        execute(&answer(), "main").unwrap();
    }

    #[test]
    fn unknown_function_fails_with_context() {
        let err = execute(&answer(), "missing").unwrap_err();
        assert!(err.to_string().contains("Execution of `missing` failed"));
    }
}
