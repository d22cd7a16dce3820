//! Oat compiler middle-end CLI
//!
//! `oatc <ast.dot> <image>` dumps the parsed tree.
//! `oatc <ast.dot> <image> <out.ll>` analyzes and compiles it, dumps the
//! annotated tree and writes LLVM IR.

#![allow(
    clippy::print_stdout,
    clippy::print_stderr,
    reason = "CLI tool needs to print to stdout/stderr"
)]

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use oat_driver::{Driver, DriverConfig, Rendered, Request};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod run;

#[derive(Parser)]
#[command(name = "oatc")]
#[command(about = "Semantic analysis and LLVM IR generation for Oat syntax trees")]
#[command(long_about = None)]
#[command(version)]
struct Cli {
    /// Parsed tree, as a Graphviz DOT file
    ast: PathBuf,

    /// Image to dump the tree into
    image: PathBuf,

    /// LLVM IR output; when given, the tree is analyzed and compiled
    ir: Option<PathBuf>,

    /// Configuration file (default: `oatc.toml` next to the input)
    #[arg(long)]
    config: Option<PathBuf>,

    /// IR module name (default: the input file stem)
    #[arg(long)]
    module_name: Option<String>,

    /// Graphviz output format (default: the image extension)
    #[arg(long)]
    format: Option<String>,

    /// Write the DOT source instead of invoking Graphviz
    #[arg(long)]
    no_render: bool,

    /// Execute this function of the generated module and print its output
    #[arg(long, value_name = "FUNCTION", requires = "ir")]
    run: Option<String>,

    /// More logging (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let driver = Driver::new(load_config(&cli)?);
    let request = Request {
        ast: cli.ast.clone(),
        image: cli.image.clone(),
        ir: cli.ir.clone(),
    };
    let report = driver.run(&request)?;

    if let Some(analysis) = &report.analysis {
        println!(
            "{} {} ({} scopes, {} bindings)",
            "Analyzed".green().bold(),
            cli.ast.display(),
            analysis.scopes_opened,
            analysis.bindings
        );
    }
    if let Some(module) = &report.module {
        println!(
            "{} module `{}` ({} functions, {} globals)",
            "Generated".green().bold(),
            module.name,
            module.definitions().count(),
            module.globals.len()
        );
    }
    match &report.tree {
        Rendered::Image(path) => wrote(path),
        Rendered::DotSource(path) => {
            println!("{} {} (DOT source)", "Wrote".yellow().bold(), path.display());
        }
    }
    if let Some(ir) = &cli.ir {
        wrote(ir);
    }

    if let (Some(function), Some(module)) = (&cli.run, &report.module) {
        run::execute(module, function)?;
    }
    Ok(())
}

fn wrote(path: &Path) {
    println!("{} {}", "Wrote".green().bold(), path.display());
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// File configuration with command-line overrides applied
fn load_config(cli: &Cli) -> Result<DriverConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            debug!(path = %path.display(), "loading configuration");
            DriverConfig::from_file(path)?
        }
        None => DriverConfig::find_in_dir(cli.ast.parent().unwrap_or(Path::new(".")))?,
    };
    if let Some(name) = &cli.module_name {
        config.module_name = Some(name.clone());
    }
    if let Some(format) = &cli.format {
        config.graphviz.format = Some(format.clone());
    }
    if cli.no_render {
        config.graphviz.enabled = false;
    }
    debug!(
        module_name = ?config.module_name,
        format = ?config.graphviz.format,
        render = config.graphviz.enabled,
        "effective configuration"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn two_or_three_positionals() {
        assert!(Cli::try_parse_from(["oatc", "a.dot"]).is_err());
        assert!(Cli::try_parse_from(["oatc", "a.dot", "a.png", "a.ll", "extra"]).is_err());

        let cli = Cli::try_parse_from(["oatc", "a.dot", "a.png"]).unwrap();
        assert!(cli.ir.is_none());
        let cli = Cli::try_parse_from(["oatc", "-vv", "a.dot", "a.png", "a.ll"]).unwrap();
        assert_eq!(cli.ir, Some(PathBuf::from("a.ll")));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn running_needs_compiled_output() {
        assert!(Cli::try_parse_from(["oatc", "--run", "main", "a.dot", "a.png"]).is_err());
        let cli =
            Cli::try_parse_from(["oatc", "--run", "main", "a.dot", "a.png", "a.ll"]).unwrap();
        assert_eq!(cli.run.as_deref(), Some("main"));
    }

    #[test]
    fn flags_override_file_configuration() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("custom.toml");
        std::fs::write(&config_path, "module_name = \"file\"\n[graphviz]\nformat = \"svg\"\n")
            .unwrap();
        let config_arg = config_path.to_string_lossy().into_owned();

        let cli = Cli::try_parse_from([
            "oatc",
            "--config",
            &config_arg,
            "--module-name",
            "flag",
            "--no-render",
            "a.dot",
            "a.png",
        ])
        .unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.module_name.as_deref(), Some("flag"));
        assert_eq!(config.graphviz.format.as_deref(), Some("svg"));
        assert!(!config.graphviz.enabled);
    }
}
