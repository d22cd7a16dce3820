//! Tree dumps through Graphviz

use crate::config::GraphvizConfig;
use anyhow::{Context, Result, bail};
use oat_syntax::Ast;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// What a tree dump produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    /// An image written by Graphviz
    Image(PathBuf),
    /// DOT source only, because rendering was disabled or failed
    DotSource(PathBuf),
}

impl Rendered {
    /// File that was written
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Image(path) | Self::DotSource(path) => path,
        }
    }
}

/// Dump `ast` into `image`
///
/// The tree is rendered by the configured Graphviz program. If rendering is
/// disabled, or the program is missing or fails, the DOT source is written to
/// `<image>.dot` instead and a warning is logged.
///
/// # Errors
///
/// Fails only if the fallback DOT file cannot be written.
pub fn render_tree(ast: &Ast, image: &Path, config: &GraphvizConfig) -> Result<Rendered> {
    let source = oat_dot::write_ast(ast);
    if config.enabled {
        match run_graphviz(&source, image, config) {
            Ok(()) => {
                debug!(image = %image.display(), "rendered tree");
                return Ok(Rendered::Image(image.to_path_buf()));
            }
            Err(err) => warn!(
                program = %config.program,
                "could not render {}: {err:#}; writing DOT source instead",
                image.display()
            ),
        }
    }

    let fallback = dot_path(image);
    std::fs::write(&fallback, source)
        .with_context(|| format!("Failed to write tree dump: {}", fallback.display()))?;
    Ok(Rendered::DotSource(fallback))
}

/// `<image>.dot`
#[must_use]
pub fn dot_path(image: &Path) -> PathBuf {
    let mut name = image.as_os_str().to_owned();
    name.push(".dot");
    PathBuf::from(name)
}

fn run_graphviz(source: &str, image: &Path, config: &GraphvizConfig) -> Result<()> {
    let format = config.format_for(image);
    let mut child = Command::new(&config.program)
        .arg(format!("-T{format}"))
        .arg("-o")
        .arg(image)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to start `{}`", config.program))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(source.as_bytes())
            .context("failed to send the graph to Graphviz")?;
    }
    let output = child
        .wait_with_output()
        .context("failed to wait for Graphviz")?;
    if !output.status.success() {
        bail!(
            "`{}` exited with {}: {}",
            config.program,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(())
}
