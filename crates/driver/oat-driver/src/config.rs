//! Driver configuration (`oatc.toml`)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name looked up next to the input when no `--config` is given
pub const CONFIG_FILE_NAME: &str = "oatc.toml";

/// Driver settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DriverConfig {
    /// IR module name; defaults to the input file stem
    #[serde(default)]
    pub module_name: Option<String>,

    /// Tree rendering
    #[serde(default)]
    pub graphviz: GraphvizConfig,
}

/// How tree dumps are turned into images
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphvizConfig {
    /// Program invoked as `<program> -T<format> -o <image>`
    #[serde(default = "default_program")]
    pub program: String,

    /// Output format; defaults to the image extension
    #[serde(default)]
    pub format: Option<String>,

    /// When false, only the DOT source is written
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Default for GraphvizConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            format: None,
            enabled: default_enabled(),
        }
    }
}

fn default_program() -> String {
    "dot".to_string()
}

fn default_enabled() -> bool {
    true
}

impl DriverConfig {
    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not valid configuration.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load `oatc.toml` from `dir` if there is one, defaults otherwise
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be loaded.
    pub fn find_in_dir(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.is_file() {
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Module name for a compilation of `input`
    #[must_use]
    pub fn module_name_for(&self, input: &Path) -> String {
        self.module_name.clone().unwrap_or_else(|| {
            input
                .file_stem()
                .map_or_else(|| "main".to_string(), |stem| stem.to_string_lossy().into_owned())
        })
    }
}

impl GraphvizConfig {
    /// Format to render `image` in
    #[must_use]
    pub fn format_for(&self, image: &Path) -> String {
        self.format.clone().unwrap_or_else(|| {
            image
                .extension()
                .map_or_else(|| "png".to_string(), |ext| ext.to_string_lossy().into_owned())
        })
    }
}
