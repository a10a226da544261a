//! Report configuration (defaults, optional JSON file, CLI overrides)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_INPUT: &str = "data/robotics_data.csv";
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Where the report reads from and writes to, and how charts are produced.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    /// Render chart files on the rayon pool instead of one after another.
    pub parallel_render: bool,
    /// Open the output directory in the system viewer when done.
    pub open_output: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            parallel_render: true,
            open_output: false,
        }
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub input: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub sequential: bool,
    pub open_output: bool,
}

impl ReportConfig {
    pub fn apply(mut self, overrides: Overrides) -> Self {
        if let Some(input) = overrides.input {
            self.input = input;
        }
        if let Some(output_dir) = overrides.output_dir {
            self.output_dir = output_dir;
        }
        if overrides.sequential {
            self.parallel_render = false;
        }
        if overrides.open_output {
            self.open_output = true;
        }
        self
    }
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> Result<ReportConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: ReportConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    Ok(config)
}
