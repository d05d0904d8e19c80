//! Configuration for alias generation
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (alias.toml)
//! - Environment variables (ALIAS_*)
//!
//! ## Example config file (alias.toml):
//! ```toml
//! [output]
//! root = "."
//! strip_prefix = "protobuf"
//!
//! [generate]
//! mode = "preview"
//! format = "text"
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::alias::Mode;
use crate::error::{DescriptorError, Result};

/// Main configuration for alias generation
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AliasConfig {
    /// Where generated files go
    #[serde(default)]
    pub output: OutputConfig,

    /// How a run behaves
    #[serde(default)]
    pub generate: GenerateConfig,
}

/// Output location settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Root directory generated paths are resolved against
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Leading path segment removed from generated file names
    #[serde(default = "default_strip_prefix")]
    pub strip_prefix: String,
}

/// Run settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GenerateConfig {
    /// Preview diffs or apply writes
    #[serde(default)]
    pub mode: Mode,

    /// Report format
    #[serde(default)]
    pub format: OutputFormat,
}

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(DescriptorError::UnknownFormat(other.to_string())),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_strip_prefix() -> String {
    "protobuf".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            strip_prefix: default_strip_prefix(),
        }
    }
}

impl AliasConfig {
    /// Load configuration, layering an explicit file over the default locations
    pub fn load_from(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_locations = ["alias.toml", ".alias.toml", "config/alias.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "legacy-descriptor") {
            let xdg_config = config_dir.config_dir().join("alias.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("ALIAS")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Run settings after command-line overrides
    ///
    /// `execute` forces apply mode; an explicit `format` replaces the
    /// configured one.
    pub fn run_settings(&self, execute: bool, format: Option<&str>) -> Result<GenerateConfig> {
        let mode = if execute { Mode::Apply } else { self.generate.mode };
        let format = match format {
            Some(name) => name.parse()?,
            None => self.generate.format,
        };
        Ok(GenerateConfig { mode, format })
    }

    /// Get the output root (resolves relative paths)
    pub fn output_root(&self) -> PathBuf {
        if self.output.root.is_absolute() {
            self.output.root.clone()
        } else {
            std::env::current_dir()
                .unwrap_or_default()
                .join(&self.output.root)
        }
    }
}
