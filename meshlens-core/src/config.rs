/// TOML configuration for the command-line tools
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::animation::AnimationSettings;
use crate::controller::SliderRanges;
use crate::error::ConfigError;

/// Where converted files and comparison reports are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("converted"),
        }
    }
}

/// Every section is optional and falls back to its defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub animation: AnimationSettings,
    pub sliders: SliderRanges,
    pub output: OutputConfig,
}

impl Config {
    /// Parse and check that every numeric setting is finite
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.animation.validate()?;
        config.sliders.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
