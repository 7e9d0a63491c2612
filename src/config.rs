use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::montecarlo::DEFAULT_TRIALS;
use crate::core::surrogate::{DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE, SurrogateParams};
use crate::error::{DxcError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SurrogateConfig {
    #[serde(default = "SurrogateConfig::default_tolerance")]
    pub tolerance: f64,
    #[serde(default = "SurrogateConfig::default_max_iterations")]
    pub max_iterations: usize,
}

impl SurrogateConfig {
    fn default_tolerance() -> f64 {
        DEFAULT_TOLERANCE
    }
    fn default_max_iterations() -> usize {
        DEFAULT_MAX_ITERATIONS
    }

    pub fn params(&self) -> SurrogateParams {
        SurrogateParams {
            tolerance: self.tolerance,
            max_iterations: self.max_iterations,
        }
    }
}

impl Default for SurrogateConfig {
    fn default() -> Self {
        Self {
            tolerance: Self::default_tolerance(),
            max_iterations: Self::default_max_iterations(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonteCarloConfig {
    #[serde(default = "MonteCarloConfig::default_trials")]
    pub trials: usize,
    /// Worker threads for parallel runs; 0 = available parallelism.
    #[serde(default)]
    pub threads: usize,
    /// Base seed; drawn at random when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl MonteCarloConfig {
    fn default_trials() -> usize {
        DEFAULT_TRIALS
    }
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            trials: Self::default_trials(),
            threads: 0,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub surrogate: SurrogateConfig,
    #[serde(default)]
    pub montecarlo: MonteCarloConfig,
}

impl AppConfig {
    /// Reads a TOML config; missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let to_err = |message: String| DxcError::Config {
            path: path.to_path_buf(),
            message,
        };
        let contents = fs::read_to_string(path).map_err(|e| to_err(e.to_string()))?;
        toml::from_str(&contents).map_err(|e| to_err(e.to_string()))
    }

    /// Default configuration rendered as TOML with every value commented out.
    pub fn commented_defaults() -> String {
        let text = toml::to_string_pretty(&Self::default()).unwrap_or_default();
        let mut commented = String::new();
        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                commented.push('\n');
            } else if trimmed.starts_with('[') && trimmed.ends_with(']') {
                commented.push_str(line);
                commented.push('\n');
                if trimmed == "[montecarlo]" {
                    commented.push_str("# seed = 0\n");
                }
            } else {
                commented.push_str("# ");
                commented.push_str(line);
                commented.push('\n');
            }
        }
        commented
    }
}
