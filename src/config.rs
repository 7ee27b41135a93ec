// Configuration for a verification run
//
// Defaults follow common statistical practice: alpha = 0.05 (95%
// confidence), Pearson's chi-squared with Yates' correction for 2x2 tables.

use crate::decision::PowerDivergence;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for statistical property checking
///
/// # Example
/// ```
/// use stochcheck::config::CheckConfig;
///
/// let config = CheckConfig::default();
/// assert_eq!(config.significance_level, 0.05); // 95% confidence
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Significance level (alpha) of every clause's hypothesis test
    ///
    /// - 0.05 (default): 95% confidence, a correct program is rejected in
    ///   at most ~5% of runs
    /// - 0.01: stricter, fewer false rejections, less power
    /// - 0.10: looser, more false rejections, more power
    pub significance_level: f64,

    /// Number of independent trials to run
    pub num_trials: usize,

    /// Worker threads; `None` uses every available CPU
    pub cores: Option<usize>,

    /// Base seed for the trial random context; `None` draws a fresh one
    pub seed: Option<u64>,

    /// Apply Yates' continuity correction to 2x2 tables
    pub correction: bool,

    /// Power-divergence statistic (`lambda_`)
    pub divergence: PowerDivergence,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            significance_level: 0.05,
            num_trials: 1000,
            cores: None,
            seed: None,
            correction: true,
            divergence: PowerDivergence::Pearson,
        }
    }
}

impl CheckConfig {
    /// 99% confidence
    pub fn strict() -> Self {
        Self {
            significance_level: 0.01,
            ..Self::default()
        }
    }

    /// 90% confidence
    pub fn permissive() -> Self {
        Self {
            significance_level: 0.10,
            ..Self::default()
        }
    }

    /// Load a configuration from a TOML file
    ///
    /// Missing keys take their default values.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML")
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.significance_level.is_nan()
            || self.significance_level <= 0.0
            || self.significance_level >= 1.0
        {
            return Err(format!(
                "significance_level must be in (0, 1), got {}",
                self.significance_level
            ));
        }

        if self.num_trials == 0 {
            return Err("num_trials must be >= 1, got 0".to_string());
        }

        if self.cores == Some(0) {
            return Err("cores must be >= 1 when set, got 0".to_string());
        }

        if !self.divergence.lambda().is_finite() {
            return Err(format!(
                "divergence lambda must be finite, got {}",
                self.divergence.lambda()
            ));
        }

        Ok(())
    }
}
