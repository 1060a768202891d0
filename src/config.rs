//! Analyzer settings.
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```json
//! { "high_threshold": 0.8 }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Tunable analyzer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzerConfig {
    /// Risk score at or above which severity is `medium`
    pub medium_threshold: f64,
    /// Risk score at or above which severity is `high`
    pub high_threshold: f64,
    /// Maximum characters of title + description kept in an analysis record
    pub flagged_text_limit: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            medium_threshold: 0.4,
            high_threshold: 0.7,
            flagged_text_limit: 200,
        }
    }
}

impl AnalyzerConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<(), Error> {
        for (name, value) in [
            ("medium_threshold", self.medium_threshold),
            ("high_threshold", self.high_threshold),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(Error::Config(format!(
                    "{} must be in (0, 1], got {}",
                    name, value
                )));
            }
        }
        if self.medium_threshold > self.high_threshold {
            return Err(Error::Config(format!(
                "medium_threshold ({}) is above high_threshold ({})",
                self.medium_threshold, self.high_threshold
            )));
        }
        if self.flagged_text_limit == 0 {
            return Err(Error::Config("flagged_text_limit must be positive".to_string()));
        }
        Ok(())
    }
}
