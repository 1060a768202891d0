//! Riskscan - Keyword-based content risk classifier
//!
//! Flags video titles and descriptions that mention harmful topics, groups
//! the hits into risk categories and grades an overall severity.
//!
//! # Architecture
//!
//! 1. **Registry** - validated keyword → category table with severity weights
//! 2. **Matcher** - whole-word scan of text against the registry
//! 3. **Flags** - matched keywords grouped by category
//! 4. **Severity** - log-scaled weight score mapped to low/medium/high
//!
//! The [`Analyzer`] ties these together. Everything is pure and in-memory;
//! one analyzer can be shared across threads.
//!
//! # Example
//!
//! ```
//! use riskscan::{Analyzer, RiskCategory};
//!
//! let analyzer = Analyzer::new().unwrap();
//! let verdict = analyzer.analyze_content("Flat earth PROOF", "");
//!
//! assert!(verdict.has_risk);
//! assert_eq!(verdict.risk_categories, vec![RiskCategory::Misinformation]);
//! println!("Severity: {}", verdict.overall_severity);
//! println!("Confidence: {:.2}", verdict.confidence_score);
//! ```

pub use error::Error;

// Content analysis pipeline
pub mod analyzer;

// Analyzer settings
pub mod config;

// Storage and scan bookkeeping views of verdicts
pub mod record;

// Keyword tables
pub mod registry;

pub use analyzer::{AnalysisVerdict, Analyzer, FlagAssignment, Severity};
pub use config::AnalyzerConfig;
pub use record::{AnalysisRecord, ScanSummary};
pub use registry::{KeywordRegistry, RiskCategory};

mod error {
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum Error {
        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),
        #[error("JSON error: {0}")]
        Json(#[from] serde_json::Error),
        #[error("Registry error: {0}")]
        Registry(String),
        #[error("Config error: {0}")]
        Config(String),
    }
}

/// Analyze a title and description with the shared builtin registry.
pub fn analyze_content(title: &str, description: &str) -> Result<AnalysisVerdict, Error> {
    Ok(Analyzer::new()?.analyze_content(title, description))
}
