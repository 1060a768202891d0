//! Severity grading and confidence scoring.
//!
//! Each keyword carries a weight from 1 to 3. The risk score grows with the
//! logarithm of the summed weights and is capped at 1.0:
//!
//! ```text
//! score = min(1, 0.3 * log2(1 + Σ weight))
//! ```
//!
//! Weights are positive, so adding a keyword never lowers the score, and
//! the severity label is a fixed step function of the score.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::AnalyzerConfig;
use crate::registry::KeywordRegistry;

const SCORE_SCALE: f64 = 0.3;

/// Coarse severity label.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
}

impl Severity {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }

    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Severity::Low),
            "medium" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Risk score in `[0, 1]` for a list of matched keywords.
///
/// Unregistered keywords weigh nothing. An empty list scores 0.
pub fn risk_score<I, S>(registry: &KeywordRegistry, keywords: I) -> f64
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let total_weight: u32 = keywords
        .into_iter()
        .map(|keyword| u32::from(registry.weight_of(keyword.as_ref())))
        .sum();

    if total_weight == 0 {
        return 0.0;
    }

    (SCORE_SCALE * (1.0 + f64::from(total_weight)).log2()).min(1.0)
}

/// Map a risk score onto a severity label.
pub fn severity_for_score(score: f64, config: &AnalyzerConfig) -> Severity {
    if score >= config.high_threshold {
        Severity::High
    } else if score >= config.medium_threshold {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// Severity label for a list of matched keywords.
pub fn calculate_severity<I, S>(
    registry: &KeywordRegistry,
    config: &AnalyzerConfig,
    keywords: I,
) -> Severity
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    severity_for_score(risk_score(registry, keywords), config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> KeywordRegistry {
        KeywordRegistry::builtin().unwrap()
    }

    fn severity(keywords: &[&str]) -> Severity {
        calculate_severity(&registry(), &AnalyzerConfig::default(), keywords)
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
    }

    #[test]
    fn test_severity_strings() {
        assert_eq!(Severity::High.as_str(), "high");
        assert_eq!(Severity::from_str("MEDIUM"), Some(Severity::Medium));
        assert_eq!(Severity::from_str("critical"), None);
        assert_eq!(serde_json::to_string(&Severity::Low).unwrap(), "\"low\"");
    }

    #[test]
    fn test_empty_is_low() {
        assert_eq!(severity(&[]), Severity::Low);
        assert_eq!(risk_score(&registry(), Vec::<&str>::new()), 0.0);
    }

    #[test]
    fn test_single_default_weight_keyword_is_low() {
        assert_eq!(severity(&["hoax"]), Severity::Low);
        assert_eq!(severity(&["hate", "warning", "danger", "caution", "alert"]), Severity::Low);
    }

    #[test]
    fn test_heavier_keywords_raise_severity() {
        // weight 3: 0.3 * log2(4) = 0.6
        assert_eq!(severity(&["genocide"]), Severity::Medium);
        // weights 3 + 3 + 2: 0.3 * log2(9) ≈ 0.95
        assert_eq!(severity(&["genocide", "murder", "gore"]), Severity::High);
    }

    #[test]
    fn test_many_light_keywords_reach_high() {
        let keywords = ["hoax", "troll", "blood", "momo", "nazi", "shame", "nude"];
        // 7 * 1: 0.3 * log2(8) = 0.9
        assert_eq!(severity(&keywords), Severity::High);
    }

    #[test]
    fn test_score_is_bounded() {
        let registry = registry();
        let all: Vec<&str> = registry.all_keywords().collect();
        let score = risk_score(&registry, &all);
        assert!((0.0..=1.0).contains(&score));
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_unknown_keywords_do_not_count() {
        let registry = registry();
        assert_eq!(risk_score(&registry, ["scam", "fraud"]), 0.0);
        assert_eq!(
            risk_score(&registry, ["hoax", "scam"]),
            risk_score(&registry, ["hoax"])
        );
    }

    #[test]
    fn test_monotonic_over_growing_prefixes() {
        let registry = registry();
        let config = AnalyzerConfig::default();
        let keywords: Vec<&str> = registry.all_keywords().collect();

        let mut previous_score = 0.0;
        let mut previous_severity = Severity::Low;
        for end in 0..=keywords.len() {
            let subset = &keywords[..end];
            let score = risk_score(&registry, subset);
            let label = calculate_severity(&registry, &config, subset);
            assert!(score >= previous_score);
            assert!(label >= previous_severity);
            previous_score = score;
            previous_severity = label;
        }
    }

    #[test]
    fn test_thresholds_from_config() {
        let config = AnalyzerConfig {
            medium_threshold: 0.2,
            high_threshold: 0.3,
            ..AnalyzerConfig::default()
        };
        assert_eq!(severity_for_score(0.1, &config), Severity::Low);
        assert_eq!(severity_for_score(0.2, &config), Severity::Medium);
        assert_eq!(severity_for_score(0.3, &config), Severity::High);
    }
}
