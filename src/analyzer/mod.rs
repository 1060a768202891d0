//! Content risk analyzer.
//!
//! The analyzer combines the text matcher, flag assigner and severity
//! calculator over a video's title and description and returns an
//! [`AnalysisVerdict`].
//!
//! # Example
//!
//! ```
//! use riskscan::analyzer::Analyzer;
//! use riskscan::Severity;
//!
//! let analyzer = Analyzer::new().unwrap();
//! let verdict = analyzer.analyze_content(
//!     "Warning: Dangerous Challenge Going Viral",
//!     "The new viral challenge has led to several injuries.",
//! );
//!
//! assert!(verdict.has_risk);
//! assert!(verdict.overall_severity >= Severity::Low);
//! ```

pub mod flags;
pub mod matcher;
pub mod severity;


use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use flags::{assign_flags, FlagAssignment};
pub use matcher::TextMatcher;
pub use severity::{risk_score, Severity};

use crate::config::AnalyzerConfig;
use crate::registry::{KeywordRegistry, RiskCategory};
use crate::Error;

/// Outcome of analyzing one piece of content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisVerdict {
    /// Whether any keyword matched
    pub has_risk: bool,
    /// Matched categories, in registry order
    pub risk_categories: Vec<RiskCategory>,
    /// Matched keywords grouped by category
    pub categorized_keywords: BTreeMap<RiskCategory, Vec<String>>,
    /// Matched keywords, unique, in registry order
    pub matched_keywords: Vec<String>,
    /// Number of matched keywords (not categories)
    pub total_keywords_matched: usize,
    pub overall_severity: Severity,
    /// Heuristic score in `[0, 1]`, grows with the weight of the matches
    pub confidence_score: f64,
}

impl AnalysisVerdict {
    /// Verdict for content with no matches.
    pub fn clean() -> Self {
        Self::default()
    }
}

/// Keyword-based content analyzer.
///
/// Cheap to clone; the registry is shared.
#[derive(Debug, Clone)]
pub struct Analyzer {
    registry: Arc<KeywordRegistry>,
    config: AnalyzerConfig,
}

impl Analyzer {
    /// Create an analyzer over the shared builtin registry with default settings.
    pub fn new() -> Result<Self, Error> {
        Self::with_config(AnalyzerConfig::default())
    }

    /// Create an analyzer over the shared builtin registry.
    pub fn with_config(config: AnalyzerConfig) -> Result<Self, Error> {
        Self::with_registry(KeywordRegistry::shared()?, config)
    }

    /// Create an analyzer over a caller-supplied registry.
    pub fn with_registry(
        registry: Arc<KeywordRegistry>,
        config: AnalyzerConfig,
    ) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self { registry, config })
    }

    pub fn registry(&self) -> &KeywordRegistry {
        &self.registry
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Keywords found in `text` as whole words, unique, in registry order.
    pub fn analyze_text(&self, text: &str) -> Vec<String> {
        TextMatcher::new(&self.registry)
            .find(text)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Group keywords by category, dropping unregistered ones.
    pub fn assign_flags<I, S>(&self, keywords: I) -> FlagAssignment
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        flags::assign_flags(&self.registry, keywords)
    }

    /// Severity label for a list of matched keywords.
    pub fn calculate_severity<I, S>(&self, keywords: I) -> Severity
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        severity::calculate_severity(&self.registry, &self.config, keywords)
    }

    /// Analyze a title and description together.
    ///
    /// Both fields are scanned separately, so a phrase never spans the
    /// boundary between them.
    pub fn analyze_content(&self, title: &str, description: &str) -> AnalysisVerdict {
        let matcher = TextMatcher::new(&self.registry);
        let mut positions = matcher.match_positions(title);
        positions.extend(matcher.match_positions(description));
        positions.sort_unstable();
        positions.dedup();

        if positions.is_empty() {
            debug!("no keywords matched");
            return AnalysisVerdict::clean();
        }

        let entries = self.registry.entries();
        let matched_keywords: Vec<String> = positions
            .iter()
            .map(|&position| entries[position].keyword().to_string())
            .collect();

        let categorized_keywords = self.assign_flags(&matched_keywords);
        let risk_categories: Vec<RiskCategory> = categorized_keywords.keys().copied().collect();
        let confidence_score = risk_score(&self.registry, &matched_keywords);
        let overall_severity = severity::severity_for_score(confidence_score, &self.config);

        debug!(
            matched = matched_keywords.len(),
            categories = risk_categories.len(),
            severity = %overall_severity,
            confidence = confidence_score,
            "content analyzed"
        );

        AnalysisVerdict {
            has_risk: true,
            risk_categories,
            categorized_keywords,
            total_keywords_matched: matched_keywords.len(),
            matched_keywords,
            overall_severity,
            confidence_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn analyzer() -> Analyzer {
        Analyzer::new().unwrap()
    }

    #[test]
    fn test_empty_content() {
        let verdict = analyzer().analyze_content("", "");
        assert!(!verdict.has_risk);
        assert!(verdict.risk_categories.is_empty());
        assert!(verdict.categorized_keywords.is_empty());
        assert_eq!(verdict.total_keywords_matched, 0);
        assert_eq!(verdict.overall_severity, Severity::Low);
        assert_eq!(verdict.confidence_score, 0.0);
    }

    #[test]
    fn test_safe_content() {
        let verdict = analyzer().analyze_content(
            "Cute puppies playing in the park",
            "Watch these adorable puppies have fun at the local park",
        );
        assert!(!verdict.has_risk);
        assert!(verdict.risk_categories.is_empty());
        assert_eq!(verdict.total_keywords_matched, 0);
    }

    #[test]
    fn test_risky_content() {
        let verdict = analyzer().analyze_content(
            "Warning: Dangerous Challenge Going Viral",
            "This video discusses the risks of the new viral challenge that has led to several injuries.",
        );
        assert!(verdict.has_risk);
        assert!(!verdict.risk_categories.is_empty());
        assert!(verdict.total_keywords_matched > 0);
        assert!((0.0..=1.0).contains(&verdict.confidence_score));
        assert_eq!(verdict.risk_categories, vec![RiskCategory::DangerousChallenges]);
        assert_eq!(
            verdict.matched_keywords,
            vec!["dangerous challenge".to_string(), "viral challenge".to_string()]
        );
        // weights 2 + 2: 0.3 * log2(5) ≈ 0.70, just under the high threshold
        assert_eq!(verdict.overall_severity, Severity::Medium);
    }

    #[test]
    fn test_keyword_in_either_field() {
        let analyzer = analyzer();
        let in_title = analyzer.analyze_content("Flat earth proof", "");
        let in_description = analyzer.analyze_content("", "flat earth proof");
        assert!(in_title.has_risk);
        assert_eq!(in_title, in_description);
    }

    #[test]
    fn test_keyword_in_both_fields_counted_once() {
        let verdict = analyzer().analyze_content("hoax", "another hoax");
        assert_eq!(verdict.total_keywords_matched, 1);
        assert_eq!(verdict.categorized_keywords[&RiskCategory::Misinformation], vec!["hoax"]);
    }

    #[test]
    fn test_phrase_does_not_span_fields() {
        let verdict = analyzer().analyze_content("Going fake", "news today");
        assert!(!verdict.has_risk);
    }

    #[test]
    fn test_alias_spelling_counted_once() {
        let analyzer = analyzer();
        for title in ["self harm", "self-harm", "Self Harm and self-harm"] {
            let verdict = analyzer.analyze_content(title, "");
            assert_eq!(verdict.matched_keywords, vec!["self-harm"], "{}", title);
            assert_eq!(verdict.total_keywords_matched, 1, "{}", title);
            // weight 2: 0.3 * log2(3) ≈ 0.48
            assert!((verdict.confidence_score - 0.3 * 3f64.log2()).abs() < 1e-9);
            assert_eq!(verdict.overall_severity, Severity::Medium);
        }
    }

    #[test]
    fn test_counts_keywords_not_categories() {
        let verdict = analyzer().analyze_content("Hoax and propaganda", "pure disinformation");
        assert_eq!(verdict.total_keywords_matched, 3);
        assert_eq!(verdict.risk_categories.len(), 1);
    }

    #[test]
    fn test_analyze_text_scenario() {
        let analyzer = analyzer();
        let found: HashSet<String> = analyzer
            .analyze_text("This video is a potential scam and a fraud, be warned!")
            .into_iter()
            .collect();
        let expected: HashSet<String> = ["scam", "fraud", "warning"]
            .into_iter()
            .filter(|k| analyzer.registry().contains(k))
            .map(str::to_string)
            .collect();
        assert_eq!(found, expected);
    }

    #[test]
    fn test_assign_flags_with_noise() {
        let analyzer = analyzer();
        let flags = analyzer.assign_flags(["scam", "fraud", "warning", "not_a_keyword"]);
        assert!(flags.values().flatten().all(|k| k != "not_a_keyword"));
        for (category, keywords) in &flags {
            for keyword in keywords {
                assert_eq!(analyzer.registry().category_of(keyword), Some(*category));
            }
        }
    }

    #[test]
    fn test_categories_match_flag_keys() {
        let verdict = analyzer().analyze_content(
            "Brutal gore compilation",
            "racist trolling and a conspiracy theory",
        );
        let keys: Vec<RiskCategory> = verdict.categorized_keywords.keys().copied().collect();
        assert_eq!(verdict.risk_categories, keys);
        assert_eq!(
            verdict.risk_categories,
            vec![
                RiskCategory::HateSpeech,
                RiskCategory::GraphicViolence,
                RiskCategory::Bullying,
                RiskCategory::Misinformation
            ]
        );
    }

    #[test]
    fn test_deterministic() {
        let analyzer = analyzer();
        let a = analyzer.analyze_content("murder mystery hoax", "blood everywhere");
        let b = analyzer.analyze_content("murder mystery hoax", "blood everywhere");
        assert_eq!(a, b);
    }

    #[test]
    fn test_custom_registry() {
        let table: &[(RiskCategory, &[&str])] = &[(RiskCategory::Bullying, &["hat"])];
        let registry = Arc::new(KeywordRegistry::from_table(table, &[("hat", 3)]).unwrap());
        let analyzer = Analyzer::with_registry(registry, AnalyzerConfig::default()).unwrap();

        assert!(!analyzer.analyze_content("chatting", "").has_risk);
        let verdict = analyzer.analyze_content("my hat", "");
        assert!(verdict.has_risk);
        assert_eq!(verdict.overall_severity, Severity::Medium);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = AnalyzerConfig {
            medium_threshold: 0.9,
            high_threshold: 0.5,
            ..AnalyzerConfig::default()
        };
        assert!(matches!(Analyzer::with_config(config), Err(Error::Config(_))));
    }

    #[test]
    fn test_verdict_serializes() {
        let verdict = analyzer().analyze_content("Momo challenge returns", "");
        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["has_risk"], true);
        assert_eq!(json["risk_categories"][0], "dangerous_challenges");
        assert_eq!(json["overall_severity"], verdict.overall_severity.as_str());
        assert!(json["categorized_keywords"]["dangerous_challenges"].is_array());

        let back: AnalysisVerdict = serde_json::from_value(json).unwrap();
        assert_eq!(back.risk_categories, verdict.risk_categories);
        assert_eq!(back.categorized_keywords, verdict.categorized_keywords);
        assert_eq!(back.overall_severity, verdict.overall_severity);
        assert!((back.confidence_score - verdict.confidence_score).abs() < 1e-9);
    }

    #[test]
    fn test_shared_across_threads() {
        let analyzer = analyzer();
        let expected = analyzer.analyze_content("suicide note", "");
        std::thread::scope(|scope| {
            for _ in 0..4 {
                let analyzer = &analyzer;
                let expected = &expected;
                scope.spawn(move || {
                    assert_eq!(&analyzer.analyze_content("suicide note", ""), expected);
                });
            }
        });
    }
}
