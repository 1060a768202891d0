//! Persistence-facing views of analyzer verdicts.
//!
//! A flagged video is stored as one [`AnalysisRecord`] per matched
//! category. A scan over many videos is tallied in a [`ScanSummary`], which
//! decides whether the parent should be alerted.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::analyzer::{AnalysisVerdict, Severity};
use crate::registry::RiskCategory;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// One stored flag: a video's matches within a single category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub risk_category: RiskCategory,
    pub severity: Severity,
    /// Title and description, whitespace collapsed and truncated
    pub flagged_text: String,
    pub keywords_matched: Vec<String>,
    pub confidence_score: f64,
}

impl AnalysisVerdict {
    /// Split a verdict into one record per matched category.
    ///
    /// Clean verdicts produce no records.
    pub fn to_records(&self, title: &str, description: &str, limit: usize) -> Vec<AnalysisRecord> {
        if !self.has_risk {
            return Vec::new();
        }

        let flagged_text = flagged_text(title, description, limit);
        self.categorized_keywords
            .iter()
            .map(|(category, keywords)| AnalysisRecord {
                risk_category: *category,
                severity: self.overall_severity,
                flagged_text: flagged_text.clone(),
                keywords_matched: keywords.clone(),
                confidence_score: self.confidence_score,
            })
            .collect()
    }
}

/// Join title and description and keep at most `limit` characters.
pub fn flagged_text(title: &str, description: &str, limit: usize) -> String {
    let joined = format!("{} {}", title, description);
    let collapsed = WHITESPACE_RUN.replace_all(joined.trim(), " ");
    collapsed.chars().take(limit).collect()
}

/// Running totals for a scan over many videos.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub videos_analyzed: usize,
    pub videos_flagged: usize,
    /// Keywords across all stored records
    pub flags_found: usize,
    /// Categories seen so far, in registry order
    pub categories: Vec<RiskCategory>,
    pub highest_severity: Option<Severity>,
}

impl ScanSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one video's verdict into the totals.
    pub fn record(&mut self, verdict: &AnalysisVerdict) {
        self.videos_analyzed += 1;
        if !verdict.has_risk {
            return;
        }

        self.videos_flagged += 1;
        self.flags_found += verdict
            .categorized_keywords
            .values()
            .map(Vec::len)
            .sum::<usize>();

        for category in &verdict.risk_categories {
            if let Err(position) = self.categories.binary_search(category) {
                self.categories.insert(position, *category);
            }
        }

        self.highest_severity = Some(match self.highest_severity {
            Some(current) => current.max(verdict.overall_severity),
            None => verdict.overall_severity,
        });
    }

    /// Whether any flag was found, which warrants a new-flags alert.
    pub fn requires_alert(&self) -> bool {
        self.flags_found > 0
    }

    /// Whether any video reached high severity.
    pub fn is_high_risk(&self) -> bool {
        self.highest_severity == Some(Severity::High)
    }
}

impl<'a> Extend<&'a AnalysisVerdict> for ScanSummary {
    fn extend<T: IntoIterator<Item = &'a AnalysisVerdict>>(&mut self, iter: T) {
        for verdict in iter {
            self.record(verdict);
        }
    }
}
