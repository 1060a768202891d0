//! Keyword registry: the keyword → risk category table.
//!
//! The registry is built once, validated, and then only read. Analyzers hold
//! it behind an `Arc` so many threads can scan against the same table.
//!
//! # Invariants
//!
//! Every keyword maps to exactly one category, and every mapped keyword is
//! part of the keyword set. Construction fails with [`Error::Registry`] when
//! a table breaks this, so an inconsistent table never reaches an analyzer.
//!
//! Spellings that tokenize the same way (`self-harm`, `self harm`) are one
//! phrase. The first spelling in registry order is the one reported, and
//! every spelling carries the highest weight given to any of them.

mod keywords;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::Error;

/// Weight used for keywords without an explicit entry in the weight table.
pub const DEFAULT_WEIGHT: u8 = 1;

/// Highest weight a keyword may carry.
pub const MAX_WEIGHT: u8 = 3;

/// Content-harm classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    HateSpeech,
    SelfHarm,
    GraphicViolence,
    ExplicitContent,
    Bullying,
    DangerousChallenges,
    Misinformation,
}

impl RiskCategory {
    /// All categories, in registry order.
    pub const ALL: [RiskCategory; 7] = [
        RiskCategory::HateSpeech,
        RiskCategory::SelfHarm,
        RiskCategory::GraphicViolence,
        RiskCategory::ExplicitContent,
        RiskCategory::Bullying,
        RiskCategory::DangerousChallenges,
        RiskCategory::Misinformation,
    ];

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::HateSpeech => "hate_speech",
            RiskCategory::SelfHarm => "self_harm",
            RiskCategory::GraphicViolence => "graphic_violence",
            RiskCategory::ExplicitContent => "explicit_content",
            RiskCategory::Bullying => "bullying",
            RiskCategory::DangerousChallenges => "dangerous_challenges",
            RiskCategory::Misinformation => "misinformation",
        }
    }

    /// Parse from string. Accepts both `hate_speech` and `HATE_SPEECH`.
    pub fn from_str(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A registered keyword with its category and severity weight.
#[derive(Debug, Clone)]
pub struct KeywordEntry {
    keyword: String,
    category: RiskCategory,
    weight: u8,
    tokens: Vec<String>,
    alias_of: Option<usize>,
}

impl KeywordEntry {
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn category(&self) -> RiskCategory {
        self.category
    }

    pub fn weight(&self) -> u8 {
        self.weight
    }

    /// The keyword split into lowercase alphanumeric tokens.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Whether this entry is an alternate spelling of an earlier keyword.
    pub fn is_alias(&self) -> bool {
        self.alias_of.is_some()
    }
}

/// Split text into lowercase alphanumeric tokens.
///
/// Everything that is not alphanumeric is a boundary, so `Self-Harm!`
/// yields `["self", "harm"]`.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Immutable keyword → category table with severity weights.
#[derive(Debug, Clone)]
pub struct KeywordRegistry {
    entries: Vec<KeywordEntry>,
    index: HashMap<String, usize>,
    by_first_token: HashMap<String, Vec<usize>>,
}

static SHARED: Lazy<Result<Arc<KeywordRegistry>, String>> =
    Lazy::new(|| KeywordRegistry::builtin().map(Arc::new).map_err(|e| e.to_string()));

impl KeywordRegistry {
    /// Build the compiled-in registry.
    pub fn builtin() -> Result<Self, Error> {
        Self::from_table(keywords::CATEGORY_TABLE, keywords::SEVERITY_WEIGHTS)
    }

    /// Process-wide builtin registry, built on first use.
    pub fn shared() -> Result<Arc<Self>, Error> {
        (*SHARED).clone().map_err(Error::Registry)
    }

    /// Build a registry from a category table and a weight table.
    ///
    /// Keywords missing from `weights` get [`DEFAULT_WEIGHT`].
    pub fn from_table<K>(
        categories: &[(RiskCategory, &[K])],
        weights: &[(&str, u8)],
    ) -> Result<Self, Error>
    where
        K: AsRef<str>,
    {
        let mut entries: Vec<KeywordEntry> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        // First spelling of each token form; later spellings must share its category.
        let mut token_forms: HashMap<String, usize> = HashMap::new();

        for (category, keywords) in categories {
            for keyword in keywords.iter() {
                let keyword: &str = keyword.as_ref();
                if keyword.trim().is_empty() {
                    return Err(reject(format!("empty keyword in category '{}'", category)));
                }
                if keyword != keyword.to_lowercase() {
                    return Err(reject(format!("keyword '{}' is not lowercase", keyword)));
                }
                let tokens = tokenize(keyword);
                if tokens.is_empty() {
                    return Err(reject(format!(
                        "keyword '{}' has no alphanumeric characters",
                        keyword
                    )));
                }
                if let Some(&existing) = index.get(keyword) {
                    return Err(reject(format!(
                        "keyword '{}' is listed under both '{}' and '{}'",
                        keyword, entries[existing].category, category
                    )));
                }
                let form = tokens.join(" ");
                let alias_of = match token_forms.get(&form) {
                    Some(&first) if entries[first].category != *category => {
                        return Err(reject(format!(
                            "keyword '{}' collides with a '{}' keyword spelled differently",
                            keyword, entries[first].category
                        )));
                    }
                    Some(&first) => Some(first),
                    None => {
                        token_forms.insert(form, entries.len());
                        None
                    }
                };

                index.insert(keyword.to_string(), entries.len());
                entries.push(KeywordEntry {
                    keyword: keyword.to_string(),
                    category: *category,
                    weight: DEFAULT_WEIGHT,
                    tokens,
                    alias_of,
                });
            }
        }

        for &(keyword, weight) in weights {
            let Some(&position) = index.get(keyword) else {
                return Err(reject(format!(
                    "weight given for unregistered keyword '{}'",
                    keyword
                )));
            };
            if !(DEFAULT_WEIGHT..=MAX_WEIGHT).contains(&weight) {
                return Err(reject(format!(
                    "weight {} for '{}' is outside {}..={}",
                    weight, keyword, DEFAULT_WEIGHT, MAX_WEIGHT
                )));
            }
            entries[position].weight = weight;
        }

        // Aliases always follow their first spelling, so two passes settle the group.
        for position in 0..entries.len() {
            if let Some(first) = entries[position].alias_of {
                let weight = entries[first].weight.max(entries[position].weight);
                entries[first].weight = weight;
            }
        }
        for position in 0..entries.len() {
            if let Some(first) = entries[position].alias_of {
                entries[position].weight = entries[first].weight;
            }
        }

        if index.len() != entries.len() {
            return Err(reject(format!(
                "keyword set has {} entries but the category map has {}",
                entries.len(),
                index.len()
            )));
        }

        let mut by_first_token: HashMap<String, Vec<usize>> = HashMap::new();
        for (position, entry) in entries.iter().enumerate() {
            if entry.is_alias() {
                continue;
            }
            by_first_token
                .entry(entry.tokens[0].clone())
                .or_default()
                .push(position);
        }

        Ok(Self {
            entries,
            index,
            by_first_token,
        })
    }

    /// Number of registered keywords.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All keywords, in registry order.
    pub fn all_keywords(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.keyword.as_str())
    }

    /// All entries, in registry order.
    pub fn entries(&self) -> &[KeywordEntry] {
        &self.entries
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.index.contains_key(keyword)
    }

    pub fn entry(&self, keyword: &str) -> Option<&KeywordEntry> {
        self.index.get(keyword).map(|&position| &self.entries[position])
    }

    /// Category a keyword belongs to, if registered.
    pub fn category_of(&self, keyword: &str) -> Option<RiskCategory> {
        self.entry(keyword).map(KeywordEntry::category)
    }

    /// Severity weight of a keyword; unregistered keywords weigh nothing.
    pub fn weight_of(&self, keyword: &str) -> u8 {
        self.entry(keyword).map(KeywordEntry::weight).unwrap_or(0)
    }

    /// Keywords registered under `category`, in registry order.
    pub fn keywords_for(&self, category: RiskCategory) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(move |entry| entry.category == category)
            .map(|entry| entry.keyword.as_str())
    }

    /// Non-alias entries whose first token is `token`, in registry order.
    pub(crate) fn candidates(&self, token: &str) -> &[usize] {
        self.by_first_token
            .get(token)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

fn reject(reason: String) -> Error {
    warn!(%reason, "rejecting keyword table");
    Error::Registry(reason)
}
