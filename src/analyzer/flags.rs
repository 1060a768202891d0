//! Grouping of matched keywords by risk category.

use std::collections::BTreeMap;

use crate::registry::{KeywordRegistry, RiskCategory};

/// Matched keywords grouped by category.
///
/// Only categories that received at least one keyword are present.
pub type FlagAssignment = BTreeMap<RiskCategory, Vec<String>>;

/// Group `keywords` by their registered category.
///
/// Keywords the registry does not know are skipped. Within a category the
/// input order is kept.
pub fn assign_flags<I, S>(registry: &KeywordRegistry, keywords: I) -> FlagAssignment
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut flags = FlagAssignment::new();
    for keyword in keywords {
        let keyword = keyword.as_ref();
        if let Some(category) = registry.category_of(keyword) {
            flags
                .entry(category)
                .or_default()
                .push(keyword.to_string());
        }
    }
    flags
}
