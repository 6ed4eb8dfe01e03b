use std::collections::HashSet;

use tracing::debug;
use wayfinder_core::KeywordRegistry;

/// Keep only keywords on the allow-list.
///
/// Comparison is case-insensitive; input order and casing are kept, and
/// case-insensitive repeats are dropped (first occurrence wins).
pub fn validate(keywords: &[String], registry: &KeywordRegistry) -> Vec<String> {
    let mut seen = HashSet::new();
    let validated: Vec<String> = keywords
        .iter()
        .filter(|kw| registry.contains(kw))
        .filter(|kw| seen.insert(kw.to_lowercase()))
        .cloned()
        .collect();

    if validated.len() < keywords.len() {
        debug!(
            kept = validated.len(),
            dropped = keywords.len() - validated.len(),
            "Dropped keywords not on the allow-list"
        );
    }

    validated
}
