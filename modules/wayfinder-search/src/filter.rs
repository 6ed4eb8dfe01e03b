use std::collections::HashSet;

use wayfinder_core::ContentEntry;

/// Entries tagged with at least one of `keywords` (case-insensitive OR), in
/// catalog order. No keywords selects nothing.
pub fn filter(catalog: &[ContentEntry], keywords: &[String]) -> Vec<ContentEntry> {
    if keywords.is_empty() {
        return Vec::new();
    }

    let wanted: HashSet<String> = keywords.iter().map(|k| k.to_lowercase()).collect();

    catalog
        .iter()
        .filter(|entry| {
            entry
                .keywords
                .iter()
                .any(|tag| wanted.contains(&tag.to_lowercase()))
        })
        .cloned()
        .collect()
}
