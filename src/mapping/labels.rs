//! Label partitioning: areas, people, and pass-through labels.

use crate::config::SyncConfig;

/// Outcome of splitting a source label multiset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LabelPartition {
    /// Canonical (uppercase) area names matched from labels, sorted and
    /// deduplicated.
    pub areas: Vec<String>,
    /// Person names extracted from `@`-prefixed labels, prefix stripped.
    pub people: Vec<String>,
    /// Remaining labels, passed through to the labels multi-select
    /// verbatim.
    pub passthrough: Vec<String>,
}

/// Normalizes a label into its canonical area-comparison form: trimmed,
/// trailing non-ASCII marker characters (emoji) removed, inner whitespace
/// collapsed, uppercased.
#[must_use]
pub fn canonical_area_name(label: &str) -> String {
    let without_marker: String = {
        let mut chars: Vec<char> = label.trim().chars().collect();
        while chars.last().is_some_and(|c| (*c as u32) > 127 || c.is_whitespace()) {
            chars.pop();
        }
        chars.into_iter().collect()
    };
    without_marker
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Splits an item's labels into area matches, person names, and
/// pass-through labels.
///
/// The eligibility tag never passes through, area matching is
/// case-insensitive against the configured canonical set, and the person
/// form of the eligibility tag (`@capsync`) is not a person.
#[must_use]
pub fn partition_labels(labels: &[String], config: &SyncConfig) -> LabelPartition {
    let area_set: Vec<String> = config
        .area_names
        .iter()
        .map(|name| canonical_area_name(name))
        .collect();
    let person_tag = config.eligibility_person_label();

    let mut partition = LabelPartition::default();
    for label in labels {
        if label == &config.eligibility_tag {
            continue;
        }
        if let Some(person) = label.strip_prefix('@') {
            if label != &person_tag && !person.is_empty() {
                partition.people.push(person.to_owned());
            }
            continue;
        }
        let canonical = canonical_area_name(label);
        if area_set.contains(&canonical) {
            partition.areas.push(canonical);
        } else {
            partition.passthrough.push(label.clone());
        }
    }

    partition.areas.sort();
    partition.areas.dedup();
    partition.passthrough.sort();
    partition
}
