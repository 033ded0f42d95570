//! Grouped issue-status lookup used by the status filter.
//!
//! Group names are read-only headings; only leaf statuses are selectable.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Group heading → ordered leaf statuses, in display order.
pub const STATUS_GROUPS: &[(&str, &[&str])] = &[
    ("To Do", &["Open", "To Do", "Reopened"]),
    ("In Development", &["In development", "Code Review"]),
    ("In Testing", &["Ready for QA", "In QA"]),
    (
        "Completed",
        &["Ready for Release", "Ready for Showcase", "Closed", "Done", "Canceled"],
    ),
];

static LEAF_TO_GROUP: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    STATUS_GROUPS
        .iter()
        .flat_map(|(group, leaves)| leaves.iter().map(move |leaf| (*leaf, *group)))
        .collect()
});

/// Iterates every selectable status in group order.
pub fn leaf_statuses() -> impl Iterator<Item = &'static str> {
    STATUS_GROUPS.iter().flat_map(|(_, leaves)| leaves.iter().copied())
}

pub fn is_leaf(label: &str) -> bool {
    LEAF_TO_GROUP.contains_key(label)
}

pub fn is_group(label: &str) -> bool {
    STATUS_GROUPS.iter().any(|(group, _)| *group == label)
}

/// Returns the heading a leaf status is listed under.
pub fn group_of(leaf: &str) -> Option<&'static str> {
    LEAF_TO_GROUP.get(leaf).copied()
}

pub fn leaves_of(group: &str) -> Option<&'static [&'static str]> {
    STATUS_GROUPS
        .iter()
        .find(|(name, _)| *name == group)
        .map(|(_, leaves)| *leaves)
}
