//! Label Differ
//!
//! Three-way comparison between the wanted label set and a repository's labels

use std::collections::{HashMap, HashSet};

use crate::config::Label;

/// Result of comparing wanted labels with the labels on a repository
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelDiff {
    /// Wanted labels absent from the repository
    pub missing: Vec<Label>,

    /// Wanted labels present by name but with a different color or description
    pub incorrect: Vec<Label>,

    /// Repository labels absent from the wanted set
    pub extra: Vec<Label>,
}

impl LabelDiff {
    /// Whether the repository already matches the wanted set
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.incorrect.is_empty() && self.extra.is_empty()
    }
}

/// Compute missing, incorrect and extra labels
///
/// `missing` and `incorrect` carry the wanted records in `wanted` order;
/// `extra` carries the repository records in `current` order.
pub fn diff_labels(wanted: &[Label], current: &[Label]) -> LabelDiff {
    let current_by_name: HashMap<&str, &Label> = current
        .iter()
        .map(|label| (label.name.as_str(), label))
        .collect();
    let wanted_names: HashSet<&str> = wanted.iter().map(|label| label.name.as_str()).collect();

    let mut diff = LabelDiff::default();

    for wanted_label in wanted {
        match current_by_name.get(wanted_label.name.as_str()) {
            None => diff.missing.push(wanted_label.clone()),
            Some(current_label) if !wanted_label.is_correct(current_label) => {
                diff.incorrect.push(wanted_label.clone())
            }
            Some(_) => {}
        }
    }

    diff.extra = current
        .iter()
        .filter(|label| !wanted_names.contains(label.name.as_str()))
        .cloned()
        .collect();

    diff
}
