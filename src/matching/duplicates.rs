use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::tree::{ChecklistTree, MetadataTree};
use crate::core::types::MetadataId;
use crate::utils::normalize::Normalization;

/// One section name that occurs more than once
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Section key shared by every occurrence
    pub name: String,

    /// Number of occurrences
    pub count: usize,

    /// Checklist section ordinals (checklist side only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ordinals: Vec<usize>,

    /// Distinct metadata section ids (metadata side only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ids: Vec<MetadataId>,
}

impl DuplicateGroup {
    fn new(name: String) -> Self {
        Self {
            name,
            count: 0,
            ordinals: Vec::new(),
            ids: Vec::new(),
        }
    }
}

/// Duplicate sections found in one tree, sorted by name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateReport {
    pub groups: Vec<DuplicateGroup>,
}

impl DuplicateReport {
    fn from_groups(groups: BTreeMap<String, DuplicateGroup>) -> Self {
        Self {
            groups: groups.into_values().filter(|g| g.count > 1).collect(),
        }
    }

    /// Section name to occurrence count
    #[must_use]
    pub fn counts(&self) -> BTreeMap<String, usize> {
        self.groups
            .iter()
            .map(|g| (g.name.clone(), g.count))
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&DuplicateGroup> {
        self.groups.iter().find(|g| g.name == name)
    }
}

/// Checklist sections whose names collide once `SECTION <n> -` prefixes and
/// spacing are ignored
#[must_use]
pub fn find_checklist_duplicates(tree: &ChecklistTree) -> DuplicateReport {
    let mut groups: BTreeMap<String, DuplicateGroup> = BTreeMap::new();
    for section in &tree.sections {
        let key = Normalization::SectionKey.apply(&section.raw_name);
        if key.is_empty() {
            continue;
        }
        let group = groups
            .entry(key.clone())
            .or_insert_with(|| DuplicateGroup::new(key));
        group.count += 1;
        group.ordinals.push(section.ordinal);
    }

    let report = DuplicateReport::from_groups(groups);
    debug!(groups = report.groups.len(), "Checklist duplicate scan done");
    report
}

/// Metadata sections sharing a display name, with the ids behind each name
#[must_use]
pub fn find_metadata_duplicates(tree: &MetadataTree) -> DuplicateReport {
    let mut groups: BTreeMap<String, DuplicateGroup> = BTreeMap::new();
    for section in &tree.sections {
        let key = Normalization::SectionKey.apply(section.label());
        if key.is_empty() {
            continue;
        }
        let group = groups
            .entry(key.clone())
            .or_insert_with(|| DuplicateGroup::new(key));
        group.count += 1;
        if !group.ids.contains(&section.id) {
            group.ids.push(section.id.clone());
        }
    }

    let report = DuplicateReport::from_groups(groups);
    debug!(groups = report.groups.len(), "Metadata duplicate scan done");
    report
}
