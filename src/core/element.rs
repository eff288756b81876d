use serde::{Deserialize, Serialize};

use crate::core::types::MetadataId;
use crate::utils::normalize::normalize;

/// The four alternate display-name fields of a data element, in priority order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternateNames {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_form_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl AlternateNames {
    /// The fields in priority order
    #[must_use]
    pub fn fields(&self) -> [Option<&str>; 4] {
        [
            self.form_name.as_deref(),
            self.display_form_name.as_deref(),
            self.display_name.as_deref(),
            self.name.as_deref(),
        ]
    }

    /// The highest-priority non-empty field
    #[must_use]
    pub fn preferred(&self) -> Option<&str> {
        self.fields()
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
    }

    /// Every distinct non-empty field under exact normalization, in priority order
    #[must_use]
    pub fn candidates(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::with_capacity(4);
        for field in self.fields().into_iter().flatten() {
            let name = normalize(field);
            if !name.is_empty() && !out.contains(&name) {
                out.push(name);
            }
        }
        out
    }
}

/// A metadata-side item carrying several alternate display names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataElement {
    /// Identifier, unique across the metadata export
    pub id: MetadataId,

    /// Raw alternate name fields
    pub names: AlternateNames,

    /// Distinct normalized names this element can be matched by
    pub candidates: Vec<String>,
}

impl DataElement {
    pub fn new(id: impl Into<String>, names: AlternateNames) -> Self {
        let candidates = names.candidates();
        Self {
            id: MetadataId::new(id),
            names,
            candidates,
        }
    }

    /// Display label for reports
    #[must_use]
    pub fn label(&self) -> &str {
        self.names.preferred().unwrap_or(self.id.as_str())
    }
}

/// A named group of data elements from the metadata export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataSection {
    pub id: MetadataId,

    /// Canonical section name (see [`crate::utils::normalize::section_name`])
    pub name: String,

    /// `name` field as exported
    pub raw_name: String,

    /// `displayName` field as exported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Position in the export's section list
    pub ordinal: usize,

    /// Resolved elements in reference order
    pub elements: Vec<DataElement>,

    /// References with no backing record, dropped from the candidate pool
    #[serde(default)]
    pub unresolved: usize,
}

impl MetadataSection {
    /// Union of all element candidate names, first occurrence order
    #[must_use]
    pub fn candidate_pool(&self) -> Vec<&str> {
        let mut pool: Vec<&str> = Vec::new();
        for candidate in self.elements.iter().flat_map(|e| e.candidates.iter()) {
            if !pool.contains(&candidate.as_str()) {
                pool.push(candidate);
            }
        }
        pool
    }

    /// Name used when grouping duplicates: `displayName`, falling back to `name`
    #[must_use]
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(&self.raw_name)
    }
}
