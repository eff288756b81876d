use serde::{Deserialize, Serialize};

use crate::core::element::{DataElement, MetadataSection};
use crate::core::section::{ChecklistSection, Facility};
use crate::core::types::RowKind;
use crate::utils::normalize::{section_name, Normalization};

/// Per-run row classification counts for a checklist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    /// Data rows seen (header rows excluded)
    pub rows: usize,
    pub blank: usize,
    pub headers: usize,
    pub questions: usize,
    pub noise: usize,
}

impl ParseStats {
    pub fn record(&mut self, kind: RowKind) {
        self.rows += 1;
        match kind {
            RowKind::Blank => self.blank += 1,
            RowKind::Header => self.headers += 1,
            RowKind::Question => self.questions += 1,
            RowKind::Noise => self.noise += 1,
        }
    }

    /// Every data row was classified exactly once
    #[must_use]
    pub fn is_conserved(&self) -> bool {
        self.rows == self.blank + self.headers + self.questions + self.noise
    }
}

/// The checklist as a two-level tree: sections holding questions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChecklistTree {
    /// Facility columns in header order
    pub facilities: Vec<Facility>,

    /// Sections in source order; same-named headers are kept apart
    pub sections: Vec<ChecklistSection>,

    pub stats: ParseStats,
}

impl ChecklistTree {
    #[must_use]
    pub fn question_count(&self) -> usize {
        self.sections.iter().map(|s| s.questions.len()).sum()
    }

    /// Sections whose canonical name equals `name` (space-insensitive)
    pub fn sections_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a ChecklistSection> + 'a {
        let wanted = Normalization::SpaceInsensitive.apply(&section_name(name));
        self.sections
            .iter()
            .filter(move |s| Normalization::SpaceInsensitive.apply(&s.name) == wanted)
    }

    /// Facility column whose name contains `query`, case-insensitively.
    /// An exact (case-insensitive) name wins over a substring hit.
    #[must_use]
    pub fn find_facility(&self, query: &str) -> Option<&Facility> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }
        self.facilities
            .iter()
            .find(|f| f.name.to_lowercase() == query)
            .or_else(|| {
                self.facilities
                    .iter()
                    .find(|f| f.name.to_lowercase().contains(&query))
            })
    }
}

/// The metadata export as a two-level tree: sections holding data elements
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataTree {
    /// Sections in export order
    pub sections: Vec<MetadataSection>,

    /// Every resolvable data element, first record per id, in export order
    pub elements: Vec<DataElement>,
}

impl MetadataTree {
    /// Total references dropped because no backing record exists
    #[must_use]
    pub fn unresolved_count(&self) -> usize {
        self.sections.iter().map(|s| s.unresolved).sum()
    }

    /// Data elements with any candidate name containing `keyword` (case-insensitive)
    #[must_use]
    pub fn find_elements(&self, keyword: &str) -> Vec<&DataElement> {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() {
            return Vec::new();
        }
        self.elements
            .iter()
            .filter(|e| {
                e.candidates
                    .iter()
                    .any(|c| c.to_lowercase().contains(&keyword))
            })
            .collect()
    }
}
