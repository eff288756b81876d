use serde::{Deserialize, Serialize};

use crate::utils::normalize::normalize;

/// One facility-type column of the checklist header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facility {
    /// Zero-based position among the facility columns (column `index + 1` in the row)
    pub index: usize,

    /// Header text with encoding debris trimmed from both ends
    pub name: String,
}

impl Facility {
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
        }
    }
}

/// A single checklist item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Label text as it appears in the source (trimmed)
    pub label: String,

    /// 1-based line in the source file where the question starts
    pub line: usize,

    /// One flag per facility column, in header order
    pub applicability: Vec<bool>,
}

impl Question {
    pub fn new(label: impl Into<String>, line: usize, applicability: Vec<bool>) -> Self {
        Self {
            label: label.into(),
            line,
            applicability,
        }
    }

    /// Label under exact normalization
    #[must_use]
    pub fn normalized_label(&self) -> String {
        normalize(&self.label)
    }

    /// Whether this question applies to the facility column `index`
    #[must_use]
    pub fn is_applicable(&self, index: usize) -> bool {
        self.applicability.get(index).copied().unwrap_or(false)
    }
}

/// A named group of questions from the checklist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistSection {
    /// Canonical section name (see [`crate::utils::normalize::section_name`])
    pub name: String,

    /// Header text as it appears in the source (trimmed)
    pub raw_name: String,

    /// Position among the checklist's sections
    pub ordinal: usize,

    /// 1-based source line of the header row (0 for a synthetic preamble section)
    pub line: usize,

    /// Questions in source order
    pub questions: Vec<Question>,
}

impl ChecklistSection {
    pub fn new(
        name: impl Into<String>,
        raw_name: impl Into<String>,
        ordinal: usize,
        line: usize,
    ) -> Self {
        Self {
            name: name.into(),
            raw_name: raw_name.into(),
            ordinal,
            line,
            questions: Vec::new(),
        }
    }

    /// Number of questions applicable to each facility column
    #[must_use]
    pub fn applicability_counts(&self, facility_count: usize) -> Vec<usize> {
        let mut counts = vec![0; facility_count];
        for question in &self.questions {
            for (j, count) in counts.iter_mut().enumerate() {
                if question.is_applicable(j) {
                    *count += 1;
                }
            }
        }
        counts
    }

    /// Questions applicable to the facility column `index`
    pub fn applicable_to(&self, index: usize) -> impl Iterator<Item = &Question> {
        self.questions.iter().filter(move |q| q.is_applicable(index))
    }
}
