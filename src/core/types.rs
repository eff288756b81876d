use serde::{Deserialize, Serialize};

/// Opaque identifier of a metadata record (section or data element)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MetadataId(pub String);

impl MetadataId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MetadataId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How strictly question labels must agree for a section to pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Any label without an exact match fails the section
    Strict,
    /// Only true mismatches fail; near-misses are reported as formatting drift
    #[default]
    Lenient,
}

/// What to do with question rows seen before the first section header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreamblePolicy {
    /// Count them as noise and drop them
    #[default]
    Drop,
    /// Gather them into a synthetic `PREAMBLE` section
    Collect,
}

/// Outcome of reconciling one checklist section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SectionStatus {
    /// Matched a metadata section and every question was found
    Pass,
    /// No metadata section carries this name
    Missing,
    /// Matched, but some questions have no counterpart
    Fail,
    /// The section has no questions to check
    Skipped,
}

impl std::fmt::Display for SectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Missing => write!(f, "MISSING"),
            Self::Fail => write!(f, "FAIL"),
            Self::Skipped => write!(f, "SKIPPED"),
        }
    }
}

/// Classification of one checklist row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    /// Empty label, not classified
    Blank,
    /// Opens a new section
    Header,
    /// Belongs to the most recently opened section
    Question,
    /// Non-empty row that belongs nowhere (e.g. before the first header)
    Noise,
}
