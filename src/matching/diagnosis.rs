use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::types::{MatchMode, MetadataId, SectionStatus};

/// A checklist question with no exact counterpart in its matched section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionMismatch {
    /// Question label as normalized for comparison
    pub label: String,

    /// 1-based source line of the question in the checklist file
    pub line: usize,

    /// Candidate names equal to the label once case and whitespace are ignored
    #[serde(default)]
    pub near_misses: Vec<String>,

    /// Closest candidate names with their similarity score, best first.
    /// Only filled when there is no near-miss.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<(String, f64)>,
}

impl QuestionMismatch {
    /// Only formatting differs from at least one candidate
    #[must_use]
    pub fn is_formatting(&self) -> bool {
        !self.near_misses.is_empty()
    }
}

/// Outcome for one checklist section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionReport {
    /// Canonical checklist section name
    pub name: String,

    /// Position among the checklist's sections
    pub ordinal: usize,

    pub status: SectionStatus,

    /// Id of the metadata section this one was matched to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_section_id: Option<MetadataId>,

    /// Canonical name of the matched metadata section
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_section_name: Option<String>,

    pub question_count: usize,

    /// Questions found under exact comparison
    #[serde(default)]
    pub matched_questions: usize,

    /// Questions that fail the section
    #[serde(default)]
    pub mismatches: Vec<QuestionMismatch>,

    /// Near-misses tolerated in lenient mode
    #[serde(default)]
    pub formatting: Vec<QuestionMismatch>,

    /// Metadata section names offered when no section matched
    #[serde(default)]
    pub hints: Vec<String>,
}

impl SectionReport {
    /// A report with no findings yet
    #[must_use]
    pub fn new(name: impl Into<String>, ordinal: usize, question_count: usize) -> Self {
        Self {
            name: name.into(),
            ordinal,
            status: SectionStatus::Pass,
            matched_section_id: None,
            matched_section_name: None,
            question_count,
            matched_questions: 0,
            mismatches: Vec::new(),
            formatting: Vec::new(),
            hints: Vec::new(),
        }
    }

    /// Mismatches with no near-miss at all
    pub fn true_mismatches(&self) -> impl Iterator<Item = &QuestionMismatch> {
        self.mismatches.iter().filter(|m| !m.is_formatting())
    }

    /// Counted in the overall mismatch total
    #[must_use]
    pub fn is_mismatched(&self) -> bool {
        matches!(self.status, SectionStatus::Missing | SectionStatus::Fail)
    }
}

/// Result of one reconciliation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileReport {
    pub generated_at: DateTime<Utc>,

    pub match_mode: MatchMode,

    /// Section filter in effect, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_section: Option<String>,

    /// One entry per checklist section considered, in checklist order
    pub sections: Vec<SectionReport>,

    pub passed: usize,
    pub mismatched: usize,
    pub skipped: usize,
}

impl ReconcileReport {
    /// Build a report and tally the section outcomes
    #[must_use]
    pub fn new(
        match_mode: MatchMode,
        target_section: Option<String>,
        sections: Vec<SectionReport>,
    ) -> Self {
        let mut passed = 0;
        let mut mismatched = 0;
        let mut skipped = 0;
        for section in &sections {
            match section.status {
                SectionStatus::Pass => passed += 1,
                SectionStatus::Missing | SectionStatus::Fail => mismatched += 1,
                SectionStatus::Skipped => skipped += 1,
            }
        }

        Self {
            generated_at: Utc::now(),
            match_mode,
            target_section,
            sections,
            passed,
            mismatched,
            skipped,
        }
    }

    #[must_use]
    pub fn has_mismatches(&self) -> bool {
        self.mismatched > 0
    }

    /// Sections with the given status
    pub fn with_status(&self, status: SectionStatus) -> impl Iterator<Item = &SectionReport> {
        self.sections.iter().filter(move |s| s.status == status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(name: &str, status: SectionStatus) -> SectionReport {
        SectionReport {
            status,
            ..SectionReport::new(name, 0, 1)
        }
    }

    #[test]
    fn test_report_tallies() {
        let report = ReconcileReport::new(
            MatchMode::Lenient,
            None,
            vec![
                section("LABORATORY", SectionStatus::Pass),
                section("PHARMACY", SectionStatus::Fail),
                section("X-RAY ROOM", SectionStatus::Missing),
                section("EMPTY", SectionStatus::Skipped),
            ],
        );
        assert_eq!(report.passed, 1);
        assert_eq!(report.mismatched, 2);
        assert_eq!(report.skipped, 1);
        assert!(report.has_mismatches());
        assert_eq!(report.with_status(SectionStatus::Missing).count(), 1);
    }

    #[test]
    fn test_true_mismatches_exclude_near_misses() {
        let mut report = SectionReport::new("LABORATORY", 0, 2);
        report.mismatches.push(QuestionMismatch {
            label: "Microscope ?".to_string(),
            line: 3,
            near_misses: vec!["Microscope?".to_string()],
            suggestions: Vec::new(),
        });
        report.mismatches.push(QuestionMismatch {
            label: "Centrifuge?".to_string(),
            line: 4,
            near_misses: Vec::new(),
            suggestions: vec![("Centrifuge functional?".to_string(), 0.61)],
        });
        let labels: Vec<_> = report.true_mismatches().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["Centrifuge?"]);
    }

    #[test]
    fn test_status_serializes_upper_case() {
        let json = serde_json::to_value(section("LABORATORY", SectionStatus::Missing)).unwrap();
        assert_eq!(json["status"], "MISSING");
        assert!(json.get("matched_section_id").is_none());
    }
}
