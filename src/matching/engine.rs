use serde::{Deserialize, Serialize};
use strsim::normalized_levenshtein;
use tracing::{debug, info};

use crate::core::element::MetadataSection;
use crate::core::section::ChecklistSection;
use crate::core::tree::{ChecklistTree, MetadataTree};
use crate::core::types::{MatchMode, SectionStatus};
use crate::matching::diagnosis::{QuestionMismatch, ReconcileReport, SectionReport};
use crate::utils::normalize::Normalization;

/// Default number of hint names offered for a missing section
pub const DEFAULT_HINT_LIMIT: usize = 3;

/// Default number of leading characters a hint name must contain
pub const DEFAULT_HINT_PREFIX_LEN: usize = 10;

/// Default similarity a candidate must exceed to be suggested for a mismatch
pub const DEFAULT_SUGGEST_THRESHOLD: f64 = 0.6;

/// Configuration for a reconciliation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconcileConfig {
    /// Only reconcile checklist sections with this name (space-insensitive)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_section: Option<String>,

    pub match_mode: MatchMode,

    /// Maximum hint names attached to a missing section
    pub hint_limit: usize,

    /// Leading characters of the checklist name a hint must contain
    pub hint_prefix_len: usize,

    /// Similarity in `0.0..=1.0` a candidate must exceed to be suggested for a
    /// mismatched question. At most `hint_limit` suggestions are kept.
    pub suggest_threshold: f64,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            target_section: None,
            match_mode: MatchMode::default(),
            hint_limit: DEFAULT_HINT_LIMIT,
            hint_prefix_len: DEFAULT_HINT_PREFIX_LEN,
            suggest_threshold: DEFAULT_SUGGEST_THRESHOLD,
        }
    }
}

/// Reconcile a checklist against a metadata export with the given configuration
#[must_use]
pub fn reconcile(
    checklist: &ChecklistTree,
    metadata: &MetadataTree,
    config: &ReconcileConfig,
) -> ReconcileReport {
    ReconcileEngine::with_config(metadata, config.clone()).reconcile(checklist)
}

/// Cross-checks checklist sections against one metadata export
pub struct ReconcileEngine<'a> {
    metadata: &'a MetadataTree,
    config: ReconcileConfig,
}

impl<'a> ReconcileEngine<'a> {
    /// Create a new engine with default configuration
    pub fn new(metadata: &'a MetadataTree) -> Self {
        Self {
            metadata,
            config: ReconcileConfig::default(),
        }
    }

    /// Create a new engine with custom configuration
    pub fn with_config(metadata: &'a MetadataTree, config: ReconcileConfig) -> Self {
        Self { metadata, config }
    }

    #[must_use]
    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// Reconcile every checklist section that passes the target filter
    #[must_use]
    pub fn reconcile(&self, checklist: &ChecklistTree) -> ReconcileReport {
        let target = self.config.target_section.as_deref();
        let sections: Vec<SectionReport> = checklist
            .sections
            .iter()
            .filter(|s| target.map_or(true, |t| Normalization::SpaceInsensitive.equivalent(t, &s.name)))
            .map(|s| self.reconcile_section(s))
            .collect();

        if let Some(t) = target {
            if sections.is_empty() {
                info!(target_section = t, "No checklist section matches the target");
            }
        }

        let report = ReconcileReport::new(
            self.config.match_mode,
            self.config.target_section.clone(),
            sections,
        );
        info!(
            passed = report.passed,
            mismatched = report.mismatched,
            skipped = report.skipped,
            "Reconciliation finished"
        );
        report
    }

    /// Reconcile a single checklist section
    #[must_use]
    pub fn reconcile_section(&self, section: &ChecklistSection) -> SectionReport {
        let mut report = SectionReport::new(&section.name, section.ordinal, section.questions.len());

        if section.questions.is_empty() {
            report.status = SectionStatus::Skipped;
            return report;
        }

        let Some(matched) = self.match_section(&section.name) else {
            report.status = SectionStatus::Missing;
            report.hints = self.hints(&section.name);
            debug!(section = %section.name, hints = ?report.hints, "No metadata section found");
            return report;
        };

        report.matched_section_id = Some(matched.id.clone());
        report.matched_section_name = Some(matched.name.clone());

        let pool = matched.candidate_pool();
        let relaxed_pool: Vec<(String, &str)> = pool
            .iter()
            .map(|c| (Normalization::Relaxed.apply(c), *c))
            .collect();
        let scored_pool: Vec<(String, &str)> = pool
            .iter()
            .map(|c| (Normalization::Alphanumeric.apply(c), *c))
            .collect();

        for question in &section.questions {
            let label = question.normalized_label();
            if pool.contains(&label.as_str()) {
                report.matched_questions += 1;
                continue;
            }

            let relaxed = Normalization::Relaxed.apply(&label);
            let near_misses: Vec<String> = relaxed_pool
                .iter()
                .filter(|(key, _)| *key == relaxed)
                .map(|(_, candidate)| (*candidate).to_string())
                .collect();

            let suggestions = if near_misses.is_empty() {
                self.suggestions(&label, &scored_pool)
            } else {
                Vec::new()
            };

            let mismatch = QuestionMismatch {
                label,
                line: question.line,
                near_misses,
                suggestions,
            };
            if mismatch.is_formatting() && self.config.match_mode == MatchMode::Lenient {
                report.formatting.push(mismatch);
            } else {
                report.mismatches.push(mismatch);
            }
        }

        report.status = if report.mismatches.is_empty() {
            SectionStatus::Pass
        } else {
            SectionStatus::Fail
        };
        debug!(
            section = %section.name,
            status = %report.status,
            matched = report.matched_questions,
            mismatches = report.mismatches.len(),
            formatting = report.formatting.len(),
            "Reconciled section"
        );
        report
    }

    /// Find the metadata section for a canonical checklist name.
    ///
    /// Exact comparison first, then space-insensitive. The first section in
    /// export order wins.
    #[must_use]
    pub fn match_section(&self, name: &str) -> Option<&'a MetadataSection> {
        let metadata: &'a MetadataTree = self.metadata;
        let sections = &metadata.sections;
        let exact: Vec<&MetadataSection> = sections.iter().filter(|m| m.name == name).collect();
        let found: Vec<&'a MetadataSection> = if exact.is_empty() {
            let wanted = Normalization::SpaceInsensitive.apply(name);
            sections
                .iter()
                .filter(|m| Normalization::SpaceInsensitive.apply(&m.name) == wanted)
                .collect()
        } else {
            exact
        };

        if found.len() > 1 {
            let others: Vec<&str> = found[1..].iter().map(|m| m.id.as_str()).collect();
            debug!(
                section = name,
                chosen = %found[0].id,
                others = ?others,
                "Several metadata sections match, keeping the first"
            );
        }
        found.first().copied()
    }

    /// Candidates scoring above the threshold against `label`, best first.
    /// `pool` pairs each candidate with its `Alphanumeric` form.
    fn suggestions(&self, label: &str, pool: &[(String, &str)]) -> Vec<(String, f64)> {
        let key = Normalization::Alphanumeric.apply(label);
        if key.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(String, f64)> = Vec::new();
        for (candidate_key, candidate) in pool {
            let score = normalized_levenshtein(&key, candidate_key);
            if score > self.config.suggest_threshold
                && !scored.iter().any(|(name, _)| name == candidate)
            {
                scored.push(((*candidate).to_string(), score));
            }
        }

        // Stable sort keeps candidate order among equal scores
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(self.config.hint_limit);
        scored
    }

    /// Metadata section names containing the leading characters of `name`,
    /// case-insensitively, in export order. A blank name gets no hints.
    #[must_use]
    pub fn hints(&self, name: &str) -> Vec<String> {
        let prefix: String = name
            .chars()
            .take(self.config.hint_prefix_len)
            .collect::<String>()
            .to_lowercase();
        if prefix.trim().is_empty() {
            return Vec::new();
        }

        let mut hints: Vec<String> = Vec::new();
        for section in &self.metadata.sections {
            if hints.len() >= self.config.hint_limit {
                break;
            }
            if section.name.to_lowercase().contains(&prefix) && !hints.contains(&section.name) {
                hints.push(section.name.clone());
            }
        }
        hints
    }
}
