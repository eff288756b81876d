//! Cross-checking a checklist against a metadata export.
//!
//! This module provides the reconciliation functionality:
//!
//! - [`ReconcileEngine`]: Main entry point, matching sections then questions
//! - [`ReconcileReport`]: Per-section outcomes and the passed/mismatched totals
//! - [`find_checklist_duplicates`], [`find_metadata_duplicates`]: Repeated section names
//!
//! ## Matching Algorithm
//!
//! For each checklist section:
//!
//! 1. **Section matching**: exact canonical name, then space-insensitive. No match
//!    means the section is `MISSING`, with a few metadata names offered as hints
//! 2. **Question matching**: exact membership in the union of the matched section's
//!    candidate names
//! 3. **Near-miss lookup**: labels that differ only in case or whitespace are
//!    reported as formatting drift, not as true mismatches
//!
//! In [`MatchMode::Lenient`](crate::core::types::MatchMode) a section passes with
//! formatting drift; in `Strict` mode it fails.
//!
//! ## Example
//!
//! ```rust,no_run
//! use checklist_reconciler::{ReconcileConfig, ReconcileEngine};
//! use checklist_reconciler::parsing::checklist::{parse_checklist_file, ChecklistOptions};
//! use checklist_reconciler::parsing::metadata::parse_metadata_file;
//! use std::path::Path;
//!
//! let checklist = parse_checklist_file(Path::new("checklist.csv"), &ChecklistOptions::default()).unwrap();
//! let metadata = parse_metadata_file(Path::new("metadata.json")).unwrap();
//!
//! let engine = ReconcileEngine::with_config(&metadata, ReconcileConfig::default());
//! let report = engine.reconcile(&checklist);
//!
//! for s in &report.sections {
//!     println!("{}: {} ({} mismatches)", s.name, s.status, s.mismatches.len());
//! }
//! ```

pub mod diagnosis;
pub mod duplicates;
pub mod engine;

pub use diagnosis::{QuestionMismatch, ReconcileReport, SectionReport};
pub use duplicates::{find_checklist_duplicates, find_metadata_duplicates, DuplicateReport};
pub use engine::{reconcile, ReconcileConfig, ReconcileEngine};
