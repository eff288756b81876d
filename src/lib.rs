//! # checklist-reconciler
//!
//! A library for reconciling a facility assessment checklist against the metadata
//! export that is supposed to mirror it.
//!
//! The checklist is a flat spreadsheet: section headers and questions share the first
//! column, and `?` marks in the sibling columns say which facility types a question
//! applies to. The metadata export is a nested JSON document of sections holding data
//! elements, each element carrying up to four alternate display names. The two are
//! maintained independently and drift apart.
//!
//! `checklist-reconciler` rebuilds the checklist's hierarchy and cross-checks it
//! against the export.
//!
//! ## Features
//!
//! - **Structure recovery**: Header/question boundaries detected from label shape
//! - **Multi-name matching**: A question matches any of an element's alternate names
//! - **Near-miss detection**: Case and spacing drift reported apart from real mismatches
//! - **Hints**: Likely metadata sections offered for a missing section
//! - **Suggestions**: Closest candidate names scored for a mismatched question
//! - **Duplicate detection**: Repeated section names on either side
//!
//! ## Example
//!
//! ```rust
//! use checklist_reconciler::{ReconcileEngine, SectionStatus};
//! use checklist_reconciler::parsing::checklist::{parse_checklist_text, ChecklistOptions};
//! use checklist_reconciler::parsing::metadata::parse_metadata_text;
//!
//! let checklist = parse_checklist_text(
//!     "Label,Hospital,Clinic\nLABORATORY,,\nMicroscope ?,?,\n",
//!     &ChecklistOptions::default(),
//! ).unwrap();
//!
//! let metadata = parse_metadata_text(r#"{
//!     "programStageSections": [{"id": "s1", "name": "LABORATORY", "dataElements": [{"id": "e1"}]}],
//!     "programStageDataElements": [{"dataElement": {"id": "e1", "formName": "Microscope?"}}]
//! }"#).unwrap();
//!
//! let report = ReconcileEngine::new(&metadata).reconcile(&checklist);
//!
//! assert_eq!(report.sections[0].status, SectionStatus::Pass);
//! assert_eq!(report.sections[0].formatting.len(), 1);
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Core data types for both trees
//! - [`parsing`]: Readers for the checklist CSV and metadata JSON
//! - [`matching`]: Reconciliation engine and duplicate detection
//! - [`utils`]: Label normalization and input guards
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod core;
pub mod matching;
pub mod parsing;
pub mod utils;

// Re-export commonly used types for convenience
pub use crate::core::element::{AlternateNames, DataElement, MetadataSection};
pub use crate::core::section::{ChecklistSection, Facility, Question};
pub use crate::core::tree::{ChecklistTree, MetadataTree, ParseStats};
pub use crate::core::types::*;
pub use crate::matching::diagnosis::{QuestionMismatch, ReconcileReport, SectionReport};
pub use crate::matching::duplicates::{find_checklist_duplicates, find_metadata_duplicates};
pub use crate::matching::engine::{reconcile, ReconcileConfig, ReconcileEngine};
pub use crate::utils::normalize::{normalize, Normalization};
