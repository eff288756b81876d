//! Core data types for checklist reconciliation.
//!
//! Both inputs are modelled as fixed-depth trees (root, section, leaf):
//!
//! - [`ChecklistTree`]: sections of [`Question`]s with per-facility applicability flags
//! - [`MetadataTree`]: sections of [`DataElement`]s, each with alternate names
//! - [`MetadataId`], [`MatchMode`], [`SectionStatus`]: identifiers and result classification
//!
//! ## Naming
//!
//! The two sources drift independently, so names are never compared raw. Section
//! names on both sides go through [`crate::utils::normalize::section_name`]; question
//! labels and element names through [`crate::utils::normalize::normalize`].
//!
//! Trees are built once per run and never mutated afterwards.
//!
//! [`ChecklistTree`]: tree::ChecklistTree
//! [`MetadataTree`]: tree::MetadataTree
//! [`Question`]: section::Question
//! [`DataElement`]: element::DataElement
//! [`MetadataId`]: types::MetadataId
//! [`MatchMode`]: types::MatchMode
//! [`SectionStatus`]: types::SectionStatus

pub mod element;
pub mod section;
pub mod tree;
pub mod types;
