//! Readers that turn the two inputs into trees.
//!
//! - **Checklist CSV**: a flat table where section headers and questions share the
//!   first column and facility applicability marks sit in the sibling columns
//!   ([`checklist`])
//! - **Metadata JSON**: a nested export with a section list and a flat data element
//!   list ([`metadata`])
//!
//! ## Example
//!
//! ```rust,no_run
//! use checklist_reconciler::parsing::checklist::{parse_checklist_file, ChecklistOptions};
//! use checklist_reconciler::parsing::metadata::parse_metadata_file;
//! use std::path::Path;
//!
//! let checklist = parse_checklist_file(Path::new("checklist.csv"), &ChecklistOptions::default()).unwrap();
//! let metadata = parse_metadata_file(Path::new("metadata.json")).unwrap();
//!
//! println!("{} sections vs {}", checklist.sections.len(), metadata.sections.len());
//! ```
//!
//! ## Failure policy
//!
//! Only an input that cannot be read or decoded at all is an error. Individual rows
//! and records that do not fit the expected shape are skipped and logged at debug level.

use std::path::Path;

use thiserror::Error;

use crate::utils::validation::{validate_input_size, ValidationError};

pub mod checklist;
pub mod metadata;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rejected input: {0}")]
    Rejected(#[from] ValidationError),

    #[error("Invalid metadata JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Too many rows: limit of {0} reached")]
    TooManyRows(usize),
}

/// Read a text input fully into memory.
///
/// The size is checked before reading; the file handle does not outlive this call.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or `ParseError::Rejected`
/// if it is empty or too large.
pub fn read_text(path: &Path) -> Result<String, ParseError> {
    let size = std::fs::metadata(path)?.len();
    validate_input_size(size)?;
    let bytes = std::fs::read(path)?;
    Ok(decode_text(&bytes))
}

/// Decode bytes as UTF-8 (honouring a byte order mark), falling back to
/// Windows-1252 when the bytes are not valid UTF-8.
#[must_use]
pub fn decode_text(bytes: &[u8]) -> String {
    let (text, _, had_errors) = encoding_rs::UTF_8.decode(bytes);
    if !had_errors {
        return text.into_owned();
    }
    let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    text.into_owned()
}
