use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde_json::{Map, Value};
use tracing::debug;

use crate::core::element::{AlternateNames, DataElement, MetadataSection};
use crate::core::tree::MetadataTree;
use crate::core::types::MetadataId;
use crate::parsing::{read_text, ParseError};
use crate::utils::normalize::section_name;

/// Top-level key of the section list
pub const SECTIONS_KEY: &str = "programStageSections";

/// Top-level key of the flat element list (entries may wrap a `dataElement`)
pub const STAGE_ELEMENTS_KEY: &str = "programStageDataElements";

/// Fallback top-level key of a bare element list
pub const ELEMENTS_KEY: &str = "dataElements";

/// Key of the wrapped element inside a stage element entry
const WRAPPED_ELEMENT_KEY: &str = "dataElement";

/// Parse a metadata JSON export from a file
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, `ParseError::Json` if it
/// is not valid JSON, or `ParseError::InvalidFormat` if the root is not an object.
pub fn parse_metadata_file(path: &Path) -> Result<MetadataTree, ParseError> {
    let text = read_text(path)?;
    parse_metadata_text(&text)
}

/// Parse a metadata JSON export from text
///
/// # Errors
///
/// Returns `ParseError::Json` if the text is not valid JSON, or
/// `ParseError::InvalidFormat` if the root is not an object.
pub fn parse_metadata_text(text: &str) -> Result<MetadataTree, ParseError> {
    let root: Value = serde_json::from_str(text)?;
    read_metadata(&root)
}

/// Build the section tree from a parsed metadata export.
///
/// Element names are resolved through the flat element collection. A section
/// reference with no backing record is dropped from that section and counted
/// in [`MetadataSection::unresolved`].
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if the root is not a JSON object.
pub fn read_metadata(root: &Value) -> Result<MetadataTree, ParseError> {
    let root = root.as_object().ok_or_else(|| {
        ParseError::InvalidFormat("metadata root must be a JSON object".to_string())
    })?;

    let elements = collect_elements(root);
    let by_id: HashMap<&str, &DataElement> =
        elements.iter().map(|e| (e.id.as_str(), e)).collect();

    let sections: Vec<MetadataSection> = array(root, SECTIONS_KEY)
        .iter()
        .filter_map(Value::as_object)
        .enumerate()
        .map(|(ordinal, section)| read_section(section, ordinal, &by_id))
        .collect();

    debug!(
        sections = sections.len(),
        elements = elements.len(),
        "Read metadata export"
    );

    Ok(MetadataTree { sections, elements })
}

fn read_section(
    section: &Map<String, Value>,
    ordinal: usize,
    by_id: &HashMap<&str, &DataElement>,
) -> MetadataSection {
    let id = string(section, "id").unwrap_or_default();
    let display_name = string(section, "displayName");
    let raw_name = string(section, "name")
        .or_else(|| display_name.clone())
        .unwrap_or_default();

    let mut elements = Vec::new();
    let mut unresolved = 0;
    for reference in array(section, ELEMENTS_KEY) {
        let ref_id = match reference {
            Value::String(s) => Some(s.as_str()),
            Value::Object(obj) => obj.get("id").and_then(Value::as_str),
            _ => None,
        };
        match ref_id.and_then(|rid| by_id.get(rid)) {
            Some(element) => elements.push((*element).clone()),
            None => {
                debug!(
                    section = %id,
                    reference = ref_id.unwrap_or("<no id>"),
                    "Dropping unresolved data element reference"
                );
                unresolved += 1;
            }
        }
    }

    MetadataSection {
        id: MetadataId::new(id),
        name: section_name(&raw_name),
        raw_name,
        display_name,
        ordinal,
        elements,
        unresolved,
    }
}

/// Gather data elements from the flat collection, first record per id.
/// Falls back to the bare element list when the stage list yields nothing.
fn collect_elements(root: &Map<String, Value>) -> Vec<DataElement> {
    let staged: Vec<&Map<String, Value>> = array(root, STAGE_ELEMENTS_KEY)
        .iter()
        .filter_map(Value::as_object)
        .map(|entry| {
            entry
                .get(WRAPPED_ELEMENT_KEY)
                .and_then(Value::as_object)
                .unwrap_or(entry)
        })
        .collect();

    let records: Vec<&Map<String, Value>> = if staged.is_empty() {
        array(root, ELEMENTS_KEY)
            .iter()
            .filter_map(Value::as_object)
            .collect()
    } else {
        staged
    };

    let mut seen = HashSet::new();
    let mut elements = Vec::with_capacity(records.len());
    for record in records {
        let Some(id) = string(record, "id") else {
            debug!("Skipping data element record without an id");
            continue;
        };
        if !seen.insert(id.clone()) {
            debug!(id = %id, "Ignoring repeated data element record");
            continue;
        }
        elements.push(DataElement::new(id, alternate_names(record)));
    }
    elements
}

fn alternate_names(record: &Map<String, Value>) -> AlternateNames {
    AlternateNames {
        form_name: string(record, "formName"),
        display_form_name: string(record, "displayFormName"),
        display_name: string(record, "displayName"),
        name: string(record, "name"),
    }
}

fn string(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

fn array<'a>(obj: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    obj.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "programStageSections": [
                {
                    "id": "sec1",
                    "name": "LABORATORY",
                    "displayName": "LABORATORY",
                    "dataElements": [{"id": "de1"}, {"id": "de2"}, {"id": "ghost"}]
                },
                {
                    "id": "sec2",
                    "name": "X - RAY ROOM",
                    "dataElements": ["de2"]
                }
            ],
            "programStageDataElements": [
                {"dataElement": {
                    "id": "de1",
                    "formName": "Microscope?",
                    "displayFormName": "Microscope?",
                    "displayName": "LAB Microscope",
                    "name": "LAB_MICROSCOPE"
                }},
                {"dataElement": {"id": "de2", "formName": "Lead apron?"}},
                {"dataElement": {"id": "de1", "formName": "Shadow copy"}}
            ]
        })
    }

    #[test]
    fn test_read_sections_and_candidates() {
        let tree = read_metadata(&sample()).unwrap();
        assert_eq!(tree.sections.len(), 2);
        assert_eq!(tree.elements.len(), 2);

        let lab = &tree.sections[0];
        assert_eq!(lab.id, MetadataId::new("sec1"));
        assert_eq!(lab.elements.len(), 2);
        assert_eq!(
            lab.elements[0].candidates,
            vec!["Microscope?", "LAB Microscope", "LAB_MICROSCOPE"]
        );
    }

    #[test]
    fn test_unresolved_reference_dropped() {
        let tree = read_metadata(&sample()).unwrap();
        assert_eq!(tree.sections[0].unresolved, 1);
        assert_eq!(tree.unresolved_count(), 1);
    }

    #[test]
    fn test_first_record_per_id_wins() {
        let tree = read_metadata(&sample()).unwrap();
        let de1 = tree.elements.iter().find(|e| e.id.as_str() == "de1").unwrap();
        assert_eq!(de1.names.form_name.as_deref(), Some("Microscope?"));
    }

    #[test]
    fn test_section_name_canonical_and_string_refs() {
        let tree = read_metadata(&sample()).unwrap();
        let xray = &tree.sections[1];
        assert_eq!(xray.name, "X-RAY ROOM");
        assert_eq!(xray.raw_name, "X - RAY ROOM");
        assert_eq!(xray.elements.len(), 1);
        assert_eq!(xray.ordinal, 1);
    }

    #[test]
    fn test_bare_element_fallback() {
        let root = json!({
            "programStageSections": [
                {"id": "s", "name": "PHARMACY", "dataElements": [{"id": "a"}]}
            ],
            "dataElements": [{"id": "a", "displayName": "Fridge thermometer?"}]
        });
        let tree = read_metadata(&root).unwrap();
        assert_eq!(
            tree.sections[0].candidate_pool(),
            vec!["Fridge thermometer?"]
        );
    }

    #[test]
    fn test_unwrapped_stage_entries() {
        let root = json!({
            "programStageSections": [{"id": "s", "name": "PHARMACY", "dataElements": [{"id": "a"}]}],
            "programStageDataElements": [{"id": "a", "name": "Shelving"}]
        });
        let tree = read_metadata(&root).unwrap();
        assert_eq!(tree.sections[0].candidate_pool(), vec!["Shelving"]);
    }

    #[test]
    fn test_non_object_root_rejected() {
        assert!(matches!(
            read_metadata(&json!([1, 2, 3])),
            Err(ParseError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_invalid_json_rejected() {
        assert!(matches!(
            parse_metadata_text("{not json"),
            Err(ParseError::Json(_))
        ));
    }

    #[test]
    fn test_missing_collections_yield_empty_tree() {
        let tree = parse_metadata_text("{}").unwrap();
        assert!(tree.sections.is_empty());
        assert!(tree.elements.is_empty());
    }

    #[test]
    fn test_duplicate_section_names_kept() {
        let root = json!({
            "programStageSections": [
                {"id": "A1", "name": "TOILET FACILITIES", "dataElements": []},
                {"id": "B2", "name": "TOILET FACILITIES", "dataElements": []}
            ]
        });
        let tree = read_metadata(&root).unwrap();
        assert_eq!(tree.sections.len(), 2);
        assert_ne!(tree.sections[0].id, tree.sections[1].id);
    }
}
