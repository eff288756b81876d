use std::path::Path;

use csv::{Position, ReaderBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::section::{ChecklistSection, Facility, Question};
use crate::core::tree::{ChecklistTree, ParseStats};
use crate::core::types::{PreamblePolicy, RowKind};
use crate::parsing::{read_text, ParseError};
use crate::utils::normalize::{is_upper_label, normalize, section_name, trim_encoding_artifacts};
use crate::utils::validation::check_row_limit;

/// Name of the synthetic section that collects rows seen before the first header
pub const PREAMBLE_SECTION: &str = "PREAMBLE";

/// Label prefixes that always open a section, compared case-insensitively
pub const DEFAULT_SECTION_PREFIXES: &[&str] = &[
    "SECTION ",
    "FACILITY-",
    "CUSTOMER SATISFACTION",
    "LIASON WITH PRIMARY HEALTH CARE",
    "TOILET FACILITIES",
];

/// Continuation marker that turns a label into a section header
const CONTINUATION_SUFFIX: &str = "--";

/// Shortest all-caps label treated as a header is one character longer than this
const MIN_UPPER_HEADER_LEN: usize = 3;

/// Options for reading a checklist table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChecklistOptions {
    /// Rows at the top of the file that are not data. Row 0 always names the
    /// facility columns; any further header rows are skipped.
    pub header_rows: usize,

    /// Handling of question rows that appear before the first header
    pub preamble: PreamblePolicy,

    /// Section-opening label prefixes
    pub section_prefixes: Vec<String>,

    /// Cell content that marks a question as applicable
    pub marker: char,
}

impl Default for ChecklistOptions {
    fn default() -> Self {
        Self {
            header_rows: 1,
            preamble: PreamblePolicy::Drop,
            section_prefixes: DEFAULT_SECTION_PREFIXES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            marker: '?',
        }
    }
}

impl ChecklistOptions {
    fn is_marker(&self, cell: &str) -> bool {
        let mut chars = cell.trim().chars();
        chars.next() == Some(self.marker) && chars.next().is_none()
    }

    fn has_section_prefix(&self, label: &str) -> bool {
        let upper = label.to_uppercase();
        self.section_prefixes
            .iter()
            .any(|p| !p.is_empty() && upper.starts_with(&p.to_uppercase()))
    }
}

/// One CSV record and the source line it starts on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// 1-based line in the decoded text
    pub line: usize,
    pub fields: Vec<String>,
}

impl Row {
    #[must_use]
    pub fn new(line: usize, fields: Vec<String>) -> Self {
        Self { line, fields }
    }
}

/// Parse a checklist CSV file
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, `ParseError::Rejected`
/// if it is empty or too large, or `ParseError::TooManyRows` if the row limit
/// is exceeded.
pub fn parse_checklist_file(
    path: &Path,
    options: &ChecklistOptions,
) -> Result<ChecklistTree, ParseError> {
    let rows = read_rows(path)?;
    Ok(parse_rows(&rows, options))
}

/// Read a checklist file and split it into rows of fields
///
/// # Errors
///
/// See [`parse_checklist_file`].
pub fn read_rows(path: &Path) -> Result<Vec<Row>, ParseError> {
    let text = read_text(path)?;
    rows_from_text(&text)
}

/// Parse checklist CSV text
///
/// # Errors
///
/// Returns `ParseError::TooManyRows` if the row limit is exceeded.
pub fn parse_checklist_text(
    text: &str,
    options: &ChecklistOptions,
) -> Result<ChecklistTree, ParseError> {
    let rows = rows_from_text(text)?;
    Ok(parse_rows(&rows, options))
}

/// Split CSV text into rows of fields.
///
/// Blank lines produce no row and a quoted cell may span several lines, so
/// each row carries the line its record starts on. Records the CSV reader
/// rejects are kept as empty rows, which the parser treats as blank.
///
/// # Errors
///
/// Returns `ParseError::TooManyRows` if the row limit is exceeded.
pub fn rows_from_text(text: &str) -> Result<Vec<Row>, ParseError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut lines = LineTracker::new(text);

    let mut rows = Vec::new();
    for record in reader.records() {
        if check_row_limit(rows.len()).is_some() {
            return Err(ParseError::TooManyRows(rows.len()));
        }
        match record {
            Ok(record) => {
                let line = lines.line_of(record.position());
                rows.push(Row::new(line, record.iter().map(str::to_string).collect()));
            }
            Err(e) => {
                let line = lines.line_of(e.position());
                debug!(line, error = %e, "Skipping unreadable CSV record");
                rows.push(Row::new(line, Vec::new()));
            }
        }
    }

    Ok(rows)
}

/// Maps record start offsets to 1-based line numbers.
///
/// A record's position may point at line breaks the reader skips before the
/// record proper, so those are stepped over first. Offsets only move forward.
struct LineTracker<'t> {
    bytes: &'t [u8],
    offset: usize,
    line: usize,
}

impl<'t> LineTracker<'t> {
    fn new(text: &'t str) -> Self {
        Self {
            bytes: text.as_bytes(),
            offset: 0,
            line: 1,
        }
    }

    fn line_of(&mut self, position: Option<&Position>) -> usize {
        let Some(position) = position else {
            return self.line;
        };
        let mut start = usize::try_from(position.byte())
            .unwrap_or(usize::MAX)
            .clamp(self.offset, self.bytes.len());
        while matches!(self.bytes.get(start), Some(b'\n' | b'\r')) {
            start += 1;
        }

        self.line += self.bytes[self.offset..start]
            .iter()
            .filter(|&&b| b == b'\n')
            .count();
        self.offset = start;
        self.line
    }
}

/// Facility columns named by the header row.
///
/// Columns run from 1 to the last non-empty header cell; names are trimmed of
/// encoding debris and an empty interior name becomes `Column <n>`.
#[must_use]
pub fn facilities_from_header(header: &[String]) -> Vec<Facility> {
    let names: Vec<String> = header
        .iter()
        .skip(1)
        .map(|cell| trim_encoding_artifacts(cell))
        .collect();
    let count = names
        .iter()
        .rposition(|n| !n.is_empty())
        .map_or(0, |last| last + 1);

    names
        .into_iter()
        .take(count)
        .enumerate()
        .map(|(j, name)| {
            if name.is_empty() {
                Facility::new(j, format!("Column {}", j + 2))
            } else {
                Facility::new(j, name)
            }
        })
        .collect()
}

/// True when a non-blank label with no applicability marks opens a section
#[must_use]
pub fn is_section_header(label: &str, has_mark: bool, options: &ChecklistOptions) -> bool {
    if has_mark || label.is_empty() {
        return false;
    }
    let upper = is_upper_label(label) && label.chars().count() > MIN_UPPER_HEADER_LEN;
    upper || options.has_section_prefix(&normalize(label)) || label.ends_with(CONTINUATION_SUFFIX)
}

/// Holds the currently open section and appends rows to it.
/// Sections never nest, so the most recent header is the only parent.
struct TreeBuilder {
    sections: Vec<ChecklistSection>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            sections: Vec::new(),
        }
    }

    fn open_section(&mut self, raw: &str, line: usize) {
        let ordinal = self.sections.len();
        self.sections
            .push(ChecklistSection::new(section_name(raw), raw, ordinal, line));
    }

    fn open_preamble(&mut self) {
        self.sections.push(ChecklistSection::new(
            PREAMBLE_SECTION,
            PREAMBLE_SECTION,
            self.sections.len(),
            0,
        ));
    }

    /// Append to the open section; hands the question back when none is open
    fn push_question(&mut self, question: Question) -> Result<(), Question> {
        match self.sections.last_mut() {
            Some(section) => {
                section.questions.push(question);
                Ok(())
            }
            None => Err(question),
        }
    }
}

/// Build the section tree from already-split rows.
///
/// Row 0 is the facility header. Never fails: rows that do not fit are skipped,
/// and an empty input yields an empty tree.
#[must_use]
pub fn parse_rows(rows: &[Row], options: &ChecklistOptions) -> ChecklistTree {
    let Some(header) = rows.first() else {
        return ChecklistTree::default();
    };

    let facilities = facilities_from_header(&header.fields);
    if facilities.is_empty() {
        warn!("Checklist header names no facility columns; applicability will be empty");
    }
    let facility_count = facilities.len();

    let mut builder = TreeBuilder::new();
    let mut stats = ParseStats::default();

    for row in rows.iter().skip(options.header_rows.max(1)) {
        let line = row.line;
        let label = row.fields.first().map_or("", |c| c.trim());
        if label.is_empty() {
            stats.record(RowKind::Blank);
            continue;
        }

        let marks: Vec<bool> = (0..facility_count)
            .map(|j| row.fields.get(j + 1).is_some_and(|cell| options.is_marker(cell)))
            .collect();
        let has_mark = marks.iter().any(|&m| m);

        if is_section_header(label, has_mark, options) {
            builder.open_section(label, line);
            stats.record(RowKind::Header);
            continue;
        }

        let question = Question::new(label, line, marks);
        let question = match builder.push_question(question) {
            Ok(()) => {
                stats.record(RowKind::Question);
                continue;
            }
            Err(question) => question,
        };

        match options.preamble {
            PreamblePolicy::Drop => {
                debug!(line, label, "Dropping row before first section header");
                stats.record(RowKind::Noise);
            }
            PreamblePolicy::Collect => {
                builder.open_preamble();
                if builder.push_question(question).is_ok() {
                    stats.record(RowKind::Question);
                } else {
                    stats.record(RowKind::Noise);
                }
            }
        }
    }

    debug!(
        sections = builder.sections.len(),
        questions = stats.questions,
        noise = stats.noise,
        "Parsed checklist"
    );

    ChecklistTree {
        facilities,
        sections: builder.sections,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(text: &str) -> Vec<Row> {
        rows_from_text(text).unwrap()
    }

    #[test]
    fn test_lines_survive_blank_lines_and_multiline_cells() {
        let csv = "Item,Hospital\nLABORATORY,\n\n\nAutoclave?,?\n\"Microscope\nwith camera?\",?\nCentrifuge?,?\n";
        let tree = parse_checklist_text(csv, &ChecklistOptions::default()).unwrap();

        let section = &tree.sections[0];
        assert_eq!(section.line, 2);
        let lines: Vec<usize> = section.questions.iter().map(|q| q.line).collect();
        assert_eq!(lines, vec![5, 6, 8]);
        assert_eq!(section.questions[1].label, "Microscope\nwith camera?");
    }

    #[test]
    fn test_lines_with_crlf_terminators() {
        let csv = "Item,Hospital\r\nLABORATORY,\r\n\r\nAutoclave?,?\r\nCentrifuge?,?\r\n";
        let rows = rows(csv);
        let lines: Vec<usize> = rows.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![1, 2, 4, 5]);
    }

    #[test]
    fn test_bleeding_room_applicability() {
        let csv = "\
Item,Obstetrics & Gynaecology,Hospital
BLEEDING ROOM,,
Couch available?,?,
Privacy screen?,?,?
Running water?,,?
";
        let tree = parse_rows(&rows(csv), &ChecklistOptions::default());

        assert_eq!(tree.sections.len(), 1);
        let section = &tree.sections[0];
        assert_eq!(section.name, "BLEEDING ROOM");
        assert_eq!(section.questions.len(), 3);
        assert_eq!(
            section
                .questions
                .iter()
                .filter(|q| q.applicability[0])
                .count(),
            2
        );
        assert_eq!(tree.stats.headers, 1);
        assert_eq!(tree.stats.questions, 3);
        assert!(tree.stats.is_conserved());
    }

    #[test]
    fn test_truncated_row_padded_with_false() {
        let csv = "\
Item,Hospital,Clinic,Lab
WAITING AREA,,,
Chairs available?,?
";
        let tree = parse_rows(&rows(csv), &ChecklistOptions::default());
        let q = &tree.sections[0].questions[0];
        assert_eq!(q.applicability, vec![true, false, false]);
        assert_eq!(q.line, 3);
    }

    #[test]
    fn test_header_detection_rules() {
        let options = ChecklistOptions::default();
        assert!(is_section_header("WASHING ROOM", false, &options));
        assert!(is_section_header("Facility-Environment", false, &options));
        assert!(is_section_header("Section 2: Staffing", false, &options));
        assert!(is_section_header("Sterilisation area--", false, &options));
        assert!(is_section_header("· Toilet facilities", false, &options));
        // Too short for the all-caps rule
        assert!(!is_section_header("LAB", false, &options));
        // Marks always make a question
        assert!(!is_section_header("WASHING ROOM", true, &options));
        assert!(!is_section_header("Is there a sink?", false, &options));
    }

    #[test]
    fn test_duplicate_headers_not_merged() {
        let csv = "\
Item,Hospital
TOILET FACILITIES,
Toilet clean?,?
X-RAY ROOM,
Lead apron?,?
TOILET FACILITIES,
Toilet paper?,?
";
        let tree = parse_rows(&rows(csv), &ChecklistOptions::default());
        assert_eq!(tree.sections.len(), 3);
        assert_eq!(tree.sections[0].name, tree.sections[2].name);
        assert_eq!(tree.sections[0].questions.len(), 1);
        assert_eq!(tree.sections[2].questions.len(), 1);
        assert_eq!(tree.sections[2].ordinal, 2);
    }

    #[test]
    fn test_rows_before_first_header_dropped() {
        let csv = "\
Item,Hospital
Inspector name,
Date of visit,
RECEPTION,
Signage visible?,?
";
        let tree = parse_rows(&rows(csv), &ChecklistOptions::default());
        assert_eq!(tree.sections.len(), 1);
        assert_eq!(tree.stats.noise, 2);
        assert_eq!(tree.question_count(), 1);
        assert!(tree.stats.is_conserved());
    }

    #[test]
    fn test_rows_before_first_header_collected() {
        let csv = "\
Item,Hospital
Inspector name,
Date of visit,
RECEPTION,
Signage visible?,?
";
        let options = ChecklistOptions {
            preamble: PreamblePolicy::Collect,
            ..ChecklistOptions::default()
        };
        let tree = parse_rows(&rows(csv), &options);
        assert_eq!(tree.sections.len(), 2);
        assert_eq!(tree.sections[0].name, PREAMBLE_SECTION);
        assert_eq!(tree.sections[0].questions.len(), 2);
        assert_eq!(tree.sections[1].ordinal, 1);
        assert_eq!(tree.stats.noise, 0);
    }

    #[test]
    fn test_blank_and_noise_rows_counted_once() {
        let csv = "\
Item,Hospital
,
   ,?
LABORATORY,
Fridge?,?
Centrifuge?,
";
        let tree = parse_rows(&rows(csv), &ChecklistOptions::default());
        assert_eq!(tree.stats.blank, 2);
        assert_eq!(tree.stats.headers, 1);
        assert_eq!(tree.stats.questions, 2);
        assert!(tree.stats.is_conserved());
        // Unmarked questions still belong to the open section
        assert!(!tree.sections[0].questions[1].applicability[0]);
    }

    #[test]
    fn test_extra_header_rows_skipped() {
        let csv = "\
Item,Hospital
Legend,? = applicable
DISPENSARY,
Shelving?,?
";
        let options = ChecklistOptions {
            header_rows: 2,
            ..ChecklistOptions::default()
        };
        let tree = parse_rows(&rows(csv), &options);
        assert_eq!(tree.stats.rows, 2);
        assert_eq!(tree.sections[0].name, "DISPENSARY");
    }

    #[test]
    fn test_facilities_trim_artifacts() {
        let header: Vec<String> = ["\u{feff}Item", " Hospital\u{fffd}", "", "Clinic ", "", ""]
            .iter()
            .map(|s| (*s).to_string())
            .collect();
        let facilities = facilities_from_header(&header);
        assert_eq!(facilities.len(), 3);
        assert_eq!(facilities[0].name, "Hospital");
        assert_eq!(facilities[1].name, "Column 3");
        assert_eq!(facilities[2].name, "Clinic");
        assert_eq!(facilities[2].index, 2);
    }

    #[test]
    fn test_section_name_hyphens_tightened() {
        let csv = "Item,Hospital\nFACILITY - ENVIRONMENT,\nLighting?,?\n";
        let tree = parse_rows(&rows(csv), &ChecklistOptions::default());
        assert_eq!(tree.sections[0].name, "FACILITY-ENVIRONMENT");
        assert_eq!(tree.sections[0].raw_name, "FACILITY - ENVIRONMENT");
    }

    #[test]
    fn test_empty_input_yields_empty_tree() {
        let tree = parse_rows(&[], &ChecklistOptions::default());
        assert!(tree.sections.is_empty());
        assert!(tree.facilities.is_empty());
        let tree = parse_checklist_text("", &ChecklistOptions::default()).unwrap();
        assert!(tree.sections.is_empty());
    }

    #[test]
    fn test_quoted_fields_with_commas() {
        let csv = "Item,Hospital\nSTORES,\n\"Shelves, labelled?\",?\n";
        let tree = parse_checklist_text(csv, &ChecklistOptions::default()).unwrap();
        assert_eq!(tree.sections[0].questions[0].label, "Shelves, labelled?");
    }

    #[test]
    fn test_custom_marker() {
        let csv = "Item,Hospital\nSTORES,\nShelves?,x\n";
        let options = ChecklistOptions {
            marker: 'x',
            ..ChecklistOptions::default()
        };
        let tree = parse_checklist_text(csv, &options).unwrap();
        assert!(tree.sections[0].questions[0].applicability[0]);
    }
}
