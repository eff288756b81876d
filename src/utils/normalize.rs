//! Label canonicalization shared by both trees and the reconciler.
//!
//! Every comparison in the crate goes through one of the [`Normalization`]
//! strategies below, so a label is never cleaned by an ad-hoc expression at
//! the call site. All strategies are idempotent.

use serde::{Deserialize, Serialize};

/// Characters treated as decorative list markers at the start of a label.
const MARKER_CHARS: &[char] = &['·', '•', '◦', '▪', '●', '.', '-'];

/// Latin-1 rendering of a UTF-8 byte order mark.
const MOJIBAKE_BOM: &str = "\u{ef}\u{bb}\u{bf}";

/// Named comparison strategies for checklist and metadata labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Leading marker run stripped, then trimmed. Case and inner spacing kept.
    Exact,
    /// `Exact` with internal whitespace runs collapsed to a single space
    Collapsed,
    /// `Exact` with every whitespace character removed
    SpaceInsensitive,
    /// `SpaceInsensitive` and lowercased; used for near-miss lookups
    Relaxed,
    /// Lowercased, every non-alphanumeric character turned into a space,
    /// then collapsed. Input to similarity scoring.
    Alphanumeric,
    /// Canonical key for duplicate detection: collapsed, hyphens tightened
    /// and any leading `SECTION <n> -` prefix removed
    SectionKey,
}

impl Normalization {
    /// Apply this strategy to a raw label
    #[must_use]
    pub fn apply(self, raw: &str) -> String {
        match self {
            Self::Exact => normalize(raw),
            Self::Collapsed => collapse_whitespace(&normalize(raw)),
            Self::SpaceInsensitive => strip_whitespace(&normalize(raw)),
            Self::Relaxed => strip_whitespace(&normalize(raw)).to_lowercase(),
            Self::Alphanumeric => alphanumeric(raw),
            Self::SectionKey => section_key(raw),
        }
    }

    /// True when two labels are equal under this strategy
    #[must_use]
    pub fn equivalent(self, a: &str, b: &str) -> bool {
        self.apply(a) == self.apply(b)
    }
}

/// Canonicalize a raw label for exact comparison.
///
/// Strips the whole leading run of marker characters and whitespace, then
/// trims the end. Case is preserved.
///
/// ```
/// use checklist_reconciler::utils::normalize::normalize;
///
/// assert_eq!(normalize("  · . Is the room ventilated? "), "Is the room ventilated?");
/// assert_eq!(normalize(normalize("-- x").as_str()), normalize("-- x"));
/// ```
#[must_use]
pub fn normalize(raw: &str) -> String {
    raw.trim_start_matches(|c: char| c.is_whitespace() || MARKER_CHARS.contains(&c))
        .trim_end()
        .to_string()
}

/// Canonical section name used by both trees: `normalize` plus hyphen tightening
#[must_use]
pub fn section_name(raw: &str) -> String {
    tighten_hyphens(&normalize(raw))
}

/// Collapse every internal whitespace run to one ASCII space
#[must_use]
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove every whitespace character
#[must_use]
pub fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Remove whitespace on either side of a hyphen (`A - B` becomes `A-B`)
#[must_use]
pub fn tighten_hyphens(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending_ws = String::new();
    let mut after_hyphen = false;

    for c in s.chars() {
        if c.is_whitespace() {
            if !after_hyphen {
                pending_ws.push(c);
            }
            continue;
        }
        if c == '-' {
            pending_ws.clear();
            out.push(c);
            after_hyphen = true;
            continue;
        }
        out.push_str(&pending_ws);
        pending_ws.clear();
        out.push(c);
        after_hyphen = false;
    }

    out
}

fn alphanumeric(raw: &str) -> String {
    let spaced: String = raw
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    collapse_whitespace(&spaced)
}

fn section_key(raw: &str) -> String {
    let tightened = tighten_hyphens(&collapse_whitespace(&normalize(raw)));
    let mut key = strip_section_prefix(&tightened);
    // A stripped prefix can expose another marker run; repeat until stable.
    loop {
        let next = strip_section_prefix(&normalize(&key));
        if next == key {
            return key;
        }
        key = next;
    }
}

/// Remove a leading `SECTION <token> -` or `SECTION <token>:` prefix
fn strip_section_prefix(s: &str) -> String {
    const KEYWORD: &str = "SECTION";

    let Some(head) = s.get(..KEYWORD.len()) else {
        return s.to_string();
    };
    if !head.eq_ignore_ascii_case(KEYWORD) {
        return s.to_string();
    }

    let rest = &s[KEYWORD.len()..];
    if !rest.starts_with(char::is_whitespace) {
        return s.to_string();
    }
    let rest = rest.trim_start();
    let token_len = rest
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(rest.len());
    if token_len == 0 {
        return s.to_string();
    }

    let after_token = rest[token_len..].trim_start();
    match after_token.strip_prefix(['-', ':']) {
        Some(remainder) => remainder.trim().to_string(),
        None => s.to_string(),
    }
}

/// Trim encoding debris from both ends of a header cell.
///
/// Removes whitespace, control characters, byte order marks (raw or as
/// Latin-1 mojibake) and replacement characters. Interior text is untouched.
#[must_use]
pub fn trim_encoding_artifacts(raw: &str) -> String {
    let mut s = raw;
    loop {
        let before = s.len();
        s = s.trim_matches(|c: char| {
            c.is_whitespace() || c.is_control() || c == '\u{feff}' || c == '\u{fffd}'
        });
        s = s.strip_prefix(MOJIBAKE_BOM).unwrap_or(s);
        if s.len() == before {
            return s.to_string();
        }
    }
}

/// True when a label has cased characters and all of them are upper-case
#[must_use]
pub fn is_upper_label(s: &str) -> bool {
    let mut has_cased = false;
    for c in s.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            has_cased = true;
        }
    }
    has_cased
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_strips_leading_markers() {
        assert_eq!(normalize("· Hand washing basin?"), "Hand washing basin?");
        assert_eq!(normalize("...- Soap available?"), "Soap available?");
        assert_eq!(normalize("  • Mirror  "), "Mirror");
        // Interior and trailing markers are kept
        assert_eq!(normalize("Gloves - sterile."), "Gloves - sterile.");
    }

    #[test]
    fn test_normalize_keeps_case_and_inner_spacing() {
        assert_eq!(normalize("Microscope  ?"), "Microscope  ?");
        assert_eq!(normalize("ultrasound Machine"), "ultrasound Machine");
    }

    #[test]
    fn test_normalize_all_markers() {
        assert_eq!(normalize(" .-· "), "");
    }

    #[test]
    fn test_strategies() {
        let raw = " - Microscope   available ?";
        assert_eq!(Normalization::Exact.apply(raw), "Microscope   available ?");
        assert_eq!(Normalization::Collapsed.apply(raw), "Microscope available ?");
        assert_eq!(
            Normalization::SpaceInsensitive.apply(raw),
            "Microscopeavailable?"
        );
        assert_eq!(Normalization::Relaxed.apply(raw), "microscopeavailable?");
        assert_eq!(Normalization::Alphanumeric.apply(raw), "microscope available");
    }

    #[test]
    fn test_alphanumeric_drops_punctuation() {
        assert_eq!(
            Normalization::Alphanumeric.apply("Steriliser (autoclave) functional?"),
            "steriliser autoclave functional"
        );
        assert_eq!(Normalization::Alphanumeric.apply("LAB_MICROSCOPE"), "lab microscope");
        assert_eq!(Normalization::Alphanumeric.apply("?? - !"), "");
    }

    #[test]
    fn test_relaxed_equivalent() {
        assert!(Normalization::Relaxed.equivalent("Microscope ?", "microscope?"));
        assert!(!Normalization::Exact.equivalent("Microscope ?", "Microscope?"));
    }

    #[test]
    fn test_section_name_tightens_hyphens() {
        assert_eq!(section_name("FACILITY - ENVIRONMENT"), "FACILITY-ENVIRONMENT");
        assert_eq!(section_name("LABORATORY  -  GENERAL"), "LABORATORY-GENERAL");
        assert_eq!(section_name("X-RAY ROOM"), "X-RAY ROOM");
    }

    #[test]
    fn test_section_key_strips_prefix() {
        assert_eq!(
            Normalization::SectionKey.apply("SECTION 3 - TOILET FACILITIES"),
            "TOILET FACILITIES"
        );
        assert_eq!(
            Normalization::SectionKey.apply("Section B: Waiting  Area"),
            "Waiting Area"
        );
        assert_eq!(
            Normalization::SectionKey.apply("SECTIONAL STORAGE"),
            "SECTIONAL STORAGE"
        );
        assert_eq!(Normalization::SectionKey.apply("SECTION 4"), "SECTION 4");
    }

    #[test]
    fn test_trim_encoding_artifacts() {
        assert_eq!(trim_encoding_artifacts("\u{feff}Hospital "), "Hospital");
        assert_eq!(trim_encoding_artifacts("Clinic\u{fffd}"), "Clinic");
        assert_eq!(trim_encoding_artifacts("\u{ef}\u{bb}\u{bf}Lab\r"), "Lab");
        assert_eq!(
            trim_encoding_artifacts(" Obstetrics & Gynaecology\u{a0}"),
            "Obstetrics & Gynaecology"
        );
    }

    #[test]
    fn test_is_upper_label() {
        assert!(is_upper_label("BLEEDING ROOM"));
        assert!(is_upper_label("X-RAY 2"));
        assert!(!is_upper_label("Bleeding room"));
        assert!(!is_upper_label("1234"));
        assert!(!is_upper_label(""));
    }

    proptest! {
        #[test]
        fn test_strategies_idempotent(s in "\\PC*") {
            for strategy in [
                Normalization::Exact,
                Normalization::Collapsed,
                Normalization::SpaceInsensitive,
                Normalization::Relaxed,
                Normalization::Alphanumeric,
                Normalization::SectionKey,
            ] {
                let once = strategy.apply(&s);
                prop_assert_eq!(strategy.apply(&once), once);
            }
        }

        #[test]
        fn test_section_name_idempotent(s in "[A-Z -·.]{0,40}") {
            let once = section_name(&s);
            prop_assert_eq!(section_name(&once), once);
        }

        #[test]
        fn test_exact_equality_implies_relaxed(a in "[a-zA-Z ?.-]{0,20}") {
            let b = format!("  {a}");
            if Normalization::Exact.equivalent(&a, &b) {
                prop_assert!(Normalization::Relaxed.equivalent(&a, &b));
            }
        }
    }
}
