// Exporting-software detection
//
// Best-effort label for the program that wrote a log. Informational only:
// the parser behaves the same whatever this returns.

use std::sync::OnceLock;

use regex::Regex;

use super::parser::AdifHeader;

pub const UNKNOWN_VARIANT: &str = "Unknown";

/// (label, substrings checked against lowercase header values), in priority order
const HEADER_SIGNATURES: &[(&str, &[&str])] = &[
    ("Logger32", &["logger32"]),
    ("N1MM Logger+", &["n1mm"]),
    ("Ham Radio Deluxe", &["hrd", "ham radio deluxe"]),
    ("DXlog", &["dxlog"]),
    ("CQRLOG", &["cqrlog"]),
    ("LoTW", &["logbook of the world", "lotw"]),
];

/// Full-text patterns, same priority order as the header signatures
const TEXT_PATTERNS: &[(&str, &str)] = &[
    ("Logger32", r"logger32"),
    ("N1MM Logger+", r"n1mm"),
    ("Ham Radio Deluxe", r"ham radio deluxe|\bhrd\b"),
    ("DXlog", r"dxlog"),
    ("CQRLOG", r"cqrlog"),
    ("LoTW", r"logbook of the world|lotw"),
];

static TEXT_RES: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();

fn text_res() -> &'static [(&'static str, Regex)] {
    TEXT_RES.get_or_init(|| {
        TEXT_PATTERNS
            .iter()
            .map(|(name, pat)| (*name, Regex::new(pat).expect("valid variant pattern")))
            .collect()
    })
}

/// Guess the exporting software from header values, then from the whole text
pub fn detect_variant(text: &str, header: &AdifHeader) -> &'static str {
    for (_, value) in header.ordered_fields() {
        let value = value.values().join(" ").to_lowercase();
        for (name, needles) in HEADER_SIGNATURES {
            if needles.iter().any(|n| value.contains(n)) {
                return name;
            }
        }
    }

    let lower = text.to_lowercase();
    text_res()
        .iter()
        .find(|(_, re)| re.is_match(&lower))
        .map(|(name, _)| *name)
        .unwrap_or(UNKNOWN_VARIANT)
}
