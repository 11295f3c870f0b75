// ADIF Parser
// Tolerant reader for tag/length/value logs (LoTW, N1MM, Logger32, ...)
//
// Field names are case-folded to lowercase on ingestion. A field that
// occurs more than once in the same header or record keeps every value,
// in the order seen.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::datetime;

/// LoTW appends this marker after the last record
const LOTW_EOF_FIELD: &str = "app_lotw_eof";

/// `<TAG>`, `<TAG:LEN>` or `<TAG:LEN:TYPE>`
static TAG_RE: OnceLock<Regex> = OnceLock::new();

fn tag_re() -> &'static Regex {
    TAG_RE.get_or_init(|| {
        Regex::new(r"<([A-Za-z0-9_]+)(?::(\d+))?(?::[A-Za-z]+)?>").expect("valid tag regex")
    })
}

/// A field value: a single string, or every value when the tag repeats
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Single(String),
    Multiple(Vec<String>),
}

impl FieldValue {
    /// First value in source order
    pub fn first(&self) -> &str {
        match self {
            FieldValue::Single(v) => v,
            FieldValue::Multiple(vs) => vs.first().map(String::as_str).unwrap_or(""),
        }
    }

    /// All values in source order
    pub fn values(&self) -> Vec<&str> {
        match self {
            FieldValue::Single(v) => vec![v.as_str()],
            FieldValue::Multiple(vs) => vs.iter().map(String::as_str).collect(),
        }
    }

    fn push(&mut self, value: String) {
        match self {
            FieldValue::Single(existing) => {
                let first = std::mem::take(existing);
                *self = FieldValue::Multiple(vec![first, value]);
            }
            FieldValue::Multiple(vs) => vs.push(value),
        }
    }
}

/// A single ADIF record (one QSO), also used for the header block
///
/// Equality compares field contents only, not the order fields were seen.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdifRecord {
    /// All fields as key-value pairs (lowercase keys)
    fields: BTreeMap<String, FieldValue>,
    /// Keys in first-seen order
    #[serde(skip)]
    order: Vec<String>,
}

impl PartialEq for AdifRecord {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl Eq for AdifRecord {}

/// Header fields share the record representation
pub type AdifHeader = AdifRecord;

impl AdifRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value, turning a repeated field into a sequence
    pub fn add(&mut self, key: &str, value: impl Into<String>) {
        let key = key.to_lowercase();
        let value = value.into();
        match self.fields.get_mut(&key) {
            Some(existing) => existing.push(value),
            None => {
                self.order.push(key.clone());
                self.fields.insert(key, FieldValue::Single(value));
            }
        }
    }

    /// Replace a field with a single value
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let key = key.to_lowercase();
        if !self.fields.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.fields.insert(key, FieldValue::Single(value.into()));
    }

    /// Fields in the order they were first seen.
    ///
    /// Records built by deserialization have no source order and list
    /// their fields sorted by name.
    pub fn ordered_fields(&self) -> Vec<(&str, &FieldValue)> {
        if self.order.len() == self.fields.len() {
            self.order
                .iter()
                .filter_map(|k| self.fields.get_key_value(k))
                .map(|(k, v)| (k.as_str(), v))
                .collect()
        } else {
            self.fields.iter().map(|(k, v)| (k.as_str(), v)).collect()
        }
    }

    /// First value of a field (case-insensitive lookup)
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(&key.to_lowercase()).map(FieldValue::first)
    }

    /// First value of a field, ignoring blank values
    pub fn get_nonempty(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }

    /// First non-blank value among several alternative field names
    pub fn first_of(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|k| self.get_nonempty(k))
    }

    /// Check if a field exists
    pub fn has(&self, key: &str) -> bool {
        self.fields.contains_key(&key.to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn call(&self) -> Option<&str> { self.get_nonempty("call") }
    pub fn qso_date(&self) -> Option<&str> { self.get_nonempty("qso_date") }
    pub fn band(&self) -> Option<&str> { self.get_nonempty("band") }
    pub fn dxcc(&self) -> Option<&str> { self.get_nonempty("dxcc") }
    pub fn country(&self) -> Option<&str> { self.get_nonempty("country") }
    pub fn continent(&self) -> Option<&str> { self.get_nonempty("continent") }
    pub fn state(&self) -> Option<&str> { self.get_nonempty("state") }
    pub fn qso_datetime(&self) -> Option<&str> { self.get_nonempty("qso_datetime") }
}

/// Parsed ADIF file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdifFile {
    /// Header fields (before <EOH>)
    pub header: AdifHeader,
    /// QSO records, in file order, never deduplicated
    pub records: Vec<AdifRecord>,
}

/// Strip a leading BOM and unify line endings to `\n`
pub fn normalize_text(content: &str) -> String {
    content
        .trim_start_matches('\u{feff}')
        .replace("\r\n", "\n")
        .replace('\r', "\n")
}

/// Byte offset reached after `n` characters of `s` (clamped to its end)
fn char_offset(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map(|(i, _)| i).unwrap_or(s.len())
}

/// Extract the value that follows a tag.
///
/// Returns the raw value and the number of bytes consumed from `rest`.
fn take_value(rest: &str, declared_len: Option<usize>) -> (&str, usize) {
    let semi = rest.find(';');
    let next_tag = rest.find('<');

    match declared_len {
        Some(n) => {
            let len_end = char_offset(rest, n);
            match semi {
                // A `;` before the next tag and inside the declared length
                // means the length count is wrong
                Some(s) if next_tag.map_or(true, |l| s < l) && s < len_end => (&rest[..s], s),
                _ => (&rest[..len_end], len_end),
            }
        }
        None => {
            let end = [semi, next_tag].into_iter().flatten().min().unwrap_or(rest.len());
            (&rest[..end], end)
        }
    }
}

fn is_headerless(text: &str) -> bool {
    text.trim_start().starts_with('<') && !text.to_uppercase().contains("<EOH")
}

/// Parse ADIF text into a header and an ordered list of records.
///
/// Never fails: malformed input produces whatever fields could be read.
pub fn parse_adif(content: &str) -> AdifFile {
    let text = normalize_text(content);
    let re = tag_re();

    let mut file = AdifFile::default();
    let mut current = AdifRecord::new();
    // A file that opens with a tag and never ends a header has no header
    let mut seen_eoh = is_headerless(&text);
    let mut pos = 0;

    while let Some(caps) = re.captures(&text[pos..]) {
        let (Some(whole), Some(tag)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let tag = tag.as_str().to_uppercase();
        let declared_len = caps.get(2).and_then(|m| m.as_str().parse::<usize>().ok());
        let val_start = pos + whole.end();

        let (raw, consumed) = take_value(&text[val_start..], declared_len);
        let value = raw.trim().to_string();
        pos = val_start + consumed;
        if text[pos..].starts_with(';') {
            pos += 1;
        }

        match tag.as_str() {
            "EOH" => {
                seen_eoh = true;
                continue;
            }
            "EOR" => {
                if !current.is_empty() {
                    file.records.push(std::mem::take(&mut current));
                }
                continue;
            }
            _ => {}
        }

        if !seen_eoh && file.records.is_empty() {
            file.header.add(&tag, value);
        } else {
            current.add(&tag, value);
        }
    }

    // Unterminated last record: keep it unless it only carries the EOF marker
    let has_data = current
        .fields
        .iter()
        .any(|(k, v)| k != LOTW_EOF_FIELD && !v.first().is_empty());
    if has_data {
        file.records.push(current);
    }

    for record in &mut file.records {
        add_derived_datetimes(record);
    }

    log::debug!(
        "Parsed ADIF: {} header fields, {} records",
        file.header.len(),
        file.records.len()
    );
    file
}

/// Populate `qso_datetime` / `qso_end_datetime` when date and time are valid
fn add_derived_datetimes(record: &mut AdifRecord) {
    let Some(date) = record.first_of(&["qso_date", "date"]).map(str::to_string) else {
        return;
    };
    let start = record
        .first_of(&["time_on", "time"])
        .and_then(|t| datetime::combine(&date, t));
    let end = record
        .first_of(&["time_off", "time_off_on"])
        .and_then(|t| datetime::combine(&date, t));

    if let Some(start) = start {
        record.set("qso_datetime", start);
    }
    if let Some(end) = end {
        record.set("qso_end_datetime", end);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_input() {
        let file = parse_adif("");
        assert!(file.header.is_empty());
        assert!(file.records.is_empty());
    }

    #[test]
    fn test_parse_lotw_format() {
        let adif = "\u{feff}ARRL Logbook of the World Status Report\r\n\
<PROGRAMID:4>LoTW\r\n\
<APP_LoTW_LASTQSL:19>2024-01-05 10:00:00\r\n\
<eoh>\r\n\
<CALL:5>BY1AA\r\n\
<BAND:3>20M\r\n\
<QSO_DATE:8>20230115\r\n\
<TIME_ON:4>1230\r\n\
<DXCC:3>318\r\n\
<eor>\r\n\
<APP_LoTW_EOF>\r\n";

        let file = parse_adif(adif);
        assert_eq!(file.header.get("programid"), Some("LoTW"));
        assert_eq!(file.header.get("APP_LOTW_LASTQSL"), Some("2024-01-05 10:00:00"));
        assert_eq!(file.records.len(), 1);

        let rec = &file.records[0];
        assert_eq!(rec.call(), Some("BY1AA"));
        assert_eq!(rec.band(), Some("20M"));
        assert_eq!(rec.dxcc(), Some("318"));
        assert_eq!(rec.qso_datetime(), Some("2023-01-15T12:30:00"));
        // raw date stays as exported
        assert_eq!(rec.qso_date(), Some("20230115"));
    }

    #[test]
    fn test_fields_keep_source_order() {
        let file = parse_adif("<PROGRAMID:4>N1MM<APP_X:8>Logger32<ADIF_VER:5>3.1.4<EOH>");
        let keys: Vec<&str> = file.header.ordered_fields().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["programid", "app_x", "adif_ver"]);

        let mut rec = AdifRecord::new();
        rec.set("zeta", "1");
        rec.add("alpha", "2");
        rec.set("zeta", "3");
        let keys: Vec<&str> = rec.ordered_fields().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_parse_multiple_records() {
        let adif = r#"<ADIF_VER:5>3.1.4<EOH>
<CALL:5>W1ABC<BAND:3>20M<MODE:3>FT8<QSO_DATE:8>20260103<TIME_ON:4>1526<EOR>
<CALL:5>N2XYZ<BAND:3>40M<MODE:2>CW<QSO_DATE:8>20260103<TIME_ON:4>1630<EOR>
<CALL:4>K3AB<BAND:3>15M<MODE:3>SSB<QSO_DATE:8>20260103<TIME_ON:4>1745<EOR>
"#;

        let file = parse_adif(adif);
        assert_eq!(file.records.len(), 3);
        assert_eq!(file.records[0].call(), Some("W1ABC"));
        assert_eq!(file.records[1].call(), Some("N2XYZ"));
        assert_eq!(file.records[2].call(), Some("K3AB"));
    }

    #[test]
    fn test_duplicate_records_are_kept() {
        let adif = "<EOH><CALL:5>JA1AA<QSO_DATE:8>20230101<EOR><CALL:5>JA1AA<QSO_DATE:8>20230101<EOR>";
        assert_eq!(parse_adif(adif).records.len(), 2);
    }

    #[test]
    fn test_headerless_file() {
        let adif = "<CALL:5>K1ABC<BAND:3>20M<EOR>\n<CALL:5>K2ABC<EOR>";
        let file = parse_adif(adif);
        assert!(file.header.is_empty());
        assert_eq!(file.records.len(), 2);
        assert_eq!(file.records[0].call(), Some("K1ABC"));
    }

    #[test]
    fn test_header_text_without_eoh_collects_fields_until_first_record() {
        let adif = "Exported log\n<PROGRAMID:5>N1MM+<CALL:5>K1ABC<EOR><CALL:5>K2ABC<EOR>";
        let file = parse_adif(adif);
        assert_eq!(file.header.get("programid"), Some("N1MM+"));
        assert_eq!(file.header.get("call"), Some("K1ABC"));
        assert!(file.records.is_empty());
    }

    #[test]
    fn test_repeated_field_accumulates() {
        let adif = "<EOH><CALL:5>K1ABC<COMMENT:3>one<COMMENT:3>two<EOR>";
        let file = parse_adif(adif);
        let comment = &file.records[0].fields["comment"];
        assert_eq!(
            comment,
            &FieldValue::Multiple(vec!["one".to_string(), "two".to_string()])
        );
        assert_eq!(comment.first(), "one");
    }

    #[test]
    fn test_semicolon_overrides_bad_length() {
        let adif = "<EOH><CALL:9>BY1AA;<BAND:3>20M;<EOR>";
        let file = parse_adif(adif);
        assert_eq!(file.records[0].call(), Some("BY1AA"));
        assert_eq!(file.records[0].band(), Some("20M"));
    }

    #[test]
    fn test_semicolon_after_declared_length_is_terminator() {
        let adif = "<EOH><CALL:5>BY1AA; <BAND:3>40M<EOR>";
        let file = parse_adif(adif);
        assert_eq!(file.records[0].call(), Some("BY1AA"));
    }

    #[test]
    fn test_tag_without_length() {
        let adif = "<EOH><CALL>BG2CD ;<BAND>40M<EOR>";
        let file = parse_adif(adif);
        assert_eq!(file.records[0].call(), Some("BG2CD"));
        assert_eq!(file.records[0].band(), Some("40M"));
    }

    #[test]
    fn test_type_indicator_and_mixed_case_tags() {
        let adif = "<eoh><Call:6:S>VR2XAA<qso_date:8:D>20230301<eor>";
        let file = parse_adif(adif);
        assert_eq!(file.records[0].call(), Some("VR2XAA"));
        assert_eq!(file.records[0].qso_date(), Some("20230301"));
    }

    #[test]
    fn test_unterminated_trailing_record_is_kept() {
        let adif = "<EOH><CALL:5>K1ABC<EOR><CALL:5>K2ABC<BAND:3>20M";
        let file = parse_adif(adif);
        assert_eq!(file.records.len(), 2);
        assert_eq!(file.records[1].call(), Some("K2ABC"));
    }

    #[test]
    fn test_trailing_eof_marker_is_not_a_record() {
        let adif = "<EOH><CALL:5>K1ABC<EOR><APP_LoTW_EOF>";
        assert_eq!(parse_adif(adif).records.len(), 1);
    }

    #[test]
    fn test_invalid_date_leaves_no_datetime() {
        let adif = "<EOH><CALL:5>K1ABC<QSO_DATE:8>20230230<TIME_ON:4>1230<TIME_OFF:4>1300<EOR>";
        let rec = &parse_adif(adif).records[0];
        assert!(!rec.has("qso_datetime"));
        assert!(!rec.has("qso_end_datetime"));
        assert_eq!(rec.qso_date(), Some("20230230"));
    }

    #[test]
    fn test_end_datetime() {
        let adif = "<EOH><CALL:5>K1ABC<QSO_DATE:8>20230115<TIME_ON:6>123000<TIME_OFF:6>124515<EOR>";
        let rec = &parse_adif(adif).records[0];
        assert_eq!(rec.get("qso_datetime"), Some("2023-01-15T12:30:00"));
        assert_eq!(rec.get("qso_end_datetime"), Some("2023-01-15T12:45:15"));
    }

    #[test]
    fn test_parse_is_deterministic() {
        let adif = "<PROGRAMID:4>LoTW<EOH><CALL:5>BY1AA<QSO_DATE:8>20230115<TIME_ON:4>1230<EOR>";
        assert_eq!(parse_adif(adif), parse_adif(adif));
    }
}
