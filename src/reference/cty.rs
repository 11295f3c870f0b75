// Prefix table builder
// Source: country/prefix definition text in the CTY.DAT layout
//
//   China:  24:  44:  AS:  36.00:  -102.00:  -8.0:  BY:
//       3H,3H0,BA-BL,BR-BT,BY,BZ;
//
// A line that starts in column 0 and contains a colon opens a country
// block. Indented lines continue it. Tokens are comma separated and may be
// ranges (`BA-BL`, `3D2-3D4`).

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

/// Longest prefix token kept; anything longer is malformed
pub const MAX_PREFIX_LEN: usize = 6;

/// Number of colon-separated fields in a full CTY.DAT header line
const CTY_HEADER_FIELDS: usize = 8;

static TOKEN_RE: OnceLock<Regex> = OnceLock::new();
static ANNOTATION_RE: OnceLock<Regex> = OnceLock::new();

fn token_re() -> &'static Regex {
    TOKEN_RE.get_or_init(|| Regex::new(r"[A-Z0-9]+(?:-[A-Z0-9]+)?").expect("valid token regex"))
}

/// CQ/ITU/lat-lon/continent/time-zone overrides: `(5)`, `[8]`, `<..>`, `{NA}`, `~-5~`
fn annotation_re() -> &'static Regex {
    ANNOTATION_RE.get_or_init(|| {
        Regex::new(r"\([^)]*\)|\[[^\]]*\]|<[^>]*>|\{[^}]*\}|~[^~]*~").expect("valid annotation regex")
    })
}

/// Expanded prefix → country map plus its condensed per-country summary.
///
/// Built once and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct PrefixTable {
    prefixes: HashMap<String, String>,
    condensed: Vec<String>,
    country_count: usize,
}

impl PrefixTable {
    /// A table with no entries: every lookup misses
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from (prefix, country) pairs; later pairs win on collision
    pub fn from_entries<I, P, C>(entries: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: AsRef<str>,
        C: Into<String>,
    {
        let mut countries: Vec<(String, BTreeSet<String>)> = Vec::new();
        for (prefix, country) in entries {
            let country = country.into();
            let prefix = prefix.as_ref().trim().to_uppercase();
            match countries.iter_mut().find(|(c, _)| *c == country) {
                Some((_, set)) => {
                    set.insert(prefix);
                }
                None => countries.push((country, BTreeSet::from([prefix]))),
            }
        }
        Self::from_countries(countries)
    }

    /// Parse definition text into a table
    pub fn parse(text: &str) -> Self {
        let mut countries: Vec<(String, BTreeSet<String>)> = Vec::new();
        let mut current: Option<(String, BTreeSet<String>)> = None;

        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }

            let indented = line.starts_with(char::is_whitespace);
            if !indented && line.contains(':') {
                if let Some(done) = current.take() {
                    push_country(&mut countries, done);
                }
                let (name, rest) = line.split_once(':').unwrap_or((line, ""));
                let mut prefixes = BTreeSet::new();
                collect_tokens(inline_tokens(rest), &mut prefixes);
                current = Some((name.trim().to_string(), prefixes));
            } else if indented {
                if let Some((_, prefixes)) = current.as_mut() {
                    let body = line.trim();
                    collect_tokens(body.strip_suffix(';').unwrap_or(body), prefixes);
                }
            }
        }
        if let Some(done) = current.take() {
            push_country(&mut countries, done);
        }

        Self::from_countries(countries)
    }

    /// Load a definition file. A missing or unreadable file gives an empty table.
    pub fn load(path: &Path) -> Self {
        match fs::read(path) {
            Ok(bytes) => {
                let table = Self::parse(&String::from_utf8_lossy(&bytes));
                log::info!(
                    "Loaded prefix data for {} countries ({} prefixes) from {:?}",
                    table.country_count,
                    table.prefixes.len(),
                    path
                );
                table
            }
            Err(e) => {
                log::warn!("Prefix table source {:?} not readable ({}), using empty table", path, e);
                Self::empty()
            }
        }
    }

    fn from_countries(countries: Vec<(String, BTreeSet<String>)>) -> Self {
        let mut prefixes = HashMap::new();
        for (country, prefs) in &countries {
            for p in prefs {
                prefixes.insert(p.clone(), country.clone());
            }
        }

        let mut sorted: Vec<&(String, BTreeSet<String>)> = countries.iter().collect();
        sorted.sort_by_key(|(country, _)| country.to_uppercase());
        let condensed = sorted
            .into_iter()
            .filter(|(_, prefs)| !prefs.is_empty())
            .map(|(country, prefs)| format!("{}: {}", compress_prefixes(prefs).join(","), country))
            .collect();

        Self {
            prefixes,
            condensed,
            country_count: countries.len(),
        }
    }

    /// Country owning exactly this prefix
    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(String::as_str)
    }

    /// One `PREFIXES: Country` line per country, sorted by country name
    pub fn condensed_lines(&self) -> &[String] {
        &self.condensed
    }

    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    pub fn country_count(&self) -> usize {
        self.country_count
    }
}

/// Merge into an existing block of the same country, else append
fn push_country(countries: &mut Vec<(String, BTreeSet<String>)>, block: (String, BTreeSet<String>)) {
    let (name, prefixes) = block;
    if prefixes.is_empty() {
        return;
    }
    match countries.iter_mut().find(|(c, _)| *c == name) {
        Some((_, existing)) => existing.extend(prefixes),
        None => countries.push((name, prefixes)),
    }
}

/// Token text on the country line itself.
///
/// A full CTY.DAT header carries zones, continent and coordinates before
/// the primary prefix; only that last field names prefixes.
fn inline_tokens(rest: &str) -> &str {
    let fields: Vec<&str> = rest.split(':').collect();
    if fields.len() >= CTY_HEADER_FIELDS - 1 {
        fields[CTY_HEADER_FIELDS - 2]
    } else {
        rest
    }
}

fn collect_tokens(text: &str, out: &mut BTreeSet<String>) {
    let upper = text.to_uppercase();
    let stripped = annotation_re().replace_all(&upper, "");
    for tok in token_re().find_iter(&stripped) {
        for prefix in expand_token(tok.as_str()) {
            if !prefix.is_empty() && prefix.len() <= MAX_PREFIX_LEN {
                out.insert(prefix);
            }
        }
    }
}

fn clean(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

/// Expand a token into individual prefixes.
///
/// - `BA-BL` (two letters, same first letter) → `BA`, `BB`, ..., `BL`
/// - `3D2-3D4` (same stem, trailing digit) → `3D2`, `3D3`, `3D4`
/// - any other range → just its two endpoints
pub fn expand_token(token: &str) -> Vec<String> {
    let token = token.to_uppercase();
    let Some((a, b)) = token.split_once('-') else {
        return vec![clean(&token)];
    };
    let (a, b) = (clean(a), clean(b));
    let (ab, bb) = (a.as_bytes(), b.as_bytes());

    let two_letter = ab.len() == 2
        && bb.len() == 2
        && ab[0] == bb[0]
        && ab.iter().chain(bb).all(u8::is_ascii_alphabetic);
    if two_letter && ab[1] <= bb[1] {
        return (ab[1]..=bb[1])
            .map(|c| format!("{}{}", ab[0] as char, c as char))
            .collect();
    }

    if let (Some(&last_a), Some(&last_b)) = (ab.last(), bb.last()) {
        let same_stem = ab.len() == bb.len() && ab[..ab.len() - 1] == bb[..bb.len() - 1];
        if same_stem && last_a.is_ascii_digit() && last_b.is_ascii_digit() && last_a <= last_b {
            let stem = &a[..a.len() - 1];
            return (last_a..=last_b)
                .map(|d| format!("{}{}", stem, d as char))
                .collect();
        }
    }

    vec![a, b]
}

/// Condensed form of a prefix set.
///
/// Two-letter alphabetic prefixes are merged into contiguous runs per
/// first letter (`BA-BL`); everything else is listed as-is, sorted.
pub fn compress_prefixes(prefixes: &BTreeSet<String>) -> Vec<String> {
    let mut two_letter: BTreeMap<u8, Vec<u8>> = BTreeMap::new();
    let mut others = Vec::new();
    for p in prefixes {
        let b = p.as_bytes();
        if b.len() == 2 && b.iter().all(u8::is_ascii_alphabetic) {
            two_letter.entry(b[0]).or_default().push(b[1]);
        } else {
            others.push(p.clone());
        }
    }

    let mut parts = Vec::new();
    for (first, mut seconds) in two_letter {
        seconds.sort_unstable();
        let mut runs: Vec<(u8, u8)> = Vec::new();
        for s in seconds {
            match runs.last_mut() {
                Some((_, end)) if s == *end + 1 => *end = s,
                _ => runs.push((s, s)),
            }
        }
        for (start, end) in runs {
            let first = first as char;
            if start == end {
                parts.push(format!("{}{}", first, start as char));
            } else {
                parts.push(format!("{}{}-{}{}", first, start as char, first, end as char));
            }
        }
    }

    others.sort();
    parts.extend(others);
    parts
}
